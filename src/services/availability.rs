use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::working_hour::{parse_time, weekday_of};
use crate::models::{WorkingHour, SLOT_TIMES};

/// Bookable slot labels for `date`, ascending.
///
/// A slot is offered when its hour lies in `[start_hour, end_hour)` of the
/// weekday's working hours, no confirmed reservation holds it, and it starts
/// strictly after `now`. A slot starting exactly at `now` is already past.
pub fn available_slots(
    date: NaiveDate,
    now: NaiveDateTime,
    working_hour: Option<&WorkingHour>,
    confirmed_times: &[String],
) -> Vec<String> {
    if date < now.date() {
        return Vec::new();
    }

    let Some((start_hour, end_hour)) = working_hour.and_then(WorkingHour::open_hours) else {
        return Vec::new();
    };

    SLOT_TIMES
        .iter()
        .filter_map(|label| {
            let time = parse_time(label).ok()?;
            let hour = time.hour();
            if hour < start_hour || hour >= end_hour {
                return None;
            }
            if confirmed_times.iter().any(|t| t == label) {
                return None;
            }
            if date == now.date() && date.and_time(time) <= now {
                return None;
            }
            Some(label.to_string())
        })
        .collect()
}

/// Loads the weekday template and confirmed bookings for `date` and computes its slots.
pub fn slots_for_date(
    conn: &Connection,
    date: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<Vec<String>> {
    if date < now.date() {
        return Ok(Vec::new());
    }
    let working_hour = queries::get_working_hour(conn, weekday_of(date))?;
    let confirmed = queries::confirmed_times_on(conn, &date)?;
    Ok(available_slots(date, now, working_hour.as_ref(), &confirmed))
}

/// Weekdays explicitly switched off in the template, for greying out the booking calendar.
pub fn closed_weekdays(conn: &Connection) -> anyhow::Result<Vec<u8>> {
    Ok(queries::list_working_hours(conn)?
        .into_iter()
        .filter(|wh| !wh.enabled)
        .map(|wh| wh.weekday)
        .collect())
}
