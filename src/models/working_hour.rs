use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

pub const WEEKDAYS: [u8; 7] = [1, 2, 3, 4, 5, 6, 7];

/// One row of the weekly opening template. `weekday` runs 1 (Monday) to 7 (Sunday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingHour {
    pub weekday: u8,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub enabled: bool,
}

impl WorkingHour {
    /// Placeholder used by the editor for weekdays that have never been saved.
    pub fn unset(weekday: u8) -> Self {
        Self {
            weekday,
            start_time: None,
            end_time: None,
            enabled: true,
        }
    }

    /// Opening and closing hour, or `None` when the day yields no slots.
    pub fn open_hours(&self) -> Option<(u32, u32)> {
        if !self.enabled {
            return None;
        }
        let start = parse_time(self.start_time.as_deref()?).ok()?;
        let end = parse_time(self.end_time.as_deref()?).ok()?;
        Some((start.hour(), end.hour()))
    }
}

pub fn weekday_of(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Parses a wall-clock `HH:MM`; a trailing `:SS` is tolerated and dropped.
pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(anyhow::anyhow!("invalid time format: {s}"));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| anyhow::anyhow!("time out of range: {s}"))
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}
