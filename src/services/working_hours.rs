use rusqlite::Connection;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::{AppError, FieldErrors};
use crate::models::working_hour::{format_time, parse_time, WEEKDAYS};
use crate::models::WorkingHour;

/// One editor row as submitted; blank times mean "not set".
#[derive(Debug, Clone, Deserialize)]
pub struct WorkingHourInput {
    pub weekday: u8,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    pub enabled: bool,
}

/// Monday to Sunday; weekdays never saved come back enabled with no times.
pub fn load_week(conn: &Connection) -> anyhow::Result<Vec<WorkingHour>> {
    let stored = queries::list_working_hours(conn)?;
    Ok(WEEKDAYS
        .iter()
        .map(|&day| {
            stored
                .iter()
                .find(|wh| wh.weekday == day)
                .cloned()
                .unwrap_or_else(|| WorkingHour::unset(day))
        })
        .collect())
}

fn normalize_time(
    value: Option<&str>,
    field: String,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match parse_time(value) {
        Ok(t) => Some(format_time(t)),
        Err(_) => {
            errors.entry(field).or_default().push("Neplatný čas".to_string());
            None
        }
    }
}

fn validate_week(rows: &[WorkingHourInput]) -> Result<Vec<WorkingHour>, AppError> {
    let mut errors = FieldErrors::new();
    let mut week = Vec::with_capacity(WEEKDAYS.len());

    for &day in WEEKDAYS.iter() {
        let matching: Vec<&WorkingHourInput> = rows.iter().filter(|r| r.weekday == day).collect();
        let [row] = matching.as_slice() else {
            errors
                .entry(format!("weekday_{day}"))
                .or_default()
                .push("Každý den v týdnu musí být uveden právě jednou".to_string());
            continue;
        };

        let start = normalize_time(row.start_time.as_deref(), format!("start_time_{day}"), &mut errors);
        let end = normalize_time(row.end_time.as_deref(), format!("end_time_{day}"), &mut errors);
        if let (Some(s), Some(e)) = (&start, &end) {
            // HH:MM compares lexicographically.
            if s >= e {
                errors
                    .entry(format!("end_time_{day}"))
                    .or_default()
                    .push("Konec musí být po začátku".to_string());
            }
        }

        week.push(WorkingHour {
            weekday: day,
            start_time: start,
            end_time: end,
            enabled: row.enabled,
        });
    }

    if let Some(stray) = rows.iter().find(|r| !WEEKDAYS.contains(&r.weekday)) {
        errors
            .entry("weekday".to_string())
            .or_default()
            .push(format!("Neznámý den {}", stray.weekday));
    }

    if errors.is_empty() {
        Ok(week)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Replaces the whole weekly template in one transaction.
pub fn save_week(conn: &Connection, rows: &[WorkingHourInput]) -> Result<Vec<WorkingHour>, AppError> {
    let week = validate_week(rows)?;

    let tx = conn.unchecked_transaction()?;
    for wh in &week {
        queries::upsert_working_hour(&tx, wh)?;
    }
    tx.commit()?;

    tracing::info!(
        open_days = week.iter().filter(|wh| wh.open_hours().is_some()).count(),
        "working hours saved"
    );
    Ok(week)
}
