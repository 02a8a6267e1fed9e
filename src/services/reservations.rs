use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;
use validator::Validate;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::reservation::is_known_slot;
use crate::models::{NewReservation, Reservation, ReservationStatus, Transition};
use crate::services::{availability, local_now, notifications};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReservationOutcome {
    pub reservation: Reservation,
    pub email_sent: bool,
}

fn load(conn: &Connection, id: &str) -> Result<Reservation, AppError> {
    queries::get_reservation(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("reservation {id}")))
}

fn check(transition: Transition, from: ReservationStatus) -> Result<ReservationStatus, AppError> {
    transition.apply(from).ok_or(AppError::InvalidTransition {
        action: transition.name(),
        from,
    })
}

fn slot_taken() -> AppError {
    AppError::Conflict("Vybraný termín již není volný".to_string())
}

/// Maps a hit on the confirmed-slot unique index to a conflict.
fn unique_slot_violation(err: anyhow::Error) -> AppError {
    let is_constraint = err
        .downcast_ref::<rusqlite::Error>()
        .and_then(rusqlite::Error::sqlite_error_code)
        == Some(rusqlite::ErrorCode::ConstraintViolation);
    if is_constraint {
        slot_taken()
    } else {
        AppError::Internal(err)
    }
}

fn required_reason(reason: &str) -> Result<&str, AppError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::field("reason", "Důvod je povinný"));
    }
    Ok(reason)
}

/// Validates the form and inserts a pending reservation, re-checking the slot
/// inside the same transaction.
pub fn create_pending(
    conn: &Connection,
    form: NewReservation,
    now: NaiveDateTime,
) -> Result<Reservation, AppError> {
    let form = form.normalized();
    form.validate()?;

    let date = NaiveDate::parse_from_str(&form.date, "%Y-%m-%d")
        .map_err(|_| AppError::field("date", "Neplatné datum"))?;
    if !is_known_slot(&form.time) {
        return Err(AppError::field("time", "Neplatný čas"));
    }

    let tx = conn.unchecked_transaction()?;
    let slots = availability::slots_for_date(&tx, date, now)?;
    if !slots.contains(&form.time) {
        return Err(slot_taken());
    }

    let reservation = Reservation {
        id: uuid::Uuid::new_v4().to_string(),
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
        phone: form.phone,
        date,
        time: form.time,
        status: ReservationStatus::Pending,
        reject_reason: None,
        created_at: now,
        updated_at: now,
    };
    queries::create_reservation(&tx, &reservation)?;
    tx.commit()?;

    tracing::info!(id = %reservation.id, date = %reservation.date, time = %reservation.time, "reservation created");
    Ok(reservation)
}

pub fn approve_pending(
    conn: &Connection,
    id: &str,
    now: NaiveDateTime,
) -> Result<Reservation, AppError> {
    let tx = conn.unchecked_transaction()?;
    let mut reservation = load(&tx, id)?;
    let next = check(Transition::Approve, reservation.status)?;

    if queries::is_slot_confirmed(&tx, &reservation.date, &reservation.time, Some(id))? {
        return Err(slot_taken());
    }
    queries::update_reservation_status(&tx, id, next, None, &now)
        .map_err(unique_slot_violation)?;
    tx.commit()?;

    reservation.status = next;
    reservation.updated_at = now;
    tracing::info!(id, "reservation approved");
    Ok(reservation)
}

/// Reject (from pending) and cancel (from confirmed) both end in `cancelled` with a reason.
pub fn close_with_reason(
    conn: &Connection,
    id: &str,
    transition: Transition,
    reason: &str,
    now: NaiveDateTime,
) -> Result<Reservation, AppError> {
    let reason = required_reason(reason)?;
    let mut reservation = load(conn, id)?;
    let next = check(transition, reservation.status)?;

    queries::update_reservation_status(conn, id, next, Some(reason), &now)?;

    reservation.status = next;
    reservation.reject_reason = Some(reason.to_string());
    reservation.updated_at = now;
    tracing::info!(id, action = transition.name(), "reservation closed");
    Ok(reservation)
}

pub fn delete_pending(conn: &Connection, id: &str) -> Result<(), AppError> {
    let reservation = load(conn, id)?;
    check(Transition::Delete, reservation.status)?;
    queries::delete_reservation(conn, id)?;
    tracing::info!(id, "reservation deleted");
    Ok(())
}

pub async fn create(state: &AppState, form: NewReservation) -> Result<ReservationOutcome, AppError> {
    let reservation = {
        let db = state.db()?;
        create_pending(&db, form, local_now())?
    };
    let email_sent = notifications::notify_owner(state, &reservation).await;
    Ok(ReservationOutcome {
        reservation,
        email_sent,
    })
}

pub async fn approve(state: &AppState, id: &str) -> Result<ReservationOutcome, AppError> {
    let reservation = {
        let db = state.db()?;
        approve_pending(&db, id, local_now())?
    };
    let email_sent = if state.config.notify_on_approve {
        notifications::notify_confirmed(state, &reservation).await
    } else {
        false
    };
    Ok(ReservationOutcome {
        reservation,
        email_sent,
    })
}

pub async fn reject(state: &AppState, id: &str, reason: &str) -> Result<ReservationOutcome, AppError> {
    close_and_notify(state, id, Transition::Reject, reason).await
}

pub async fn cancel_confirmed(
    state: &AppState,
    id: &str,
    reason: &str,
) -> Result<ReservationOutcome, AppError> {
    close_and_notify(state, id, Transition::CancelConfirmed, reason).await
}

async fn close_and_notify(
    state: &AppState,
    id: &str,
    transition: Transition,
    reason: &str,
) -> Result<ReservationOutcome, AppError> {
    let reservation = {
        let db = state.db()?;
        close_with_reason(&db, id, transition, reason, local_now())?
    };
    let reason = reservation.reject_reason.as_deref().unwrap_or_default();
    let email_sent = notifications::notify_rejected(state, &reservation, reason).await;
    Ok(ReservationOutcome {
        reservation,
        email_sent,
    })
}

pub fn delete(state: &AppState, id: &str) -> Result<(), AppError> {
    let db = state.db()?;
    delete_pending(&db, id)
}
