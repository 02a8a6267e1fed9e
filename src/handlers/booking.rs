use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::Json;
use crate::models::NewReservation;
use crate::services::reservations::{self, ReservationOutcome};
use crate::services::{availability, local_now};
use crate::state::AppState;

// GET /api/slots?date=
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    date: NaiveDate,
    slots: Vec<String>,
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::field("date", "Neplatné datum"))?;
    let slots = {
        let db = state.db()?;
        availability::slots_for_date(&db, date, local_now())?
    };
    Ok(Json(SlotsResponse { date, slots }))
}

// GET /api/working-hours/closed
pub async fn get_closed_weekdays(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let db = state.db()?;
    let weekdays = availability::closed_weekdays(&db)?;
    Ok(Json(serde_json::json!({ "weekdays": weekdays })))
}

// POST /api/reservations
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(form): Json<NewReservation>,
) -> Result<(StatusCode, Json<ReservationOutcome>), AppError> {
    let outcome = reservations::create(&state, form).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
