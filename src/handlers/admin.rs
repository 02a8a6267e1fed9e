use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::clamp_session_ttl;
use crate::db::queries;
use crate::errors::AppError;
use crate::extract::Json;
use crate::models::{Reservation, ReservationStatus, Session, WorkingHour};
use crate::services::auth::{self, SESSION_COOKIE};
use crate::services::reservations::{self, ReservationOutcome};
use crate::services::working_hours::{self, WorkingHourInput};
use crate::services::{content, local_now};
use crate::state::AppState;

fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = CookieJar::from_headers(headers).get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// The live session behind the request, if any.
pub fn current_session(state: &AppState, headers: &HeaderMap) -> Result<Option<Session>, AppError> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };
    let db = state.db()?;
    Ok(auth::authenticate(&db, &token, local_now())?)
}

pub fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<Session, AppError> {
    current_session(state, headers)?.ok_or(AppError::Unauthorized)
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ttl_hours = clamp_session_ttl(state.config.session_ttl_hours);
    let ttl = Duration::hours(ttl_hours);
    let session = {
        let db = state.db()?;
        auth::login(&db, body.username.trim(), &body.password, ttl, local_now())?
    };
    let Some(session) = session else {
        tracing::warn!(username = %body.username, "failed admin login");
        return Err(AppError::Unauthorized);
    };
    tracing::info!(username = %session.username, "admin logged in");

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::hours(ttl_hours));

    Ok((
        jar.add(cookie),
        Json(serde_json::json!({
            "ok": true,
            "token": session.token,
            "expires_at": session.expires_at,
        })),
    ))
}

// POST /api/admin/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = session_token(&headers) {
        let db = state.db()?;
        auth::logout(&db, &token)?;
    }
    Ok((
        jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/")),
        Json(serde_json::json!({"ok": true})),
    ))
}

// GET /api/admin/reservations/pending
pub async fn get_pending(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Reservation>>, AppError> {
    check_auth(&state, &headers)?;
    let db = state.db()?;
    let pending = queries::list_reservations_by_status(&db, ReservationStatus::Pending)?;
    Ok(Json(pending))
}

// POST /api/admin/reservations/:id/approve
pub async fn approve_reservation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ReservationOutcome>, AppError> {
    check_auth(&state, &headers)?;
    Ok(Json(reservations::approve(&state, &id).await?))
}

#[derive(Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: String,
}

// POST /api/admin/reservations/:id/reject
pub async fn reject_reservation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ReasonRequest>,
) -> Result<Json<ReservationOutcome>, AppError> {
    check_auth(&state, &headers)?;
    Ok(Json(reservations::reject(&state, &id, &body.reason).await?))
}

// POST /api/admin/reservations/:id/cancel
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ReasonRequest>,
) -> Result<Json<ReservationOutcome>, AppError> {
    check_auth(&state, &headers)?;
    Ok(Json(reservations::cancel_confirmed(&state, &id, &body.reason).await?))
}

// DELETE /api/admin/reservations/:id
pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&state, &headers)?;
    reservations::delete(&state, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/admin/calendar?date=
#[derive(Deserialize)]
pub struct CalendarQuery {
    pub date: String,
}

pub async fn get_calendar_day(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    check_auth(&state, &headers)?;
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::field("date", "Neplatné datum"))?;
    let db = state.db()?;
    Ok(Json(queries::list_confirmed_on(&db, &date)?))
}

// GET /api/admin/calendar/days?year=&month=
#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Serialize)]
pub struct MonthDaysResponse {
    year: i32,
    month: u32,
    days: Vec<NaiveDate>,
}

pub async fn get_calendar_days(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthDaysResponse>, AppError> {
    check_auth(&state, &headers)?;
    let first = NaiveDate::from_ymd_opt(query.year, query.month, 1)
        .ok_or_else(|| AppError::field("month", "Neplatný měsíc"))?;
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::field("month", "Neplatný měsíc"))?;

    let days = {
        let db = state.db()?;
        queries::confirmed_days_between(&db, &first, &last)?
    };
    Ok(Json(MonthDaysResponse {
        year: query.year,
        month: query.month,
        days,
    }))
}

// GET /api/admin/working-hours
pub async fn get_working_hours(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<WorkingHour>>, AppError> {
    check_auth(&state, &headers)?;
    let db = state.db()?;
    Ok(Json(working_hours::load_week(&db)?))
}

// PUT /api/admin/working-hours
pub async fn put_working_hours(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(rows): Json<Vec<WorkingHourInput>>,
) -> Result<Json<Vec<WorkingHour>>, AppError> {
    check_auth(&state, &headers)?;
    let db = state.db()?;
    Ok(Json(working_hours::save_week(&db, &rows)?))
}

// GET /api/admin/templates/count
pub async fn get_templates_count(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&state, &headers)?;
    let count = content::count_templates(&state)?;
    Ok(Json(serde_json::json!({"count": count})))
}
