//! Public form relays: each turns a posted form into one email.

use std::sync::Arc;

use axum::extract::State;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::{AppError, EMAIL_FAILURE_MESSAGE, REGISTRATION_FAILURE_MESSAGE};
use crate::extract::Json;
use crate::services::email::templates::{
    self, ClientRegistration, ContactMessage, ReservationDetails,
};
use crate::services::email::EmailMessage;
use crate::state::AppState;

/// Accepts a JSON object or a JSON string that itself holds the object.
pub fn parse_payload<T: DeserializeOwned>(body: &str) -> anyhow::Result<T> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let value = match value {
        serde_json::Value::String(inner) => serde_json::from_str(&inner)?,
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}

fn decode<T: DeserializeOwned>(body: &str, failure: &'static str) -> Result<T, AppError> {
    parse_payload(body).map_err(|e| {
        tracing::error!(error = %e, "invalid relay payload");
        AppError::Delivery(failure)
    })
}

async fn relay(
    state: &AppState,
    msg: EmailMessage,
    failure: &'static str,
) -> Result<serde_json::Value, AppError> {
    match state.email.send(&msg).await {
        Ok(response) => {
            tracing::info!(subject = %msg.subject, to = %msg.to, "relayed email");
            Ok(response)
        }
        Err(e) => {
            tracing::error!(subject = %msg.subject, error = %e, "failed to relay email");
            Err(AppError::Delivery(failure))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RejectionRelay {
    #[serde(flatten)]
    pub details: ReservationDetails,
    pub reject_reason: String,
}

// POST /api/notify-reservation
pub async fn notify_reservation(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<serde_json::Value>, AppError> {
    let details: ReservationDetails = decode(&body, EMAIL_FAILURE_MESSAGE)?;
    let msg = templates::reservation_pending(
        &details,
        &state.config.email_from_reservations,
        &state.config.owner_email,
        &state.config.admin_url,
    )?;
    Ok(Json(relay(&state, msg, EMAIL_FAILURE_MESSAGE).await?))
}

// POST /api/confirm-reservation
pub async fn confirm_reservation(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<serde_json::Value>, AppError> {
    let details: ReservationDetails = decode(&body, EMAIL_FAILURE_MESSAGE)?;
    let msg = templates::reservation_confirmed(&details, &state.config.email_from_reservations)?;
    Ok(Json(relay(&state, msg, EMAIL_FAILURE_MESSAGE).await?))
}

// POST /api/reject-reservation
pub async fn reject_reservation(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<serde_json::Value>, AppError> {
    let payload: RejectionRelay = decode(&body, EMAIL_FAILURE_MESSAGE)?;
    let msg = templates::reservation_rejected(
        &payload.details,
        &payload.reject_reason,
        &state.config.email_from_reservations,
    )?;
    Ok(Json(relay(&state, msg, EMAIL_FAILURE_MESSAGE).await?))
}

// POST /api/register-client
pub async fn register_client(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<serde_json::Value>, AppError> {
    let registration: ClientRegistration = decode(&body, REGISTRATION_FAILURE_MESSAGE)?;
    let msg = templates::client_registration(
        &registration,
        &state.config.email_from_registrations,
        &state.config.owner_email,
    )?;
    relay(&state, msg, REGISTRATION_FAILURE_MESSAGE).await?;
    Ok(Json(serde_json::json!({"ok": true})))
}

// POST /api/send
pub async fn send_contact(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<serde_json::Value>, AppError> {
    let message: ContactMessage = decode(&body, EMAIL_FAILURE_MESSAGE)?;
    let msg = templates::contact_message(
        &message,
        &state.config.email_from_contact,
        &state.config.contact_email,
    )?;
    Ok(Json(relay(&state, msg, EMAIL_FAILURE_MESSAGE).await?))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
