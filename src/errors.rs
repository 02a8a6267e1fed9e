use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::ReservationStatus;

/// Field name → human readable messages, rendered next to the offending input.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const EMAIL_FAILURE_MESSAGE: &str = "Něco se pokazilo při odesílání emailu";
pub const REGISTRATION_FAILURE_MESSAGE: &str = "Něco se pokazilo při zpracování registrace";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("{0}")]
    Delivery(&'static str),

    #[error("invalid input")]
    Validation(FieldErrors),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("cannot {action} a reservation that is {from}")]
    InvalidTransition {
        action: &'static str,
        from: ReservationStatus,
    },

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(fields)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        AppError::Validation(fields)
    }
}

pub const REQUIRED_FIELD_MESSAGE: &str = "Toto pole je povinné";

/// Names the field a JSON body rejection points at, in the same snake_case the
/// validator reports.
fn rejected_field(text: &str) -> Option<String> {
    if let Some((_, rest)) = text.split_once("missing field `") {
        return rest.split_once('`').map(|(name, _)| snake_case(name));
    }
    let (_, detail) = text.split_once("target type: ")?;
    let (path, _) = detail.split_once(": ")?;
    (!path.is_empty() && !path.contains(' ')).then(|| snake_case(path))
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        match rejected_field(&text) {
            Some(field) if text.contains("missing field") => {
                AppError::field(&field, REQUIRED_FIELD_MESSAGE)
            }
            Some(field) => AppError::field(&field, "Neplatná hodnota"),
            None => AppError::field("body", text),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = match self {
            AppError::Validation(fields) => {
                serde_json::json!({ "error": "invalid input", "fields": fields })
            }
            other => serde_json::json!({ "error": other.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
