//! Outgoing reservation emails. Callers decide whether a failure matters.

use crate::models::Reservation;
use crate::services::email::templates::{self, ReservationDetails};
use crate::services::email::EmailMessage;
use crate::state::AppState;

/// Sends the owner a heads-up about a new pending reservation.
pub async fn notify_owner(state: &AppState, reservation: &Reservation) -> bool {
    let msg = templates::reservation_pending(
        &ReservationDetails::from(reservation),
        &state.config.email_from_reservations,
        &state.config.owner_email,
        &state.config.admin_url,
    );
    deliver(state, &reservation.id, "pending", msg).await
}

pub async fn notify_confirmed(state: &AppState, reservation: &Reservation) -> bool {
    let msg = templates::reservation_confirmed(
        &ReservationDetails::from(reservation),
        &state.config.email_from_reservations,
    );
    deliver(state, &reservation.id, "confirmed", msg).await
}

pub async fn notify_rejected(state: &AppState, reservation: &Reservation, reason: &str) -> bool {
    let msg = templates::reservation_rejected(
        &ReservationDetails::from(reservation),
        reason,
        &state.config.email_from_reservations,
    );
    deliver(state, &reservation.id, "rejected", msg).await
}

async fn deliver(
    state: &AppState,
    reservation_id: &str,
    kind: &str,
    msg: askama::Result<EmailMessage>,
) -> bool {
    let msg = match msg {
        Ok(msg) => msg,
        Err(e) => {
            tracing::error!(reservation_id, kind, error = %e, "failed to render reservation email");
            return false;
        }
    };
    match state.email.send(&msg).await {
        Ok(_) => {
            tracing::info!(reservation_id, kind, to = %msg.to, "reservation email sent");
            true
        }
        Err(e) => {
            tracing::error!(reservation_id, kind, error = %e, "failed to send reservation email");
            false
        }
    }
}
