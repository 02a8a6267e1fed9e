use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Hour-aligned slots offered on any open day, before working hours are applied.
pub const SLOT_TIMES: [&str; 9] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];

pub fn is_known_slot(time: &str) -> bool {
    SLOT_TIMES.contains(&time)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: ReservationStatus,
    pub reject_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => ReservationStatus::Confirmed,
            "cancelled" => ReservationStatus::Cancelled,
            _ => ReservationStatus::Pending,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin actions on a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    Reject,
    CancelConfirmed,
    Delete,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Approve => "approve",
            Transition::Reject => "reject",
            Transition::CancelConfirmed => "cancel",
            Transition::Delete => "delete",
        }
    }

    /// Resulting status, or `None` when the action is not allowed from `from`.
    /// `Delete` yields `Pending` since the row disappears from that state.
    pub fn apply(&self, from: ReservationStatus) -> Option<ReservationStatus> {
        use ReservationStatus::*;
        match (self, from) {
            (Transition::Approve, Pending) => Some(Confirmed),
            (Transition::Reject, Pending) => Some(Cancelled),
            (Transition::CancelConfirmed, Confirmed) => Some(Cancelled),
            (Transition::Delete, Pending) => Some(Pending),
            _ => None,
        }
    }
}

/// Booking form as submitted by a visitor.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    #[validate(length(min = 1, message = "Jméno je povinné"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Příjmení je povinné"))]
    pub last_name: String,
    #[validate(email(message = "Neplatný email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Telefon je povinný"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Datum je povinné"))]
    pub date: String,
    #[validate(length(min = 1, message = "Čas je povinný"))]
    pub time: String,
}

impl NewReservation {
    /// Trims every field and strips whitespace out of the phone number.
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.chars().filter(|c| !c.is_whitespace()).collect(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
        }
    }
}
