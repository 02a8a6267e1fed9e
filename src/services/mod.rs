pub mod auth;
pub mod availability;
pub mod content;
pub mod email;
pub mod images;
pub mod notifications;
pub mod reservations;
pub mod seo;
pub mod storage;
pub mod working_hours;

use chrono::NaiveDateTime;

/// Wall-clock time of the business; slots and timestamps are local.
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
