pub mod news;
pub mod reservation;
pub mod session;
pub mod static_text;
pub mod template;
pub mod working_hour;

pub use news::{News, NewsInput, Upload};
pub use reservation::{NewReservation, Reservation, ReservationStatus, Transition, SLOT_TIMES};
pub use session::Session;
pub use static_text::StaticText;
pub use template::{Template, TemplateInput, TEMPLATE_ICONS};
pub use working_hour::WorkingHour;
