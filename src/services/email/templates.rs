//! Czech transactional emails rendered from `templates/email`.

use askama::Template;
use serde::Deserialize;

use super::EmailMessage;
use crate::models::Reservation;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time: String,
}

impl From<&Reservation> for ReservationDetails {
    fn from(r: &Reservation) -> Self {
        Self {
            first_name: r.first_name.clone(),
            last_name: r.last_name.clone(),
            email: r.email.clone(),
            phone: r.phone.clone(),
            date: r.date.format("%Y-%m-%d").to_string(),
            time: r.time.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientRegistration {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub zip: String,
    pub city: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Template)]
#[template(path = "email/reservation_pending.html")]
struct PendingEmail<'a> {
    details: &'a ReservationDetails,
    admin_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/reservation_confirmed.html")]
struct ConfirmedEmail<'a> {
    details: &'a ReservationDetails,
}

#[derive(Template)]
#[template(path = "email/reservation_rejected.html")]
struct RejectedEmail<'a> {
    details: &'a ReservationDetails,
    reason: &'a str,
}

#[derive(Template)]
#[template(path = "email/client_registration.html")]
struct RegistrationEmail<'a> {
    fields: Vec<(&'static str, &'a str)>,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact_message.html")]
struct ContactEmail<'a> {
    name: &'a str,
    email: &'a str,
    subject: Option<&'a str>,
    message: &'a str,
}

/// Owner notification about a freshly submitted reservation.
pub fn reservation_pending(
    details: &ReservationDetails,
    from: &str,
    to: &str,
    admin_url: &str,
) -> askama::Result<EmailMessage> {
    Ok(EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Nová rezervace schůzky čeká na schválení".to_string(),
        html: PendingEmail { details, admin_url }.render()?,
    })
}

pub fn reservation_confirmed(details: &ReservationDetails, from: &str) -> askama::Result<EmailMessage> {
    Ok(EmailMessage {
        from: from.to_string(),
        to: details.email.clone(),
        subject: "Vaše rezervace schůzky byla potvrzena".to_string(),
        html: ConfirmedEmail { details }.render()?,
    })
}

/// Sent both for rejected requests and for cancelled confirmed meetings.
pub fn reservation_rejected(
    details: &ReservationDetails,
    reason: &str,
    from: &str,
) -> askama::Result<EmailMessage> {
    Ok(EmailMessage {
        from: from.to_string(),
        to: details.email.clone(),
        subject: "Vaše rezervace schůzky byla zamítnuta".to_string(),
        html: RejectedEmail { details, reason }.render()?,
    })
}

pub fn client_registration(
    r: &ClientRegistration,
    from: &str,
    to: &str,
) -> askama::Result<EmailMessage> {
    let body = RegistrationEmail {
        fields: vec![
            ("Jméno", r.name.as_str()),
            ("Příjmení", r.surname.as_str()),
            ("E-mail", r.email.as_str()),
            ("Telefon", r.phone.as_str()),
            ("Ulice", r.street.as_str()),
            ("PSČ", r.zip.as_str()),
            ("Město", r.city.as_str()),
        ],
        message: r.message.as_deref().unwrap_or(""),
    };
    Ok(EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Nová registrace klienta".to_string(),
        html: body.render()?,
    })
}

pub fn contact_message(m: &ContactMessage, from: &str, to: &str) -> askama::Result<EmailMessage> {
    let subject_line = m.subject.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let subject = match subject_line {
        Some(s) => format!("Nová zpráva z kontaktního formuláře - {s}"),
        None => "Nová zpráva z kontaktního formuláře".to_string(),
    };
    let body = ContactEmail {
        name: &m.name,
        email: &m.email,
        subject: subject_line,
        message: &m.message,
    };
    Ok(EmailMessage {
        from: from.to_string(),
        to: to.to_string(),
        subject,
        html: body.render()?,
    })
}
