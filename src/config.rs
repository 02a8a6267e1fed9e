use std::env;

/// Sessions never outlive a month, whatever SESSION_TTL_HOURS says.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 30;

pub fn clamp_session_ttl(hours: i64) -> i64 {
    hours.clamp(1, MAX_SESSION_TTL_HOURS)
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub storage_dir: String,
    pub public_url: String,
    pub site_url: String,
    pub admin_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub session_ttl_hours: i64,
    /// Marks the admin cookie `Secure`; on unless PUBLIC_URL is plain http.
    pub cookie_secure: bool,
    pub resend_api_key: String,
    pub email_from_reservations: String,
    pub email_from_registrations: String,
    pub email_from_contact: String,
    pub owner_email: String,
    pub contact_email: String,
    pub notify_on_approve: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or_else(|_| !public_url.starts_with("http://"));
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "consultdesk.db".to_string()),
            storage_dir: env::var("STORAGE_DIR").unwrap_or_else(|_| "storage".to_string()),
            public_url,
            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "https://www.jirakovaiva.cz/".to_string()),
            admin_url: env::var("ADMIN_URL")
                .unwrap_or_else(|_| "https://www.jirakovaiva.cz/admin".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            session_ttl_hours: clamp_session_ttl(
                env::var("SESSION_TTL_HOURS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(24),
            ),
            cookie_secure,
            resend_api_key: env::var("RESEND_API_KEY").unwrap_or_default(),
            email_from_reservations: env::var("EMAIL_FROM_RESERVATIONS")
                .unwrap_or_else(|_| "Rezervace <info@jirakovaiva.cz>".to_string()),
            email_from_registrations: env::var("EMAIL_FROM_REGISTRATIONS")
                .unwrap_or_else(|_| "Registrace <info@jirakovaiva.cz>".to_string()),
            email_from_contact: env::var("EMAIL_FROM_CONTACT")
                .unwrap_or_else(|_| "Kontaktní formulář <info@jirakovaiva.cz>".to_string()),
            owner_email: env::var("OWNER_EMAIL")
                .unwrap_or_else(|_| "jirakovaiva@seznam.cz".to_string()),
            contact_email: env::var("CONTACT_EMAIL")
                .unwrap_or_else(|_| "info@jirakovaiva.cz".to_string()),
            notify_on_approve: env::var("NOTIFY_ON_APPROVE")
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
        }
    }
}
