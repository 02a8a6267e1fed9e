use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, NaiveDateTime};
use rand_core::OsRng;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::Session;

pub const SESSION_COOKIE: &str = "admin_session";

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Makes `username` the single admin identity, (re)hashing the configured password.
pub fn ensure_admin(conn: &Connection, username: &str, password: &str) -> anyhow::Result<()> {
    if password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD not set, admin login is disabled");
        return Ok(());
    }

    let current = queries::get_admin_password_hash(conn, username)?;
    if !current.as_deref().is_some_and(|h| verify_password(password, h)) {
        queries::upsert_admin(conn, username, &hash_password(password)?)?;
        tracing::info!(username, "admin credentials stored");
    }

    let removed = queries::remove_other_admins(conn, username)?;
    if removed > 0 {
        tracing::info!(removed, "removed stale admin accounts");
    }
    Ok(())
}

/// Checks credentials and opens a session valid for `ttl`.
pub fn login(
    conn: &Connection,
    username: &str,
    password: &str,
    ttl: Duration,
    now: NaiveDateTime,
) -> anyhow::Result<Option<Session>> {
    queries::purge_expired_sessions(conn, &now)?;

    let Some(hash) = queries::get_admin_password_hash(conn, username)? else {
        return Ok(None);
    };
    if !verify_password(password, &hash) {
        return Ok(None);
    }

    let session = Session {
        token: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        expires_at: now + ttl,
    };
    queries::create_session(conn, &session)?;
    Ok(Some(session))
}

pub fn authenticate(
    conn: &Connection,
    token: &str,
    now: NaiveDateTime,
) -> anyhow::Result<Option<Session>> {
    if token.is_empty() {
        return Ok(None);
    }
    queries::get_active_session(conn, token, &now)
}

pub fn logout(conn: &Connection, token: &str) -> anyhow::Result<()> {
    queries::delete_session(conn, token)?;
    Ok(())
}
