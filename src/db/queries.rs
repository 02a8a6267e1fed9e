use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{News, Reservation, ReservationStatus, Session, StaticText, Template, WorkingHour};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn fmt_ts(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

fn fmt_date(d: &NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_default()
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_default()
}

// ── Working Hours ──

fn row_to_working_hour(row: &Row) -> rusqlite::Result<WorkingHour> {
    Ok(WorkingHour {
        weekday: row.get(0)?,
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        enabled: row.get(3)?,
    })
}

pub fn get_working_hour(conn: &Connection, weekday: u8) -> anyhow::Result<Option<WorkingHour>> {
    let wh = conn
        .query_row(
            "SELECT weekday, start_time, end_time, enabled FROM working_hours WHERE weekday = ?1",
            params![weekday],
            row_to_working_hour,
        )
        .optional()?;
    Ok(wh)
}

pub fn list_working_hours(conn: &Connection) -> anyhow::Result<Vec<WorkingHour>> {
    let mut stmt = conn.prepare(
        "SELECT weekday, start_time, end_time, enabled FROM working_hours ORDER BY weekday",
    )?;
    let rows = stmt
        .query_map([], row_to_working_hour)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn upsert_working_hour(conn: &Connection, wh: &WorkingHour) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO working_hours (weekday, start_time, end_time, enabled)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(weekday) DO UPDATE SET
            start_time = excluded.start_time,
            end_time = excluded.end_time,
            enabled = excluded.enabled",
        params![wh.weekday, wh.start_time, wh.end_time, wh.enabled],
    )?;
    Ok(())
}

// ── Reservations ──

const RESERVATION_COLUMNS: &str =
    "id, first_name, last_name, email, phone, date, time, status, reject_reason, created_at, updated_at";

fn row_to_reservation(row: &Row) -> rusqlite::Result<Reservation> {
    let date_str: String = row.get(5)?;
    let status_str: String = row.get(7)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Reservation {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        date: parse_date(&date_str),
        time: row.get(6)?,
        status: ReservationStatus::parse(&status_str),
        reject_reason: row.get(8)?,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

pub fn create_reservation(conn: &Connection, r: &Reservation) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO reservations (id, first_name, last_name, email, phone, date, time, status, reject_reason, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            r.id,
            r.first_name,
            r.last_name,
            r.email,
            r.phone,
            fmt_date(&r.date),
            r.time,
            r.status.as_str(),
            r.reject_reason,
            fmt_ts(&r.created_at),
            fmt_ts(&r.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_reservation(conn: &Connection, id: &str) -> anyhow::Result<Option<Reservation>> {
    let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1");
    let r = conn.query_row(&sql, [id], row_to_reservation).optional()?;
    Ok(r)
}

/// Reservations in a given status, oldest submission first.
pub fn list_reservations_by_status(
    conn: &Connection,
    status: ReservationStatus,
) -> anyhow::Result<Vec<Reservation>> {
    let sql = format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE status = ?1 ORDER BY created_at ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([status.as_str()], row_to_reservation)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_confirmed_on(conn: &Connection, date: &NaiveDate) -> anyhow::Result<Vec<Reservation>> {
    let sql = format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations
         WHERE date = ?1 AND status = 'confirmed' ORDER BY time ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([fmt_date(date)], row_to_reservation)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn confirmed_times_on(conn: &Connection, date: &NaiveDate) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT time FROM reservations WHERE date = ?1 AND status = 'confirmed' ORDER BY time",
    )?;
    let rows = stmt
        .query_map([fmt_date(date)], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(rows)
}

/// Distinct dates in `[from, to]` holding at least one confirmed reservation.
pub fn confirmed_days_between(
    conn: &Connection,
    from: &NaiveDate,
    to: &NaiveDate,
) -> anyhow::Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT date FROM reservations
         WHERE date >= ?1 AND date <= ?2 AND status = 'confirmed' ORDER BY date",
    )?;
    let rows = stmt
        .query_map(params![fmt_date(from), fmt_date(to)], |row| {
            row.get::<_, String>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.iter().map(|s| parse_date(s)).collect())
}

pub fn is_slot_confirmed(
    conn: &Connection,
    date: &NaiveDate,
    time: &str,
    excluding_id: Option<&str>,
) -> anyhow::Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM reservations
         WHERE date = ?1 AND time = ?2 AND status = 'confirmed' AND id != ?3",
        params![fmt_date(date), time, excluding_id.unwrap_or("")],
        |row| row.get(0),
    )?;
    Ok(taken)
}

pub fn update_reservation_status(
    conn: &Connection,
    id: &str,
    status: ReservationStatus,
    reject_reason: Option<&str>,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let rows = conn.execute(
        "UPDATE reservations SET status = ?1, reject_reason = ?2, updated_at = ?3 WHERE id = ?4",
        params![status.as_str(), reject_reason, fmt_ts(now), id],
    )?;
    Ok(rows > 0)
}

pub fn delete_reservation(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let rows = conn.execute("DELETE FROM reservations WHERE id = ?1", [id])?;
    Ok(rows > 0)
}

// ── News ──

fn row_to_news(row: &Row) -> rusqlite::Result<News> {
    let created_at_str: String = row.get(4)?;
    Ok(News {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image_path: row.get(3)?,
        image_url: None,
        created_at: parse_ts(&created_at_str),
    })
}

/// Newest first; `limit` of `None` returns everything.
pub fn list_news(conn: &Connection, limit: Option<i64>) -> anyhow::Result<Vec<News>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, image_path, created_at FROM news
         ORDER BY created_at DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit.unwrap_or(-1)], row_to_news)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_news(conn: &Connection, id: &str) -> anyhow::Result<Option<News>> {
    let n = conn
        .query_row(
            "SELECT id, title, description, image_path, created_at FROM news WHERE id = ?1",
            [id],
            row_to_news,
        )
        .optional()?;
    Ok(n)
}

pub fn save_news(conn: &Connection, news: &News) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO news (id, title, description, image_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            image_path = excluded.image_path,
            created_at = excluded.created_at",
        params![
            news.id,
            news.title,
            news.description,
            news.image_path,
            fmt_ts(&news.created_at),
        ],
    )?;
    Ok(())
}

pub fn delete_news(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let rows = conn.execute("DELETE FROM news WHERE id = ?1", [id])?;
    Ok(rows > 0)
}

// ── Templates ──

fn row_to_template(row: &Row) -> rusqlite::Result<Template> {
    let created_at_str: String = row.get(7)?;
    Ok(Template {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        cta: row.get(3)?,
        icon: row.get(4)?,
        href: row.get(5)?,
        file_path: row.get(6)?,
        created_at: parse_ts(&created_at_str),
    })
}

pub fn list_templates(conn: &Connection) -> anyhow::Result<Vec<Template>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, cta, icon, href, file_path, created_at FROM templates
         ORDER BY created_at DESC",
    )?;
    let rows = stmt
        .query_map([], row_to_template)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_template(conn: &Connection, id: &str) -> anyhow::Result<Option<Template>> {
    let t = conn
        .query_row(
            "SELECT id, title, description, cta, icon, href, file_path, created_at FROM templates
             WHERE id = ?1",
            [id],
            row_to_template,
        )
        .optional()?;
    Ok(t)
}

pub fn save_template(conn: &Connection, t: &Template) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO templates (id, title, description, cta, icon, href, file_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            cta = excluded.cta,
            icon = excluded.icon,
            href = excluded.href,
            file_path = excluded.file_path",
        params![
            t.id,
            t.title,
            t.description,
            t.cta,
            t.icon,
            t.href,
            t.file_path,
            fmt_ts(&t.created_at),
        ],
    )?;
    Ok(())
}

pub fn delete_template(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let rows = conn.execute("DELETE FROM templates WHERE id = ?1", [id])?;
    Ok(rows > 0)
}

pub fn count_templates(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM templates", [], |row| row.get(0))?;
    Ok(count)
}

// ── Static Texts ──

fn row_to_static_text(row: &Row) -> rusqlite::Result<StaticText> {
    let created_at_str: String = row.get(4)?;
    let updated_at_str: String = row.get(5)?;
    Ok(StaticText {
        id: row.get(0)?,
        key: row.get(1)?,
        value: row.get(2)?,
        section: row.get(3)?,
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

pub fn list_static_texts(
    conn: &Connection,
    section: Option<&str>,
) -> anyhow::Result<Vec<StaticText>> {
    let mut stmt = conn.prepare(
        "SELECT id, key, value, section, created_at, updated_at FROM static_texts
         WHERE ?1 IS NULL OR section = ?1 ORDER BY section, key",
    )?;
    let rows = stmt
        .query_map([section], row_to_static_text)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn insert_static_text(conn: &Connection, text: &StaticText) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO static_texts (id, key, value, section, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            text.id,
            text.key,
            text.value,
            text.section,
            fmt_ts(&text.created_at),
            fmt_ts(&text.updated_at),
        ],
    )?;
    Ok(())
}

pub fn update_static_text(
    conn: &Connection,
    id: &str,
    value: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let rows = conn.execute(
        "UPDATE static_texts SET value = ?1, updated_at = ?2 WHERE id = ?3",
        params![value, fmt_ts(now), id],
    )?;
    Ok(rows > 0)
}

// ── Admins & Sessions ──

pub fn upsert_admin(conn: &Connection, username: &str, password_hash: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO admins (username, password_hash) VALUES (?1, ?2)
         ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash",
        params![username, password_hash],
    )?;
    Ok(())
}

pub fn get_admin_password_hash(conn: &Connection, username: &str) -> anyhow::Result<Option<String>> {
    let hash = conn
        .query_row(
            "SELECT password_hash FROM admins WHERE username = ?1",
            [username],
            |row| row.get(0),
        )
        .optional()?;
    Ok(hash)
}

/// Removes every admin except `username`, keeping a single admin identity.
pub fn remove_other_admins(conn: &Connection, username: &str) -> anyhow::Result<usize> {
    let rows = conn.execute("DELETE FROM admins WHERE username != ?1", [username])?;
    Ok(rows)
}

pub fn create_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, username, expires_at) VALUES (?1, ?2, ?3)",
        params![session.token, session.username, fmt_ts(&session.expires_at)],
    )?;
    Ok(())
}

/// Looks up a session that has not expired at `now`.
pub fn get_active_session(
    conn: &Connection,
    token: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<Option<Session>> {
    let session = conn
        .query_row(
            "SELECT token, username, expires_at FROM sessions WHERE token = ?1 AND expires_at > ?2",
            params![token, fmt_ts(now)],
            |row| {
                let expires_at_str: String = row.get(2)?;
                Ok(Session {
                    token: row.get(0)?,
                    username: row.get(1)?,
                    expires_at: parse_ts(&expires_at_str),
                })
            },
        )
        .optional()?;
    Ok(session)
}

pub fn delete_session(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    let rows = conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
    Ok(rows > 0)
}

pub fn purge_expired_sessions(conn: &Connection, now: &NaiveDateTime) -> anyhow::Result<usize> {
    let rows = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", [fmt_ts(now)])?;
    Ok(rows)
}
