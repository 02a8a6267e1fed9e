use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Duration, NaiveDate};
use tower::ServiceExt;

use consultdesk::config::AppConfig;
use consultdesk::db::{self, queries};
use consultdesk::models::{Reservation, ReservationStatus, WorkingHour};
use consultdesk::routes;
use consultdesk::services::auth;
use consultdesk::services::email::{EmailMessage, EmailProvider};
use consultdesk::services::local_now;
use consultdesk::services::storage::ObjectStorage;
use consultdesk::state::AppState;

// ── Mock Providers ──

#[derive(Clone, Default)]
struct MockEmail {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl EmailProvider for MockEmail {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<serde_json::Value> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("provider unavailable");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(serde_json::json!({"id": "mock-email-id"}))
    }
}

// ── Helpers ──

const ADMIN_USER: &str = "iva";
const ADMIN_PASSWORD: &str = "tajne-heslo";

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        storage_dir: String::new(),
        public_url: "http://localhost:3000".to_string(),
        site_url: "https://www.jirakovaiva.cz/".to_string(),
        admin_url: "https://www.jirakovaiva.cz/admin".to_string(),
        admin_username: ADMIN_USER.to_string(),
        admin_password: ADMIN_PASSWORD.to_string(),
        session_ttl_hours: 24,
        cookie_secure: false,
        resend_api_key: String::new(),
        email_from_reservations: "Rezervace <info@jirakovaiva.cz>".to_string(),
        email_from_registrations: "Registrace <info@jirakovaiva.cz>".to_string(),
        email_from_contact: "Kontakt <info@jirakovaiva.cz>".to_string(),
        owner_email: "owner@jirakovaiva.cz".to_string(),
        contact_email: "info@jirakovaiva.cz".to_string(),
        notify_on_approve: true,
    }
}

struct TestApp {
    app: Router,
    state: Arc<AppState>,
    email: MockEmail,
    _storage_dir: tempfile::TempDir,
}

fn test_app_with(config: AppConfig) -> TestApp {
    let conn = db::init_db(":memory:").unwrap();
    auth::ensure_admin(&conn, ADMIN_USER, ADMIN_PASSWORD).unwrap();

    let storage_dir = tempfile::tempdir().unwrap();
    let email = MockEmail::default();
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        storage: ObjectStorage::new(storage_dir.path(), &config.public_url),
        config,
        email: Box::new(email.clone()),
    });
    TestApp {
        app: routes::router(state.clone()),
        state,
        email,
        _storage_dir: storage_dir,
    }
}

fn test_app() -> TestApp {
    test_app_with(test_config())
}

impl TestApp {
    async fn request(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = self.app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn admin(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let token = self.login().await;
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"));
        let req = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.request(req).await
    }

    async fn login(&self) -> String {
        let (status, json) = self
            .post_json(
                "/api/admin/login",
                serde_json::json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        json["token"].as_str().unwrap().to_string()
    }

    fn set_hours(&self, weekday: u8, enabled: bool, start: Option<&str>, end: Option<&str>) {
        let db = self.state.db.lock().unwrap();
        queries::upsert_working_hour(
            &db,
            &WorkingHour {
                weekday,
                start_time: start.map(str::to_string),
                end_time: end.map(str::to_string),
                enabled,
            },
        )
        .unwrap();
    }

    fn insert_reservation(&self, date: NaiveDate, time: &str, status: ReservationStatus) -> String {
        let now = local_now();
        let id = uuid::Uuid::new_v4().to_string();
        let db = self.state.db.lock().unwrap();
        queries::create_reservation(
            &db,
            &Reservation {
                id: id.clone(),
                first_name: "Jana".to_string(),
                last_name: "Nováková".to_string(),
                email: "jana@example.cz".to_string(),
                phone: "777123456".to_string(),
                date,
                time: time.to_string(),
                status,
                reject_reason: None,
                created_at: now,
                updated_at: now,
            },
        )
        .unwrap();
        id
    }

    fn sent(&self) -> Vec<EmailMessage> {
        self.email.sent.lock().unwrap().clone()
    }
}

/// A date with the given ISO weekday (1 = Monday) at least a week ahead.
fn future_weekday(weekday: u32) -> NaiveDate {
    let mut date = local_now().date() + Duration::days(7);
    while date.weekday().number_from_monday() != weekday {
        date = date.succ_opt().unwrap();
    }
    date
}

fn booking_form(date: NaiveDate, time: &str) -> serde_json::Value {
    serde_json::json!({
        "firstName": "Jana",
        "lastName": "Nováková",
        "email": "jana@example.cz",
        "phone": "777 123 456",
        "date": date.format("%Y-%m-%d").to_string(),
        "time": time,
    })
}

fn png_base64(width: u32, height: u32) -> String {
    use base64::Engine;
    let mut out = std::io::Cursor::new(Vec::new());
    image::RgbImage::from_pixel(width, height, image::Rgb([255, 209, 193]))
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(out.into_inner())
}

fn slots(json: &serde_json::Value) -> Vec<String> {
    json["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

// ── Slot availability ──

#[tokio::test]
async fn test_monday_slots_follow_working_hours() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("12:00"));
    let monday = future_weekday(1);

    let (status, json) = t.get(&format!("/api/slots?date={monday}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots(&json), vec!["09:00", "10:00", "11:00"]);
}

#[tokio::test]
async fn test_confirmed_reservation_hides_slot() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("12:00"));
    let monday = future_weekday(1);
    t.insert_reservation(monday, "10:00", ReservationStatus::Confirmed);
    t.insert_reservation(monday, "11:00", ReservationStatus::Pending);

    let (_, json) = t.get(&format!("/api/slots?date={monday}")).await;
    assert_eq!(slots(&json), vec!["09:00", "11:00"]);
}

#[tokio::test]
async fn test_disabled_sunday_has_no_slots() {
    let t = test_app();
    t.set_hours(7, false, Some("09:00"), Some("17:00"));

    let (_, json) = t.get(&format!("/api/slots?date={}", future_weekday(7))).await;
    assert!(slots(&json).is_empty());

    let (_, json) = t.get("/api/working-hours/closed").await;
    assert_eq!(json["weekdays"], serde_json::json!([7]));
}

#[tokio::test]
async fn test_past_date_and_bad_date() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("17:00"));

    let past = local_now().date() - Duration::days(7);
    let (status, json) = t.get(&format!("/api/slots?date={past}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(slots(&json).is_empty());

    let (status, json) = t.get("/api/slots?date=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["date"].is_array());
}

// ── Booking flow ──

#[tokio::test]
async fn test_booking_creates_pending_and_notifies_owner() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("12:00"));
    let monday = future_weekday(1);

    let (status, json) = t.post_json("/api/reservations", booking_form(monday, "10:00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["reservation"]["status"], "pending");
    assert_eq!(json["reservation"]["phone"], "777123456");
    assert_eq!(json["email_sent"], true);

    let sent = t.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "owner@jirakovaiva.cz");
    assert!(sent[0].subject.contains("čeká na schválení"));

    // Pending does not block the slot.
    let (_, json) = t.get(&format!("/api/slots?date={monday}")).await;
    assert!(slots(&json).contains(&"10:00".to_string()));
}

#[tokio::test]
async fn test_booking_unavailable_slot_conflicts() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("12:00"));
    let monday = future_weekday(1);
    t.insert_reservation(monday, "09:00", ReservationStatus::Confirmed);

    let (status, _) = t.post_json("/api/reservations", booking_form(monday, "09:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = t.post_json("/api/reservations", booking_form(monday, "15:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(t.sent().is_empty());
}

#[tokio::test]
async fn test_booking_validation() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("12:00"));
    let mut form = booking_form(future_weekday(1), "10:00");
    form["email"] = serde_json::json!("not-an-email");
    form["firstName"] = serde_json::json!("  ");

    let (status, json) = t.post_json("/api/reservations", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["email"].is_array());
    assert!(json["fields"]["first_name"].is_array());
}

#[tokio::test]
async fn test_booking_missing_field_is_a_field_error() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("12:00"));
    let mut form = booking_form(future_weekday(1), "10:00");
    form.as_object_mut().unwrap().remove("phone");

    let res = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/reservations")
                .header("Content-Type", "application/json")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
    assert!(json["fields"]["phone"].is_array());

    let (status, json) = t
        .request(
            Request::builder()
                .method("POST")
                .uri("/api/reservations")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["body"].is_array());
    assert!(t.sent().is_empty());
}

#[tokio::test]
async fn test_booking_survives_email_failure() {
    let t = test_app();
    t.set_hours(1, true, Some("09:00"), Some("12:00"));
    t.email.failing.store(true, Ordering::SeqCst);

    let (status, json) = t
        .post_json("/api/reservations", booking_form(future_weekday(1), "11:00"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["email_sent"], false);

    let (_, pending) = t.admin("GET", "/api/admin/reservations/pending", None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
}

// ── Approval flow ──

#[tokio::test]
async fn test_approve_confirms_and_emails_visitor() {
    let t = test_app();
    let monday = future_weekday(1);
    let id = t.insert_reservation(monday, "10:00", ReservationStatus::Pending);

    let (status, json) = t
        .admin("POST", &format!("/api/admin/reservations/{id}/approve"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reservation"]["status"], "confirmed");
    assert_eq!(json["email_sent"], true);

    let sent = t.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jana@example.cz");
    assert!(sent[0].subject.contains("potvrzena"));

    let (_, day) = t
        .admin("GET", &format!("/api/admin/calendar?date={monday}"), None)
        .await;
    assert_eq!(day.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_approve_without_notification() {
    let mut config = test_config();
    config.notify_on_approve = false;
    let t = test_app_with(config);
    let id = t.insert_reservation(future_weekday(1), "10:00", ReservationStatus::Pending);

    let (status, json) = t
        .admin("POST", &format!("/api/admin/reservations/{id}/approve"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email_sent"], false);
    assert!(t.sent().is_empty());
}

#[tokio::test]
async fn test_double_confirmation_conflicts() {
    let t = test_app();
    let monday = future_weekday(1);
    let first = t.insert_reservation(monday, "10:00", ReservationStatus::Pending);
    let second = t.insert_reservation(monday, "10:00", ReservationStatus::Pending);

    let (status, _) = t
        .admin("POST", &format!("/api/admin/reservations/{first}/approve"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = t
        .admin("POST", &format!("/api/admin/reservations/{second}/approve"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reject_sends_reason() {
    let t = test_app();
    let id = t.insert_reservation(future_weekday(2), "13:00", ReservationStatus::Pending);

    let (status, _) = t
        .admin(
            "POST",
            &format!("/api/admin/reservations/{id}/reject"),
            Some(serde_json::json!({"reason": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = t
        .admin(
            "POST",
            &format!("/api/admin/reservations/{id}/reject"),
            Some(serde_json::json!({"reason": "Jsem na dovolené"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reservation"]["status"], "cancelled");
    assert_eq!(json["reservation"]["reject_reason"], "Jsem na dovolené");

    let sent = t.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("zamítnuta"));
    assert!(sent[0].html.contains("Jsem na dovolené"));
}

#[tokio::test]
async fn test_state_changes_survive_email_failure() {
    let t = test_app();
    let date = future_weekday(2);
    let to_approve = t.insert_reservation(date, "09:00", ReservationStatus::Pending);
    let to_reject = t.insert_reservation(date, "10:00", ReservationStatus::Pending);
    let to_cancel = t.insert_reservation(date, "11:00", ReservationStatus::Confirmed);
    t.email.failing.store(true, Ordering::SeqCst);

    let (status, json) = t
        .admin("POST", &format!("/api/admin/reservations/{to_approve}/approve"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email_sent"], false);
    assert_eq!(json["reservation"]["status"], "confirmed");

    let (status, json) = t
        .admin(
            "POST",
            &format!("/api/admin/reservations/{to_reject}/reject"),
            Some(serde_json::json!({"reason": "Obsazeno"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email_sent"], false);
    assert_eq!(json["reservation"]["status"], "cancelled");

    let (status, json) = t
        .admin(
            "POST",
            &format!("/api/admin/reservations/{to_cancel}/cancel"),
            Some(serde_json::json!({"reason": "Nemoc"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email_sent"], false);
    assert_eq!(json["reservation"]["status"], "cancelled");

    assert!(t.sent().is_empty());
    let db = t.state.db.lock().unwrap();
    let approved = queries::get_reservation(&db, &to_approve).unwrap().unwrap();
    let rejected = queries::get_reservation(&db, &to_reject).unwrap().unwrap();
    let cancelled = queries::get_reservation(&db, &to_cancel).unwrap().unwrap();
    assert_eq!(approved.status, ReservationStatus::Confirmed);
    assert_eq!(rejected.status, ReservationStatus::Cancelled);
    assert_eq!(rejected.reject_reason.as_deref(), Some("Obsazeno"));
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
    assert_eq!(cancelled.reject_reason.as_deref(), Some("Nemoc"));
}

#[tokio::test]
async fn test_illegal_transitions_return_conflict() {
    let t = test_app();
    let date = future_weekday(3);
    let confirmed = t.insert_reservation(date, "10:00", ReservationStatus::Confirmed);
    let pending = t.insert_reservation(date, "11:00", ReservationStatus::Pending);

    for (method, uri, body) in [
        ("POST", format!("/api/admin/reservations/{confirmed}/approve"), None),
        (
            "POST",
            format!("/api/admin/reservations/{confirmed}/reject"),
            Some(serde_json::json!({"reason": "x"})),
        ),
        ("DELETE", format!("/api/admin/reservations/{confirmed}"), None),
        (
            "POST",
            format!("/api/admin/reservations/{pending}/cancel"),
            Some(serde_json::json!({"reason": "x"})),
        ),
    ] {
        let (status, json) = t.admin(method, &uri, body).await;
        assert_eq!(status, StatusCode::CONFLICT, "{method} {uri}");
        assert!(json["error"].is_string());
    }
    assert!(t.sent().is_empty());

    let db = t.state.db.lock().unwrap();
    let c = queries::get_reservation(&db, &confirmed).unwrap().unwrap();
    let p = queries::get_reservation(&db, &pending).unwrap().unwrap();
    assert_eq!(c.status, ReservationStatus::Confirmed);
    assert_eq!(p.status, ReservationStatus::Pending);
}

#[tokio::test]
async fn test_cancel_confirmed_frees_slot() {
    let t = test_app();
    t.set_hours(4, true, Some("09:00"), Some("12:00"));
    let thursday = future_weekday(4);
    let id = t.insert_reservation(thursday, "09:00", ReservationStatus::Confirmed);

    let (_, before) = t.get(&format!("/api/slots?date={thursday}")).await;
    assert!(!slots(&before).contains(&"09:00".to_string()));

    let (status, json) = t
        .admin(
            "POST",
            &format!("/api/admin/reservations/{id}/cancel"),
            Some(serde_json::json!({"reason": "Nemoc"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["email_sent"], true);

    let (_, after) = t.get(&format!("/api/slots?date={thursday}")).await;
    assert!(slots(&after).contains(&"09:00".to_string()));
}

#[tokio::test]
async fn test_delete_pending_and_unknown_ids() {
    let t = test_app();
    let id = t.insert_reservation(future_weekday(5), "10:00", ReservationStatus::Pending);

    let (status, _) = t
        .admin("DELETE", &format!("/api/admin/reservations/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t
        .admin("DELETE", &format!("/api/admin/reservations/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .admin("POST", "/api/admin/reservations/missing/approve", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_month_days() {
    let t = test_app();
    let date = future_weekday(2);
    t.insert_reservation(date, "10:00", ReservationStatus::Confirmed);
    t.insert_reservation(date, "11:00", ReservationStatus::Confirmed);
    t.insert_reservation(date + Duration::days(1), "11:00", ReservationStatus::Pending);

    let (status, json) = t
        .admin(
            "GET",
            &format!("/api/admin/calendar/days?year={}&month={}", date.year(), date.month()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["days"], serde_json::json!([date.format("%Y-%m-%d").to_string()]));

    let (status, _) = t
        .admin("GET", "/api/admin/calendar/days?year=2025&month=13", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Authentication ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let t = test_app();

    let (status, json) = t.get("/api/admin/reservations/pending").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");

    let (status, _) = t
        .request(
            Request::builder()
                .uri("/api/admin/working-hours")
                .header("Authorization", "Bearer wrong-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let t = test_app();
    let (status, _) = t
        .post_json(
            "/api/admin/login",
            serde_json::json!({"username": ADMIN_USER, "password": "wrong"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_flow() {
    let t = test_app();

    let res = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("admin_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=86400"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let page = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);

    let (status, _) = t
        .request(
            Request::builder()
                .method("POST")
                .uri("/api/admin/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .request(
            Request::builder()
                .uri("/api/admin/reservations/pending")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_secure_cookie_and_capped_lifetime() {
    let mut config = test_config();
    config.cookie_secure = true;
    config.session_ttl_hours = i64::MAX;
    let t = test_app_with(config);

    let res = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("Max-Age=2592000"));
}

#[tokio::test]
async fn test_admin_page_redirects_without_session() {
    let t = test_app();
    let res = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");

    let login = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
}

// ── Working-hours editor ──

#[tokio::test]
async fn test_working_hours_editor() {
    let t = test_app();

    let (status, week) = t.admin("GET", "/api/admin/working-hours", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(week.as_array().unwrap().len(), 7);
    assert_eq!(week[0]["enabled"], true);
    assert!(week[0]["start_time"].is_null());

    let rows: Vec<serde_json::Value> = (1..=7)
        .map(|d| {
            if d <= 5 {
                serde_json::json!({"weekday": d, "enabled": true, "start_time": "09:00", "end_time": "15:00"})
            } else {
                serde_json::json!({"weekday": d, "enabled": false, "start_time": "", "end_time": ""})
            }
        })
        .collect();
    let (status, saved) = t
        .admin("PUT", "/api/admin/working-hours", Some(serde_json::json!(rows)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved[4]["end_time"], "15:00");
    assert!(saved[6]["start_time"].is_null());

    let (_, json) = t.get(&format!("/api/slots?date={}", future_weekday(1))).await;
    assert_eq!(slots(&json).last().map(String::as_str), Some("14:00"));

    let mut invalid = rows.clone();
    invalid[0] = serde_json::json!({"weekday": 1, "enabled": true, "start_time": "12:00", "end_time": "10:00"});
    let (status, _) = t
        .admin("PUT", "/api/admin/working-hours", Some(serde_json::json!(invalid)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, week) = t.admin("GET", "/api/admin/working-hours", None).await;
    assert_eq!(week[0]["start_time"], "09:00");
}

// ── Email relays ──

#[tokio::test]
async fn test_reject_relay_includes_reason() {
    let t = test_app();
    let (status, json) = t
        .post_json(
            "/api/reject-reservation",
            serde_json::json!({
                "firstName": "Jana",
                "lastName": "Nováková",
                "email": "jana@example.cz",
                "phone": "777123456",
                "date": "2025-06-16",
                "time": "10:00",
                "rejectReason": "Termín je obsazen"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "mock-email-id");

    let sent = t.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("zamítnuta"));
    assert!(sent[0].html.contains("Termín je obsazen"));
}

#[tokio::test]
async fn test_relays_reject_non_post() {
    let t = test_app();
    for uri in [
        "/api/notify-reservation",
        "/api/confirm-reservation",
        "/api/reject-reservation",
        "/api/register-client",
        "/api/send",
    ] {
        for method in ["GET", "PUT", "DELETE"] {
            let (status, json) = t
                .request(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            assert_eq!(json, serde_json::json!({"error": "Method not allowed"}));
        }
    }
}

#[tokio::test]
async fn test_relay_accepts_json_string_body() {
    let t = test_app();
    let inner = serde_json::json!({
        "name": "Petr",
        "email": "petr@example.cz",
        "subject": "Spolupráce",
        "message": "Dobrý den"
    })
    .to_string();
    let (status, _) = t.post_json("/api/send", serde_json::json!(inner)).await;
    assert_eq!(status, StatusCode::OK);

    let sent = t.sent();
    assert_eq!(sent[0].to, "info@jirakovaiva.cz");
    assert_eq!(sent[0].subject, "Nová zpráva z kontaktního formuláře - Spolupráce");
}

#[tokio::test]
async fn test_register_client_and_failures() {
    let t = test_app();
    let form = serde_json::json!({
        "name": "Eva",
        "surname": "Malá",
        "email": "eva@example.cz",
        "phone": "777000111",
        "street": "Hlavní 1",
        "zip": "60200",
        "city": "Brno"
    });
    let (status, json) = t.post_json("/api/register-client", form.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({"ok": true}));
    assert_eq!(t.sent()[0].subject, "Nová registrace klienta");

    t.email.failing.store(true, Ordering::SeqCst);
    let (status, json) = t.post_json("/api/register-client", form).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Něco se pokazilo při zpracování registrace");

    let (status, json) = t
        .request(
            Request::builder()
                .method("POST")
                .uri("/api/notify-reservation")
                .body(Body::from("{broken"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Něco se pokazilo při odesílání emailu");
}

// ── Content ──

#[tokio::test]
async fn test_news_crud_with_image() {
    let t = test_app();

    let (status, created) = t
        .admin(
            "POST",
            "/api/admin/news",
            Some(serde_json::json!({
                "title": "Nová kolekce",
                "description": "Přijďte se podívat",
                "image": {"file_name": "foto.png", "content_base64": png_base64(1800, 900)}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    let image_url = created["image_url"].as_str().unwrap().to_string();
    assert!(image_url.ends_with(".webp"));
    let path = image_url.trim_start_matches("http://localhost:3000");

    let res = t
        .app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "image/webp");
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let stored = image::load_from_memory(&bytes).unwrap();
    assert_eq!((stored.width(), stored.height()), (1200, 600));

    let (_, list) = t.get("/api/news?latest=true").await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = t
        .admin(
            "PUT",
            &format!("/api/admin/news/{id}"),
            Some(serde_json::json!({
                "title": "Upraveno",
                "description": "Přijďte se podívat",
                "remove_image": true
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["image_url"].is_null());
    let (status, _) = t.get(path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t.admin("DELETE", &format!("/api/admin/news/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = t.get(&format!("/api/news/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_news_rejects_blank_fields_and_non_images() {
    let t = test_app();

    let (status, json) = t
        .admin(
            "POST",
            "/api/admin/news",
            Some(serde_json::json!({"title": "   ", "description": "  "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["title"].is_array());
    assert!(json["fields"]["description"].is_array());

    let (status, json) = t
        .admin(
            "POST",
            "/api/admin/news",
            Some(serde_json::json!({
                "title": "Akce",
                "description": "Sleva",
                "image": {"file_name": "fake.png", "content_base64": "aGVsbG8="}
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["image"].is_array());

    let (_, list) = t.get("/api/news").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_large_template_file_is_downloaded() {
    use base64::Engine;
    let t = test_app();

    let mut pdf = b"%PDF-1.7\n".to_vec();
    pdf.resize(3 * 1024 * 1024, b'x');
    let (status, created) = t
        .admin(
            "POST",
            "/api/admin/templates",
            Some(serde_json::json!({
                "title": "Katalog",
                "description": "Celý katalog",
                "cta": "Stáhnout",
                "icon": "BookOpen",
                "file": {
                    "file_name": "katalog.pdf",
                    "content_base64": base64::engine::general_purpose::STANDARD.encode(&pdf)
                }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let path = created["href"]
        .as_str()
        .unwrap()
        .trim_start_matches("http://localhost:3000")
        .to_string();
    let res = t
        .app
        .clone()
        .oneshot(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
    assert_eq!(
        res.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment"
    );
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.len(), pdf.len());
}

#[tokio::test]
async fn test_templates_link_or_file() {
    let t = test_app();
    let base = serde_json::json!({
        "title": "Checklist",
        "description": "Před schůzkou",
        "cta": "Stáhnout",
        "icon": "FileText"
    });

    let mut both = base.clone();
    both["href"] = serde_json::json!("https://example.cz");
    both["file"] = serde_json::json!({"file_name": "a.pdf", "content_base64": "JVBERg=="});
    let (status, _) = t.admin("POST", "/api/admin/templates", Some(both)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut with_file = base.clone();
    with_file["file"] = serde_json::json!({"file_name": "a.pdf", "content_base64": "JVBERg=="});
    let (status, created) = t.admin("POST", "/api/admin/templates", Some(with_file)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["href"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:3000/files/templates/"));

    let mut with_link = base.clone();
    with_link["href"] = serde_json::json!("https://example.cz/navod");
    let (status, _) = t.admin("POST", "/api/admin/templates", Some(with_link)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, count) = t.admin("GET", "/api/admin/templates/count", None).await;
    assert_eq!(count["count"], 2);

    let id = created["id"].as_str().unwrap();
    let (status, _) = t.admin("DELETE", &format!("/api/admin/templates/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = t.get("/api/templates").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_static_texts() {
    let t = test_app();
    let (status, created) = t
        .admin(
            "POST",
            "/api/admin/static-texts",
            Some(serde_json::json!({"key": "hero.title", "value": "Ahoj", "section": "hero"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let (status, _) = t
        .admin(
            "POST",
            "/api/admin/static-texts",
            Some(serde_json::json!({"key": "hero.title", "value": "Znovu", "section": "hero"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = t
        .admin(
            "POST",
            "/api/admin/static-texts",
            Some(serde_json::json!({"key": "   ", "value": "x", "section": " "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["fields"]["key"].is_array());
    assert!(json["fields"]["section"].is_array());

    let (status, _) = t
        .admin(
            "PUT",
            &format!("/api/admin/static-texts/{id}"),
            Some(serde_json::json!({"value": "Vítejte"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = t.get("/api/static-texts?section=hero").await;
    assert_eq!(json["values"]["hero.title"], "Vítejte");
    let (_, json) = t.get("/api/static-texts?section=footer").await;
    assert!(json["texts"].as_array().unwrap().is_empty());

    let (status, _) = t
        .admin(
            "PUT",
            "/api/admin/static-texts/missing",
            Some(serde_json::json!({"value": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Pages ──

#[tokio::test]
async fn test_landing_page_has_seo_head() {
    let t = test_app();
    let res = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("rel=\"canonical\""));
    assert!(html.contains("https://www.jirakovaiva.cz"));
    assert!(html.contains("og:locale"));
}

#[tokio::test]
async fn test_health() {
    let t = test_app();
    let (status, json) = t.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}
