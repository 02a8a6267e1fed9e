use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, booking, content, pages, relay};
use crate::services::storage::{Bucket, UPLOAD_BODY_LIMIT};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let news_images = ServeDir::new(state.storage.dir(Bucket::NewsImages));
    // Template files are downloads; never render them inline on the site origin.
    let templates = SetResponseHeader::overriding(
        ServeDir::new(state.storage.dir(Bucket::Templates)),
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment"),
    );

    Router::new()
        .route("/health", get(pages::health))
        .route("/", get(pages::landing_page))
        .route("/login", get(pages::login_page))
        .route("/admin", get(pages::admin_page))
        // Form relays answer anything but POST with a JSON 405.
        .route(
            "/api/notify-reservation",
            post(relay::notify_reservation).fallback(relay::method_not_allowed),
        )
        .route(
            "/api/confirm-reservation",
            post(relay::confirm_reservation).fallback(relay::method_not_allowed),
        )
        .route(
            "/api/reject-reservation",
            post(relay::reject_reservation).fallback(relay::method_not_allowed),
        )
        .route(
            "/api/register-client",
            post(relay::register_client).fallback(relay::method_not_allowed),
        )
        .route(
            "/api/send",
            post(relay::send_contact).fallback(relay::method_not_allowed),
        )
        .route("/api/slots", get(booking::get_slots))
        .route("/api/working-hours/closed", get(booking::get_closed_weekdays))
        .route("/api/reservations", post(booking::create_reservation))
        .route("/api/news", get(content::list_news))
        .route("/api/news/:id", get(content::get_news))
        .route("/api/templates", get(content::list_templates))
        .route("/api/static-texts", get(content::list_static_texts))
        .nest_service("/files/news-images", news_images)
        .nest_service("/files/templates", templates)
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/reservations/pending", get(admin::get_pending))
        .route(
            "/api/admin/reservations/:id",
            axum::routing::delete(admin::delete_reservation),
        )
        .route(
            "/api/admin/reservations/:id/approve",
            post(admin::approve_reservation),
        )
        .route(
            "/api/admin/reservations/:id/reject",
            post(admin::reject_reservation),
        )
        .route(
            "/api/admin/reservations/:id/cancel",
            post(admin::cancel_reservation),
        )
        .route("/api/admin/calendar", get(admin::get_calendar_day))
        .route("/api/admin/calendar/days", get(admin::get_calendar_days))
        .route(
            "/api/admin/working-hours",
            get(admin::get_working_hours).put(admin::put_working_hours),
        )
        .route(
            "/api/admin/news",
            post(content::create_news).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/admin/news/:id",
            put(content::update_news)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .delete(content::delete_news),
        )
        .route(
            "/api/admin/templates",
            post(content::create_template).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/admin/templates/count", get(admin::get_templates_count))
        .route(
            "/api/admin/templates/:id",
            put(content::update_template)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .delete(content::delete_template),
        )
        .route(
            "/api/admin/static-texts",
            get(content::admin_static_texts).post(content::create_static_text),
        )
        .route("/api/admin/static-texts/:id", put(content::update_static_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
