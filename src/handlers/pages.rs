use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::errors::AppError;
use crate::handlers::admin::current_session;
use crate::services::seo::{self, SeoMeta};
use crate::state::AppState;

static LOGIN_HTML: &str = include_str!("../web/login.html");
static ADMIN_HTML: &str = include_str!("../web/admin.html");

// GET /
pub async fn landing_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(seo::render_page(&SeoMeta::for_site(&state.config.site_url))?))
}

// GET /login
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

// GET /admin
pub async fn admin_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    match current_session(&state, &headers)? {
        Some(_) => Ok(Html(ADMIN_HTML).into_response()),
        None => Ok(Redirect::to("/login").into_response()),
    }
}

// GET /health
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({"status": "ok"}))
}
