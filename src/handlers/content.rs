use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::extract::Json;
use crate::handlers::admin::check_auth;
use crate::models::{News, NewsInput, StaticText, Template, TemplateInput};
use crate::services::content::{self, NewStaticText, LATEST_NEWS};
use crate::state::AppState;

// GET /api/news?limit=
#[derive(Deserialize)]
pub struct NewsQuery {
    pub limit: Option<i64>,
    #[serde(default)]
    pub latest: bool,
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Vec<News>>, AppError> {
    let limit = if query.latest { Some(LATEST_NEWS) } else { query.limit };
    Ok(Json(content::list_news(&state, limit)?))
}

// GET /api/news/:id
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<News>, AppError> {
    Ok(Json(content::get_news(&state, &id)?))
}

// GET /api/templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Template>>, AppError> {
    Ok(Json(content::list_templates(&state)?))
}

// GET /api/static-texts?section=
#[derive(Deserialize)]
pub struct StaticTextQuery {
    pub section: Option<String>,
}

#[derive(Serialize)]
pub struct StaticTextsResponse {
    texts: Vec<StaticText>,
    values: BTreeMap<String, String>,
}

pub async fn list_static_texts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StaticTextQuery>,
) -> Result<Json<StaticTextsResponse>, AppError> {
    let texts = content::list_static_texts(&state, query.section.as_deref())?;
    let values = content::static_text_map(&texts);
    Ok(Json(StaticTextsResponse { texts, values }))
}

// POST /api/admin/news
pub async fn create_news(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<NewsInput>,
) -> Result<(StatusCode, Json<News>), AppError> {
    check_auth(&state, &headers)?;
    let news = content::create_news(&state, input).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

// PUT /api/admin/news/:id
pub async fn update_news(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<NewsInput>,
) -> Result<Json<News>, AppError> {
    check_auth(&state, &headers)?;
    Ok(Json(content::update_news(&state, &id, input).await?))
}

// DELETE /api/admin/news/:id
pub async fn delete_news(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&state, &headers)?;
    content::delete_news(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/admin/templates
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<TemplateInput>,
) -> Result<(StatusCode, Json<Template>), AppError> {
    check_auth(&state, &headers)?;
    let template = content::create_template(&state, input).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

// PUT /api/admin/templates/:id
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<TemplateInput>,
) -> Result<Json<Template>, AppError> {
    check_auth(&state, &headers)?;
    Ok(Json(content::update_template(&state, &id, input).await?))
}

// DELETE /api/admin/templates/:id
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&state, &headers)?;
    content::delete_template(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/admin/static-texts
pub async fn admin_static_texts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<StaticText>>, AppError> {
    check_auth(&state, &headers)?;
    Ok(Json(content::list_static_texts(&state, None)?))
}

// POST /api/admin/static-texts
pub async fn create_static_text(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<NewStaticText>,
) -> Result<(StatusCode, Json<StaticText>), AppError> {
    check_auth(&state, &headers)?;
    let text = content::create_static_text(&state, input)?;
    Ok((StatusCode::CREATED, Json(text)))
}

// PUT /api/admin/static-texts/:id
#[derive(Deserialize)]
pub struct StaticTextUpdate {
    pub value: String,
}

pub async fn update_static_text(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StaticTextUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&state, &headers)?;
    content::update_static_text(&state, &id, &body.value)?;
    Ok(Json(serde_json::json!({"ok": true})))
}
