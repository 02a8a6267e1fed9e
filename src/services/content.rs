use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{News, NewsInput, StaticText, Template, TemplateInput, Upload, TEMPLATE_ICONS};
use crate::services::images;
use crate::services::local_now;
use crate::services::storage::{decode_base64, Bucket, MAX_UPLOAD_BYTES};
use crate::state::AppState;

/// Landing page shows this many posts.
pub const LATEST_NEWS: i64 = 3;

fn decode_upload(upload: &Upload, field: &str) -> Result<Vec<u8>, AppError> {
    let bytes = decode_base64(&upload.content_base64)
        .map_err(|_| AppError::field(field, "Soubor se nepodařilo načíst"))?;
    if bytes.is_empty() {
        return Err(AppError::field(field, "Soubor je prázdný"));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::field(field, "Soubor je příliš velký"));
    }
    Ok(bytes)
}

async fn store_template_file(state: &AppState, upload: &Upload) -> Result<String, AppError> {
    let bytes = decode_upload(upload, "file")?;
    Ok(state.storage.put(Bucket::Templates, &upload.extension(), &bytes).await?)
}

/// News photos are always re-encoded, so only real images get stored.
async fn store_news_image(state: &AppState, upload: &Upload) -> Result<String, AppError> {
    let bytes = decode_upload(upload, "image")?;
    let webp = tokio::task::spawn_blocking(move || images::compress_to_webp(&bytes))
        .await
        .map_err(|e| anyhow::anyhow!("image task failed: {e}"))?
        .map_err(|e| {
            tracing::warn!(error = %e, file_name = %upload.file_name, "rejected news image");
            AppError::field("image", "Obrázek se nepodařilo zpracovat")
        })?;
    Ok(state.storage.put(Bucket::NewsImages, images::WEBP_EXTENSION, &webp).await?)
}

/// Storage cleanup never fails the request; the row is already gone or replaced.
async fn discard(state: &AppState, bucket: Bucket, key: Option<&str>) {
    let Some(key) = key else { return };
    if let Err(e) = state.storage.remove(bucket, key).await {
        tracing::warn!(bucket = bucket.as_str(), key, error = %e, "failed to remove stored object");
    }
}

fn with_image_url(state: &AppState, mut news: News) -> News {
    news.image_url = news
        .image_path
        .as_deref()
        .map(|key| state.storage.public_url(Bucket::NewsImages, key));
    news
}

// ── News ──

pub fn list_news(state: &AppState, limit: Option<i64>) -> Result<Vec<News>, AppError> {
    let rows = {
        let db = state.db()?;
        queries::list_news(&db, limit.filter(|l| *l > 0))?
    };
    Ok(rows.into_iter().map(|n| with_image_url(state, n)).collect())
}

pub fn get_news(state: &AppState, id: &str) -> Result<News, AppError> {
    let news = {
        let db = state.db()?;
        queries::get_news(&db, id)?
    };
    news.map(|n| with_image_url(state, n))
        .ok_or_else(|| AppError::NotFound(format!("news {id}")))
}

pub async fn create_news(state: &AppState, input: NewsInput) -> Result<News, AppError> {
    let input = input.normalized();
    input.validate()?;
    let image_path = match &input.image {
        Some(upload) => Some(store_news_image(state, upload).await?),
        None => None,
    };

    let news = News {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        image_path,
        image_url: None,
        created_at: input.created_at.unwrap_or_else(local_now),
    };
    let saved = {
        let db = state.db()?;
        queries::save_news(&db, &news)
    };
    if let Err(e) = saved {
        discard(state, Bucket::NewsImages, news.image_path.as_deref()).await;
        return Err(e.into());
    }

    tracing::info!(id = %news.id, "news created");
    Ok(with_image_url(state, news))
}

pub async fn update_news(state: &AppState, id: &str, input: NewsInput) -> Result<News, AppError> {
    let input = input.normalized();
    input.validate()?;
    let existing = get_news(state, id)?;

    let mut replaced = None;
    let image_path = if let Some(upload) = &input.image {
        replaced = existing.image_path.clone();
        Some(store_news_image(state, upload).await?)
    } else if input.remove_image {
        replaced = existing.image_path.clone();
        None
    } else {
        existing.image_path.clone()
    };

    let news = News {
        id: existing.id,
        title: input.title,
        description: input.description,
        image_path,
        image_url: None,
        created_at: input.created_at.unwrap_or(existing.created_at),
    };
    {
        let db = state.db()?;
        queries::save_news(&db, &news)?;
    }
    discard(state, Bucket::NewsImages, replaced.as_deref()).await;

    tracing::info!(id, "news updated");
    Ok(with_image_url(state, news))
}

pub async fn delete_news(state: &AppState, id: &str) -> Result<(), AppError> {
    let existing = get_news(state, id)?;
    {
        let db = state.db()?;
        queries::delete_news(&db, id)?;
    }
    discard(state, Bucket::NewsImages, existing.image_path.as_deref()).await;
    tracing::info!(id, "news deleted");
    Ok(())
}

// ── Templates ──

/// Expects an already normalized input.
fn validate_template(input: &TemplateInput, require_target: bool) -> Result<(), AppError> {
    input.validate()?;
    if !TEMPLATE_ICONS.contains(&input.icon.as_str()) {
        return Err(AppError::field("icon", "Neznámá ikona"));
    }
    match (input.link(), &input.file) {
        (Some(_), Some(_)) => Err(AppError::field("href", "Zadejte buď odkaz, nebo soubor")),
        (None, None) if require_target => {
            Err(AppError::field("href", "Zadejte odkaz nebo nahrajte soubor"))
        }
        _ => Ok(()),
    }
}

pub fn list_templates(state: &AppState) -> Result<Vec<Template>, AppError> {
    let db = state.db()?;
    Ok(queries::list_templates(&db)?)
}

pub fn count_templates(state: &AppState) -> Result<i64, AppError> {
    let db = state.db()?;
    Ok(queries::count_templates(&db)?)
}

fn load_template(state: &AppState, id: &str) -> Result<Template, AppError> {
    let db = state.db()?;
    queries::get_template(&db, id)?.ok_or_else(|| AppError::NotFound(format!("template {id}")))
}

pub async fn create_template(state: &AppState, input: TemplateInput) -> Result<Template, AppError> {
    let input = input.normalized();
    validate_template(&input, true)?;

    let (href, file_path) = match (&input.file, input.link()) {
        (Some(upload), _) => {
            let key = store_template_file(state, upload).await?;
            (state.storage.public_url(Bucket::Templates, &key), Some(key))
        }
        (None, Some(link)) => (link.to_string(), None),
        (None, None) => return Err(AppError::field("href", "Zadejte odkaz nebo nahrajte soubor")),
    };

    let template = Template {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        cta: input.cta,
        icon: input.icon,
        href,
        file_path,
        created_at: local_now(),
    };
    let saved = {
        let db = state.db()?;
        queries::save_template(&db, &template)
    };
    if let Err(e) = saved {
        discard(state, Bucket::Templates, template.file_path.as_deref()).await;
        return Err(e.into());
    }

    tracing::info!(id = %template.id, "template created");
    Ok(template)
}

/// Without a new link or file the current target is kept.
pub async fn update_template(
    state: &AppState,
    id: &str,
    input: TemplateInput,
) -> Result<Template, AppError> {
    let input = input.normalized();
    validate_template(&input, false)?;
    let existing = load_template(state, id)?;

    let mut replaced = None;
    let (href, file_path) = match (&input.file, input.link()) {
        (Some(upload), _) => {
            replaced = existing.file_path.clone();
            let key = store_template_file(state, upload).await?;
            (state.storage.public_url(Bucket::Templates, &key), Some(key))
        }
        (None, Some(link)) => {
            replaced = existing.file_path.clone();
            (link.to_string(), None)
        }
        (None, None) => (existing.href.clone(), existing.file_path.clone()),
    };

    let template = Template {
        id: existing.id,
        title: input.title,
        description: input.description,
        cta: input.cta,
        icon: input.icon,
        href,
        file_path,
        created_at: existing.created_at,
    };
    {
        let db = state.db()?;
        queries::save_template(&db, &template)?;
    }
    discard(state, Bucket::Templates, replaced.as_deref()).await;

    tracing::info!(id, "template updated");
    Ok(template)
}

pub async fn delete_template(state: &AppState, id: &str) -> Result<(), AppError> {
    let existing = load_template(state, id)?;
    {
        let db = state.db()?;
        queries::delete_template(&db, id)?;
    }
    discard(state, Bucket::Templates, existing.file_path.as_deref()).await;
    tracing::info!(id, "template deleted");
    Ok(())
}

// ── Static texts ──

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStaticText {
    #[validate(length(min = 1, message = "Klíč je povinný"))]
    pub key: String,
    pub value: String,
    #[validate(length(min = 1, message = "Sekce je povinná"))]
    pub section: String,
}

impl NewStaticText {
    pub fn normalized(self) -> Self {
        Self {
            key: self.key.trim().to_string(),
            value: self.value,
            section: self.section.trim().to_string(),
        }
    }
}

pub fn list_static_texts(state: &AppState, section: Option<&str>) -> Result<Vec<StaticText>, AppError> {
    let db = state.db()?;
    Ok(queries::list_static_texts(&db, section)?)
}

/// `key → value` lookup the page templates read from.
pub fn static_text_map(texts: &[StaticText]) -> BTreeMap<String, String> {
    texts
        .iter()
        .map(|t| (t.key.clone(), t.value.clone()))
        .collect()
}

pub fn create_static_text(state: &AppState, input: NewStaticText) -> Result<StaticText, AppError> {
    let input = input.normalized();
    input.validate()?;
    let now = local_now();
    let text = StaticText {
        id: uuid::Uuid::new_v4().to_string(),
        key: input.key,
        value: input.value,
        section: input.section,
        created_at: now,
        updated_at: now,
    };

    let db = state.db()?;
    let taken = queries::list_static_texts(&db, None)?
        .iter()
        .any(|t| t.key == text.key);
    if taken {
        return Err(AppError::Conflict(format!("static text {} already exists", text.key)));
    }
    queries::insert_static_text(&db, &text)?;
    tracing::info!(key = %text.key, "static text created");
    Ok(text)
}

pub fn update_static_text(state: &AppState, id: &str, value: &str) -> Result<(), AppError> {
    let db = state.db()?;
    if !queries::update_static_text(&db, id, value, &local_now())? {
        return Err(AppError::NotFound(format!("static text {id}")));
    }
    tracing::info!(id, "static text updated");
    Ok(())
}
