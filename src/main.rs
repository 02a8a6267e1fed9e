use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use consultdesk::config::AppConfig;
use consultdesk::db;
use consultdesk::routes;
use consultdesk::services::auth;
use consultdesk::services::email::resend::ResendProvider;
use consultdesk::services::storage::ObjectStorage;
use consultdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    auth::ensure_admin(&conn, &config.admin_username, &config.admin_password)?;

    if config.resend_api_key.is_empty() {
        tracing::warn!("RESEND_API_KEY not set, outgoing emails will fail");
    }
    let email = ResendProvider::new(config.resend_api_key.clone());

    let storage = ObjectStorage::new(&config.storage_dir, &config.public_url);
    tracing::info!("storing uploads under {}", storage.root().display());

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        email: Box::new(email),
        storage,
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
