pub mod resend;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Hands the message to the provider and returns its raw JSON response.
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<serde_json::Value>;
}
