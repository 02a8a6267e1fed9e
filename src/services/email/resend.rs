use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{EmailMessage, EmailProvider};

pub struct ResendProvider {
    api_key: String,
    client: reqwest::Client,
}

impl ResendProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<serde_json::Value> {
        let body = json!({
            "from": message.from,
            "to": [message.to],
            "subject": message.subject,
            "html": message.html,
        });

        let resp = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call Resend API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Resend response")?;

        if !status.is_success() {
            anyhow::bail!("Resend API error ({}): {}", status, data);
        }

        Ok(data)
    }
}
