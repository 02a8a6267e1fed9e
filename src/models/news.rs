use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Admin form for creating or editing a news post. The image arrives base64 encoded.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsInput {
    #[validate(length(min = 1, message = "Název je povinný"))]
    pub title: String,
    #[validate(length(min = 1, message = "Popis je povinný"))]
    pub description: String,
    /// Back-dated publication time; now when absent.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub image: Option<Upload>,
    #[serde(default)]
    pub remove_image: bool,
}

impl NewsInput {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Upload {
    pub file_name: String,
    pub content_base64: String,
}

impl Upload {
    /// Lowercased file extension, `bin` when the name has none.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}
