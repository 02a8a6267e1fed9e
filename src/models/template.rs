use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::news::Upload;

pub const TEMPLATE_ICONS: [&str; 6] = [
    "FileText",
    "Instagram",
    "Lightbulb",
    "ClipboardCheck",
    "BookOpen",
    "Sparkles",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cta: String,
    pub icon: String,
    pub href: String,
    pub file_path: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Either `href` (external link) or `file` (uploaded download) must be given.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TemplateInput {
    #[validate(length(min = 1, message = "Název je povinný"))]
    pub title: String,
    #[validate(length(min = 1, message = "Popis je povinný"))]
    pub description: String,
    #[validate(length(min = 1, message = "Text tlačítka je povinný"))]
    pub cta: String,
    #[validate(length(min = 1, message = "Ikona je povinná"))]
    pub icon: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub file: Option<Upload>,
}

impl TemplateInput {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            cta: self.cta.trim().to_string(),
            icon: self.icon.trim().to_string(),
            ..self
        }
    }

    pub fn link(&self) -> Option<&str> {
        self.href.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }
}
