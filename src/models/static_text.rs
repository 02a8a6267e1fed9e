use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticText {
    pub id: String,
    pub key: String,
    pub value: String,
    pub section: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
