use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Text {
    pub id: Uuid,
    pub workspace_id: String,
    pub title: String,
    pub content: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; `workspace_id` is supplied separately by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewText {
    pub title: String,
    pub content: String,
    pub created_by: String,
}

/// Partial update, `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl TextChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}
