use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DEFAULT_COLOR;
use super::todo::TodoItem;

/// A note as held in the client model. `content` is the rich-text editor's
/// HTML and passes through opaquely. `todos` never appears on the wire; it
/// defaults empty on deserialization and the sync layer preserves the local
/// list when merging a server response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing)]
    pub todos: Vec<TodoItem>,
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub order: Option<i64>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            todos: Vec::new(),
            color: default_color(),
            created_at: now,
            updated_at: now,
            workspace_id: None,
            group_id: None,
            is_pinned: false,
            is_archived: false,
            order: None,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }
}
