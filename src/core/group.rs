use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DEFAULT_COLOR;

/// A named cluster of notes inside a workspace. True membership lives on the
/// notes (`Note::group_id`); `note_ids` is a cached projection rebuilt after
/// every settled operation, and `is_expanded` is pure UI state. Neither is
/// sent to or read from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, skip_serializing)]
    pub note_ids: Vec<Uuid>,
    #[serde(default = "default_true", skip_serializing)]
    pub is_expanded: bool,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub order: Option<i64>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: default_color(),
            note_ids: Vec::new(),
            is_expanded: true,
            workspace_id: None,
            order: None,
        }
    }

    pub fn contains(&self, note_id: Uuid) -> bool {
        self.note_ids.contains(&note_id)
    }
}
