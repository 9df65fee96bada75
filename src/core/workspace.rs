use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DEFAULT_COLOR;

/// Top-level container. Every note and group belongs to exactly one
/// workspace; items predating workspaces carry no id and are treated as
/// belonging to the default one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: default_color(),
            icon: None,
            created_at: Utc::now(),
            description: None,
            is_default: false,
        }
    }
}
