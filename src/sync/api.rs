use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::group::Group;
use crate::core::note::Note;
use crate::core::workspace::Workspace;

/// Failure classes for remote operations. Mutations that fail leave client
/// state untouched; callers log and move on rather than retry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not signed in or session expired")]
    Unauthorized,
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server returned {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the caller should bounce to sign-in.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Body for `POST /notes`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
}

/// Partial update for `PUT /notes/{id}`. Omitted fields are not sent;
/// `group_id: Some(None)` serializes as an explicit `null` to clear the
/// association.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Option<Uuid>>,
}

impl NotePatch {
    /// A patch that only re-points (or clears) the note's group.
    pub fn group(group_id: Option<Uuid>) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }
}

/// Body for `POST /groups`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
}

/// Partial update for `PUT /groups/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Body for `POST /workspaces`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceDraft {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Partial update for `PUT /workspaces/{id}`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

/// JSON client for the remote CRUD service. One instance per signed-in
/// session; every request carries the session's bearer token.
pub struct ApiClient {
    base_url: String,
    token: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    // --- workspaces ---

    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>, ApiError> {
        let resp = self
            .http
            .get(self.url("workspaces"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn create_workspace(&self, draft: &WorkspaceDraft) -> Result<Workspace, ApiError> {
        let resp = self
            .http
            .post(self.url("workspaces"))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn update_workspace(
        &self,
        id: Uuid,
        patch: &WorkspacePatch,
    ) -> Result<Workspace, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("workspaces/{}", id)))
            .bearer_auth(&self.token)
            .json(patch)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn delete_workspace(&self, id: Uuid) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("workspaces/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    // --- groups ---

    pub async fn list_groups(&self, workspace: Option<Uuid>) -> Result<Vec<Group>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(ws) = workspace {
            query.push(("workspaceId", ws.to_string()));
        }
        let resp = self
            .http
            .get(self.url("groups"))
            .query(&query)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn create_group(&self, draft: &GroupDraft) -> Result<Group, ApiError> {
        let resp = self
            .http
            .post(self.url("groups"))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn update_group(&self, id: Uuid, patch: &GroupPatch) -> Result<Group, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("groups/{}", id)))
            .bearer_auth(&self.token)
            .json(patch)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn delete_group(&self, id: Uuid) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("groups/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    // --- notes ---

    pub async fn list_notes(
        &self,
        workspace: Option<Uuid>,
        group: Option<Uuid>,
    ) -> Result<Vec<Note>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(ws) = workspace {
            query.push(("workspaceId", ws.to_string()));
        }
        if let Some(g) = group {
            query.push(("groupId", g.to_string()));
        }
        let resp = self
            .http
            .get(self.url("notes"))
            .query(&query)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> Result<Note, ApiError> {
        let resp = self
            .http
            .post(self.url("notes"))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn update_note(&self, id: Uuid, patch: &NotePatch) -> Result<Note, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("notes/{}", id)))
            .bearer_auth(&self.token)
            .json(patch)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("notes/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

/// Map a non-2xx response onto the error taxonomy, draining the body for
/// the server's message.
pub(crate) async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(server_message(&body)),
        StatusCode::BAD_REQUEST => ApiError::Validation {
            field: "request".to_string(),
            message: server_message(&body),
        },
        _ => ApiError::Http { status, body },
    })
}

/// Pull the `error` field out of a JSON error body, falling back to the raw
/// text.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_clears_group_with_explicit_null() {
        let patch = NotePatch::group(None);
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"groupId":null}"#);
    }

    #[test]
    fn patch_sets_group_and_omits_untouched_fields() {
        let id = Uuid::new_v4();
        let patch = NotePatch::group(Some(id));
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, format!(r#"{{"groupId":"{}"}}"#, id));
    }

    #[test]
    fn server_message_prefers_error_field() {
        assert_eq!(server_message(r#"{"error":"Title is required"}"#), "Title is required");
        assert_eq!(server_message("plain failure"), "plain failure");
    }
}
