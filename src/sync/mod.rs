pub mod api;
pub mod keyring;
pub mod session;

use futures::future::join_all;
use uuid::Uuid;

use crate::core::DEFAULT_COLOR;
use crate::dnd::plan::{DropPlan, VacatedGroup};
use crate::store::ClientStore;
use api::{
    ApiClient, ApiError, GroupDraft, GroupPatch, NoteDraft, NotePatch, WorkspaceDraft,
    WorkspacePatch,
};

/// Current sync status displayed in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Error(String),
    LastSynced(String), // formatted timestamp
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self::Idle
    }
}

/// The sync layer: the only writer of the [`ClientStore`]. Every mutation
/// issues exactly one request against the remote service and applies the
/// server's returned representation after, and only after, a 2xx response.
/// Failures are logged and leave the store exactly as it was; there is no
/// retry and no rollback to perform because nothing was applied early.
pub struct SyncEngine {
    api: ApiClient,
}

impl SyncEngine {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Replace the store from a full server load. A user with no workspace
    /// yet gets their first one created here; the only workspace a user has
    /// is their default one.
    pub async fn load_all(&self, store: &mut ClientStore) -> Result<(), ApiError> {
        let mut workspaces = self.api.list_workspaces().await?;
        if workspaces.is_empty() {
            log::info!("No workspaces on the server, creating the first one");
            let draft = WorkspaceDraft {
                name: "My Workspace".to_string(),
                color: DEFAULT_COLOR.to_string(),
                description: None,
                icon: None,
            };
            let mut created = self.api.create_workspace(&draft).await?;
            created.is_default = true;
            workspaces.push(created);
        }
        let groups = self.api.list_groups(None).await?;
        let notes = self.api.list_notes(None, None).await?;

        log::info!(
            "Loaded {} workspaces, {} groups, {} notes",
            workspaces.len(),
            groups.len(),
            notes.len()
        );
        store.replace_all(workspaces, groups, notes);
        Ok(())
    }

    // --- notes ---

    /// Create a note in the current workspace (unless the draft says
    /// otherwise). Rejected client-side when the title is empty.
    pub async fn create_note(
        &self,
        store: &mut ClientStore,
        mut draft: NoteDraft,
    ) -> Result<Uuid, ApiError> {
        if draft.title.trim().is_empty() {
            return Err(ApiError::validation("title", "a note needs a title"));
        }
        if draft.color.is_empty() {
            draft.color = DEFAULT_COLOR.to_string();
        }
        if draft.workspace_id.is_none() {
            draft.workspace_id = store.current_workspace_id();
        }

        let note = match self.api.create_note(&draft).await {
            Ok(n) => n,
            Err(e) => {
                log::error!("Failed to create note: {}", e);
                return Err(e);
            }
        };
        let id = note.id;
        store.upsert_note(note);
        Ok(id)
    }

    pub async fn update_note(
        &self,
        store: &mut ClientStore,
        id: Uuid,
        patch: NotePatch,
    ) -> Result<(), ApiError> {
        let touches_group = patch.group_id.is_some();
        let note = match self.api.update_note(id, &patch).await {
            Ok(n) => n,
            Err(e) => {
                log::error!("Failed to update note {}: {}", id, e);
                return Err(e);
            }
        };
        store.upsert_note(note);
        if touches_group {
            store.rebuild_group_caches();
        }
        Ok(())
    }

    pub async fn delete_note(&self, store: &mut ClientStore, id: Uuid) -> Result<(), ApiError> {
        if let Err(e) = self.api.delete_note(id).await {
            log::error!("Failed to delete note {}: {}", id, e);
            return Err(e);
        }
        store.remove_note(id);
        Ok(())
    }

    // --- groups ---

    pub async fn create_group(
        &self,
        store: &mut ClientStore,
        name: &str,
    ) -> Result<Uuid, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name", "a group needs a name"));
        }
        let draft = GroupDraft {
            name: name.to_string(),
            color: DEFAULT_COLOR.to_string(),
            workspace_id: store.current_workspace_id(),
        };
        let group = match self.api.create_group(&draft).await {
            Ok(g) => g,
            Err(e) => {
                log::error!("Failed to create group: {}", e);
                return Err(e);
            }
        };
        let id = group.id;
        store.upsert_group(group);
        Ok(id)
    }

    pub async fn update_group(
        &self,
        store: &mut ClientStore,
        id: Uuid,
        patch: GroupPatch,
    ) -> Result<(), ApiError> {
        let group = match self.api.update_group(id, &patch).await {
            Ok(g) => g,
            Err(e) => {
                log::error!("Failed to update group {}: {}", id, e);
                return Err(e);
            }
        };
        store.upsert_group(group);
        Ok(())
    }

    pub async fn delete_group(&self, store: &mut ClientStore, id: Uuid) -> Result<(), ApiError> {
        if let Err(e) = self.api.delete_group(id).await {
            log::error!("Failed to delete group {}: {}", id, e);
            return Err(e);
        }
        store.remove_group(id);
        Ok(())
    }

    // --- workspaces ---

    pub async fn create_workspace(
        &self,
        store: &mut ClientStore,
        mut draft: WorkspaceDraft,
    ) -> Result<Uuid, ApiError> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::validation("name", "a workspace needs a name"));
        }
        if draft.color.is_empty() {
            draft.color = DEFAULT_COLOR.to_string();
        }
        let workspace = match self.api.create_workspace(&draft).await {
            Ok(w) => w,
            Err(e) => {
                log::error!("Failed to create workspace: {}", e);
                return Err(e);
            }
        };
        let id = workspace.id;
        store.upsert_workspace(workspace);
        Ok(id)
    }

    pub async fn update_workspace(
        &self,
        store: &mut ClientStore,
        id: Uuid,
        patch: WorkspacePatch,
    ) -> Result<(), ApiError> {
        let workspace = match self.api.update_workspace(id, &patch).await {
            Ok(w) => w,
            Err(e) => {
                log::error!("Failed to update workspace {}: {}", id, e);
                return Err(e);
            }
        };
        store.upsert_workspace(workspace);
        Ok(())
    }

    /// Delete a workspace. The last remaining workspace cannot be deleted;
    /// that is rejected before any request goes out. On confirmation the
    /// deleted workspace's notes and groups move to the first remaining one.
    pub async fn delete_workspace(
        &self,
        store: &mut ClientStore,
        id: Uuid,
    ) -> Result<(), ApiError> {
        if store.workspaces().len() <= 1 {
            return Err(ApiError::validation(
                "workspace",
                "at least one workspace must remain",
            ));
        }
        if let Err(e) = self.api.delete_workspace(id).await {
            log::error!("Failed to delete workspace {}: {}", id, e);
            return Err(e);
        }
        if let Some(target) = store.remove_workspace(id) {
            log::info!("Workspace {} deleted, items moved to {}", id, target);
        }
        Ok(())
    }

    // --- drag-and-drop execution ---

    /// Execute a drop plan proposed by the reconciliation engine. Never
    /// fails past this boundary: every request that errors is logged and the
    /// affected note keeps its previous association, while the rest of the
    /// batch applies. Membership caches are rebuilt once the gesture settles.
    pub async fn execute_drop(&self, store: &mut ClientStore, plan: DropPlan) {
        match plan {
            DropPlan::MergeGroups {
                source,
                target,
                moved,
            } => {
                self.regroup_batch(store, &moved, Some(target)).await;
                self.delete_group_confirmed(store, source).await;
            }
            DropPlan::DissolveGroup { group, members } => {
                self.regroup_batch(store, &members, None).await;
                self.delete_group_confirmed(store, group).await;
            }
            DropPlan::UngroupNote { note, vacated } => {
                if self.regroup_one(store, note, None).await {
                    self.settle_vacated(store, vacated).await;
                }
            }
            DropPlan::PairNotes {
                dragged,
                target,
                name,
                vacated,
            } => {
                let evicted: Vec<Uuid> = [dragged, target]
                    .into_iter()
                    .filter(|id| store.note(*id).and_then(|n| n.group_id).is_some())
                    .collect();
                self.regroup_batch(store, &evicted, None).await;
                for v in vacated {
                    self.settle_vacated(store, Some(v)).await;
                }

                let draft = GroupDraft {
                    name,
                    color: DEFAULT_COLOR.to_string(),
                    workspace_id: store.current_workspace_id(),
                };
                match self.api.create_group(&draft).await {
                    Ok(group) => {
                        let gid = group.id;
                        store.upsert_group(group);
                        self.regroup_batch(store, &[target, dragged], Some(gid)).await;
                    }
                    Err(e) => log::error!("Failed to create group for note pair: {}", e),
                }
            }
            DropPlan::JoinGroup {
                note,
                target,
                vacated,
            } => {
                if let Some(v) = vacated {
                    if !self.regroup_one(store, note, None).await {
                        store.rebuild_group_caches();
                        return;
                    }
                    self.settle_vacated(store, Some(v)).await;
                }
                self.regroup_one(store, note, Some(target)).await;
            }
        }
        store.rebuild_group_caches();
    }

    /// Carry out the dissolution half of an eviction: ungroup the remaining
    /// members, then delete the group. A plain shrink needs no requests of
    /// its own; the cache rebuild after the gesture covers it.
    async fn settle_vacated(&self, store: &mut ClientStore, vacated: Option<VacatedGroup>) {
        match vacated {
            Some(VacatedGroup::Dissolve { group, remaining }) => {
                self.regroup_batch(store, &remaining, None).await;
                self.delete_group_confirmed(store, group).await;
            }
            Some(VacatedGroup::Shrink { .. }) | None => {}
        }
    }

    /// Re-point every listed note at `group` concurrently, waiting for the
    /// whole batch to settle before applying the confirmed echoes.
    async fn regroup_batch(&self, store: &mut ClientStore, notes: &[Uuid], group: Option<Uuid>) {
        if notes.is_empty() {
            return;
        }
        let patch = NotePatch::group(group);
        let results = join_all(notes.iter().map(|id| self.api.update_note(*id, &patch))).await;
        for (id, result) in notes.iter().zip(results) {
            match result {
                Ok(echo) => store.upsert_note(echo),
                Err(e) => log::error!("Failed to update note {}: {}", id, e),
            }
        }
    }

    async fn regroup_one(&self, store: &mut ClientStore, note: Uuid, group: Option<Uuid>) -> bool {
        match self.api.update_note(note, &NotePatch::group(group)).await {
            Ok(echo) => {
                store.upsert_note(echo);
                true
            }
            Err(e) => {
                log::error!("Failed to update note {}: {}", note, e);
                false
            }
        }
    }

    async fn delete_group_confirmed(&self, store: &mut ClientStore, id: Uuid) {
        match self.api.delete_group(id).await {
            Ok(()) => store.remove_group(id),
            Err(e) => log::error!("Failed to delete group {}: {}", id, e),
        }
    }
}
