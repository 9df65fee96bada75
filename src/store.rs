use uuid::Uuid;

use crate::core::group::Group;
use crate::core::note::Note;
use crate::core::workspace::Workspace;

/// A group paired with its member notes, as derived for rendering. The
/// carried `group.note_ids` is rebuilt from the notes' back-references, not
/// taken from the cache.
#[derive(Debug, Clone)]
pub struct GroupView {
    pub group: Group,
    pub notes: Vec<Note>,
}

/// One entry in the current workspace's top-level layout: a group tile or a
/// free-standing note.
#[derive(Debug, Clone)]
pub enum WorkspaceItem {
    Group(GroupView),
    Note(Note),
}

/// In-memory model of the signed-in user's data: the single source of truth
/// for rendering. The sync layer is the only writer: every mutating method
/// here is called after (and only after) the server confirmed the
/// corresponding request.
#[derive(Debug, Clone, Default)]
pub struct ClientStore {
    notes: Vec<Note>,
    groups: Vec<Group>,
    workspaces: Vec<Workspace>,
    current_workspace_id: Option<Uuid>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn note(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn group(&self, id: Uuid) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn workspace(&self, id: Uuid) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == id)
    }

    pub fn default_workspace(&self) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.is_default)
    }

    pub fn current_workspace_id(&self) -> Option<Uuid> {
        self.current_workspace_id
    }

    pub fn current_workspace(&self) -> Option<&Workspace> {
        self.current_workspace_id.and_then(|id| self.workspace(id))
    }

    /// Switch the visible workspace. Unknown ids are ignored.
    pub fn set_current_workspace(&mut self, id: Uuid) {
        if self.workspace(id).is_some() {
            self.current_workspace_id = Some(id);
        }
    }

    /// Authoritative group membership, derived from the notes' back-references.
    pub fn group_members(&self, group_id: Uuid) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.group_id == Some(group_id))
            .collect()
    }

    /// Whether an item owned by `item_workspace` belongs to workspace `ws`.
    /// Items with no workspace id predate workspaces and count as belonging
    /// to the default one.
    fn belongs_to(&self, item_workspace: Option<Uuid>, ws: Uuid) -> bool {
        match item_workspace {
            Some(id) => id == ws,
            None => self.default_workspace().map(|w| w.id) == Some(ws),
        }
    }

    pub fn visible_notes(&self) -> Vec<&Note> {
        let Some(ws) = self.current_workspace_id else {
            return Vec::new();
        };
        self.notes
            .iter()
            .filter(|n| self.belongs_to(n.workspace_id, ws))
            .collect()
    }

    pub fn visible_groups(&self) -> Vec<&Group> {
        let Some(ws) = self.current_workspace_id else {
            return Vec::new();
        };
        self.groups
            .iter()
            .filter(|g| self.belongs_to(g.workspace_id, ws))
            .collect()
    }

    /// Notes in the current workspace that are not in any group.
    pub fn ungrouped_notes(&self) -> Vec<&Note> {
        self.visible_notes()
            .into_iter()
            .filter(|n| n.group_id.is_none())
            .collect()
    }

    /// Groups in the current workspace with their member notes. Groups that
    /// resolve to zero members are left out; they are scheduled for
    /// deletion anyway and must not render.
    pub fn grouped_notes(&self) -> Vec<GroupView> {
        let visible: Vec<&Note> = self.visible_notes();
        self.visible_groups()
            .into_iter()
            .filter_map(|group| {
                let notes: Vec<Note> = visible
                    .iter()
                    .filter(|n| n.group_id == Some(group.id))
                    .map(|n| (*n).clone())
                    .collect();
                if notes.is_empty() {
                    return None;
                }
                let mut group = group.clone();
                group.note_ids = notes.iter().map(|n| n.id).collect();
                Some(GroupView { group, notes })
            })
            .collect()
    }

    /// The current workspace's top-level layout: group tiles first, then
    /// free-standing notes.
    pub fn workspace_items(&self) -> Vec<WorkspaceItem> {
        let mut items: Vec<WorkspaceItem> = self
            .grouped_notes()
            .into_iter()
            .map(WorkspaceItem::Group)
            .collect();
        items.extend(
            self.ungrouped_notes()
                .into_iter()
                .map(|n| WorkspaceItem::Note(n.clone())),
        );
        items
    }

    // --- mutations (sync layer only) ---

    /// Replace the whole model from a fresh server load. The current
    /// workspace becomes the default one, else the first listed.
    pub fn replace_all(
        &mut self,
        workspaces: Vec<Workspace>,
        groups: Vec<Group>,
        notes: Vec<Note>,
    ) {
        self.workspaces = workspaces;
        self.groups = groups;
        self.notes = notes;
        self.current_workspace_id = self
            .default_workspace()
            .or_else(|| self.workspaces.first())
            .map(|w| w.id);
        self.rebuild_group_caches();
    }

    /// Insert or replace a workspace. Becoming the default clears the flag
    /// on every other workspace, mirroring the server.
    pub fn upsert_workspace(&mut self, workspace: Workspace) {
        if workspace.is_default {
            for w in &mut self.workspaces {
                w.is_default = false;
            }
        }
        match self.workspaces.iter_mut().find(|w| w.id == workspace.id) {
            Some(existing) => *existing = workspace,
            None => self.workspaces.push(workspace),
        }
        if self.current_workspace_id.is_none() {
            self.current_workspace_id = self.workspaces.first().map(|w| w.id);
        }
    }

    /// Remove a workspace, reassigning its notes and groups to the first
    /// remaining workspace. Refuses to remove the last workspace or an
    /// unknown id. Returns the workspace that inherited the items.
    pub fn remove_workspace(&mut self, id: Uuid) -> Option<Uuid> {
        if self.workspaces.len() <= 1 || self.workspace(id).is_none() {
            return None;
        }
        let target = self.workspaces.iter().find(|w| w.id != id).map(|w| w.id)?;

        for note in &mut self.notes {
            if note.workspace_id == Some(id) {
                note.workspace_id = Some(target);
            }
        }
        for group in &mut self.groups {
            if group.workspace_id == Some(id) {
                group.workspace_id = Some(target);
            }
        }
        self.workspaces.retain(|w| w.id != id);

        if self.current_workspace_id == Some(id) {
            self.current_workspace_id = Some(target);
        }
        Some(target)
    }

    /// Insert or replace a note. A server response does not echo the todo
    /// list, so an incoming note with no todos inherits the local list.
    pub fn upsert_note(&mut self, mut incoming: Note) {
        match self.notes.iter_mut().find(|n| n.id == incoming.id) {
            Some(existing) => {
                if incoming.todos.is_empty() {
                    incoming.todos = std::mem::take(&mut existing.todos);
                }
                *existing = incoming;
            }
            None => self.notes.push(incoming),
        }
    }

    pub fn remove_note(&mut self, id: Uuid) {
        self.notes.retain(|n| n.id != id);
        for group in &mut self.groups {
            group.note_ids.retain(|nid| *nid != id);
        }
    }

    /// Insert or replace a group, keeping the locally-tracked membership
    /// cache and expansion state the server knows nothing about.
    pub fn upsert_group(&mut self, mut incoming: Group) {
        match self.groups.iter_mut().find(|g| g.id == incoming.id) {
            Some(existing) => {
                incoming.note_ids = std::mem::take(&mut existing.note_ids);
                incoming.is_expanded = existing.is_expanded;
                *existing = incoming;
            }
            None => self.groups.push(incoming),
        }
    }

    /// Remove a group and clear the back-reference on any note still in it.
    pub fn remove_group(&mut self, id: Uuid) {
        for note in &mut self.notes {
            if note.group_id == Some(id) {
                note.group_id = None;
            }
        }
        self.groups.retain(|g| g.id != id);
    }

    /// Point a note at a new group (or none) and keep both affected caches
    /// in step.
    pub fn set_note_group(&mut self, note_id: Uuid, group_id: Option<Uuid>) {
        let Some(note) = self.notes.iter_mut().find(|n| n.id == note_id) else {
            return;
        };
        let previous = note.group_id;
        note.group_id = group_id;

        if let Some(prev) = previous {
            if let Some(group) = self.groups.iter_mut().find(|g| g.id == prev) {
                group.note_ids.retain(|id| *id != note_id);
            }
        }
        if let Some(next) = group_id {
            if let Some(group) = self.groups.iter_mut().find(|g| g.id == next) {
                if !group.note_ids.contains(&note_id) {
                    group.note_ids.push(note_id);
                }
            }
        }
    }

    pub fn set_group_expanded(&mut self, group_id: Uuid, expanded: bool) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) {
            group.is_expanded = expanded;
        }
    }

    /// Recompute every group's membership cache from the notes. Run after a
    /// settled batch so render state cannot drift from the back-references.
    pub fn rebuild_group_caches(&mut self) {
        let memberships: Vec<(Uuid, Vec<Uuid>)> = self
            .groups
            .iter()
            .map(|g| {
                let ids = self
                    .notes
                    .iter()
                    .filter(|n| n.group_id == Some(g.id))
                    .map(|n| n.id)
                    .collect();
                (g.id, ids)
            })
            .collect();
        for (gid, ids) in memberships {
            if let Some(group) = self.groups.iter_mut().find(|g| g.id == gid) {
                group.note_ids = ids;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::todo::TodoItem;

    fn make_workspace(name: &str, is_default: bool) -> Workspace {
        let mut w = Workspace::new(name);
        w.is_default = is_default;
        w
    }

    fn make_note(title: &str, workspace: Option<Uuid>) -> Note {
        let mut n = Note::new(title);
        n.workspace_id = workspace;
        n
    }

    fn store_with_default() -> (ClientStore, Uuid) {
        let mut store = ClientStore::new();
        let ws = make_workspace("Personal", true);
        let ws_id = ws.id;
        store.replace_all(vec![ws], Vec::new(), Vec::new());
        (store, ws_id)
    }

    #[test]
    fn notes_without_workspace_fall_back_to_default() {
        let (mut store, default_id) = store_with_default();
        let other = make_workspace("Work", false);
        let other_id = other.id;
        store.upsert_workspace(other);

        store.upsert_note(make_note("Legacy", None));
        store.upsert_note(make_note("Filed", Some(other_id)));

        store.set_current_workspace(default_id);
        let titles: Vec<&str> = store.visible_notes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Legacy"]);

        store.set_current_workspace(other_id);
        let titles: Vec<&str> = store.visible_notes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Filed"]);
    }

    #[test]
    fn grouped_notes_rebuilds_cache_and_drops_empty_groups() {
        let (mut store, ws_id) = store_with_default();
        let mut group = Group::new("Reading");
        group.workspace_id = Some(ws_id);
        // Deliberately stale cache.
        group.note_ids = vec![Uuid::new_v4()];
        let group_id = group.id;
        store.upsert_group(group);

        let mut empty = Group::new("Vacated");
        empty.workspace_id = Some(ws_id);
        store.upsert_group(empty);

        let mut a = make_note("A", Some(ws_id));
        a.group_id = Some(group_id);
        let a_id = a.id;
        let mut b = make_note("B", Some(ws_id));
        b.group_id = Some(group_id);
        let b_id = b.id;
        store.upsert_note(a);
        store.upsert_note(b);

        let views = store.grouped_notes();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].group.id, group_id);
        assert_eq!(views[0].group.note_ids, vec![a_id, b_id]);
    }

    #[test]
    fn workspace_items_list_groups_before_free_notes() {
        let (mut store, ws_id) = store_with_default();
        let free = make_note("Free", Some(ws_id));
        let free_id = free.id;
        store.upsert_note(free);

        let mut group = Group::new("Pair");
        group.workspace_id = Some(ws_id);
        let gid = group.id;
        store.upsert_group(group);
        let mut a = make_note("A", Some(ws_id));
        a.group_id = Some(gid);
        let mut b = make_note("B", Some(ws_id));
        b.group_id = Some(gid);
        store.upsert_note(a);
        store.upsert_note(b);

        let items = store.workspace_items();
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], WorkspaceItem::Group(view) if view.group.id == gid));
        assert!(matches!(&items[1], WorkspaceItem::Note(n) if n.id == free_id));
    }

    #[test]
    fn upsert_note_preserves_local_todos() {
        let (mut store, ws_id) = store_with_default();
        let mut note = make_note("Checklist", Some(ws_id));
        note.todos.push(TodoItem::new("First step"));
        let id = note.id;
        store.upsert_note(note);

        // Server echo: same note, no todos on the wire.
        let echo = make_note_with_id(id, "Checklist (renamed)", Some(ws_id));
        store.upsert_note(echo);

        let merged = store.note(id).unwrap();
        assert_eq!(merged.title, "Checklist (renamed)");
        assert_eq!(merged.todos.len(), 1);
    }

    fn make_note_with_id(id: Uuid, title: &str, workspace: Option<Uuid>) -> Note {
        let mut n = make_note(title, workspace);
        n.id = id;
        n
    }

    #[test]
    fn upsert_group_preserves_cache_and_expansion() {
        let (mut store, ws_id) = store_with_default();
        let mut group = Group::new("Ideas");
        group.workspace_id = Some(ws_id);
        let member = Uuid::new_v4();
        group.note_ids = vec![member];
        group.is_expanded = false;
        let id = group.id;
        store.upsert_group(group);

        let mut echo = Group::new("Ideas (renamed)");
        echo.id = id;
        echo.workspace_id = Some(ws_id);
        store.upsert_group(echo);

        let merged = store.group(id).unwrap();
        assert_eq!(merged.name, "Ideas (renamed)");
        assert_eq!(merged.note_ids, vec![member]);
        assert!(!merged.is_expanded);
    }

    #[test]
    fn only_one_default_workspace() {
        let (mut store, first_id) = store_with_default();
        let second = make_workspace("Work", true);
        let second_id = second.id;
        store.upsert_workspace(second);

        let defaults: Vec<Uuid> = store
            .workspaces()
            .iter()
            .filter(|w| w.is_default)
            .map(|w| w.id)
            .collect();
        assert_eq!(defaults, vec![second_id]);
        assert!(!store.workspace(first_id).unwrap().is_default);
    }

    #[test]
    fn remove_workspace_reassigns_items() {
        let (mut store, default_id) = store_with_default();
        let doomed = make_workspace("Scratch", false);
        let doomed_id = doomed.id;
        store.upsert_workspace(doomed);

        store.upsert_note(make_note("Kept", Some(doomed_id)));
        let mut group = Group::new("Kept group");
        group.workspace_id = Some(doomed_id);
        store.upsert_group(group);
        store.set_current_workspace(doomed_id);

        let target = store.remove_workspace(doomed_id);
        assert_eq!(target, Some(default_id));
        assert!(store.workspace(doomed_id).is_none());
        assert!(store.notes().iter().all(|n| n.workspace_id == Some(default_id)));
        assert!(store.groups().iter().all(|g| g.workspace_id == Some(default_id)));
        assert_eq!(store.current_workspace_id(), Some(default_id));
    }

    #[test]
    fn remove_last_workspace_is_refused() {
        let (mut store, only_id) = store_with_default();
        assert_eq!(store.remove_workspace(only_id), None);
        assert_eq!(store.workspaces().len(), 1);
    }

    #[test]
    fn remove_group_clears_back_references() {
        let (mut store, ws_id) = store_with_default();
        let mut group = Group::new("Doomed");
        group.workspace_id = Some(ws_id);
        let gid = group.id;
        store.upsert_group(group);

        let mut note = make_note("Member", Some(ws_id));
        note.group_id = Some(gid);
        let nid = note.id;
        store.upsert_note(note);

        store.remove_group(gid);
        assert!(store.group(gid).is_none());
        assert_eq!(store.note(nid).unwrap().group_id, None);
    }

    #[test]
    fn set_note_group_keeps_both_caches_in_step() {
        let (mut store, ws_id) = store_with_default();
        let mut from = Group::new("From");
        from.workspace_id = Some(ws_id);
        let from_id = from.id;
        let mut to = Group::new("To");
        to.workspace_id = Some(ws_id);
        let to_id = to.id;
        store.upsert_group(from);
        store.upsert_group(to);

        let mut note = make_note("Moving", Some(ws_id));
        note.group_id = Some(from_id);
        let nid = note.id;
        store.upsert_note(note);
        store.rebuild_group_caches();

        store.set_note_group(nid, Some(to_id));
        assert!(store.group(from_id).unwrap().note_ids.is_empty());
        assert_eq!(store.group(to_id).unwrap().note_ids, vec![nid]);
    }
}
