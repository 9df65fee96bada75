use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A checklist entry embedded in a note. Not independently persisted: the
/// backing store keeps the list inside the note record, so the sync layer
/// carries it across merges instead of reading it back from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: Uuid,
    pub completed: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDateTime>,
    #[serde(default)]
    pub comments: String,
    /// Dependency edge to another item in the same list. Self-reference is
    /// never offered as a choice; longer cycles are not checked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preceding_task_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<NaiveDateTime>,
}

impl TodoItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            completed: false,
            description: description.into(),
            deadline: None,
            comments: String::new(),
            preceding_task_id: None,
            reminder_time: None,
        }
    }

    /// The item this one depends on, if it exists in `todos`.
    pub fn preceding<'a>(&self, todos: &'a [TodoItem]) -> Option<&'a TodoItem> {
        let wanted = self.preceding_task_id?;
        todos.iter().find(|t| t.id == wanted)
    }

    /// Whether this item may be completed: either it has no dependency, or
    /// the preceding item is done. A dangling dependency does not block.
    pub fn is_unblocked(&self, todos: &[TodoItem]) -> bool {
        match self.preceding(todos) {
            Some(preceding) => preceding.completed,
            None => true,
        }
    }

    /// Items that may be selected as this one's dependency: everything in
    /// the list except the item itself.
    pub fn preceding_candidates<'a>(&self, todos: &'a [TodoItem]) -> Vec<&'a TodoItem> {
        todos.iter().filter(|t| t.id != self.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_list() -> Vec<TodoItem> {
        vec![
            TodoItem::new("Draft outline"),
            TodoItem::new("Write sections"),
            TodoItem::new("Proofread"),
        ]
    }

    #[test]
    fn candidates_exclude_self() {
        let todos = make_list();
        let candidates = todos[1].preceding_candidates(&todos);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|t| t.id != todos[1].id));
    }

    #[test]
    fn no_dependency_is_unblocked() {
        let todos = make_list();
        assert!(todos[0].is_unblocked(&todos));
    }

    #[test]
    fn incomplete_dependency_blocks() {
        let mut todos = make_list();
        todos[1].preceding_task_id = Some(todos[0].id);
        assert!(!todos[1].is_unblocked(&todos));

        todos[0].completed = true;
        assert!(todos[1].is_unblocked(&todos));
    }

    #[test]
    fn dangling_dependency_does_not_block() {
        let mut todos = make_list();
        todos[2].preceding_task_id = Some(Uuid::new_v4());
        assert!(todos[2].is_unblocked(&todos));
    }
}
