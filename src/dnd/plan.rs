use uuid::Uuid;

use super::{DragItem, DropEvent, DropTarget};
use crate::store::ClientStore;

/// Name given to a group born from dropping one note onto another.
pub const NEW_GROUP_NAME: &str = "New Group";

/// What happens to a group some of whose members are being pulled out.
/// A group of one is not a group: when ≤ 1 member would remain, the group
/// dissolves and the stragglers are ungrouped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VacatedGroup {
    /// Two or more members remain; only the cached membership shrinks.
    Shrink { group: Uuid },
    /// The group is deleted; `remaining` lists members that must be
    /// ungrouped alongside the evicted ones.
    Dissolve { group: Uuid, remaining: Vec<Uuid> },
}

impl VacatedGroup {
    pub fn group_id(&self) -> Uuid {
        match self {
            Self::Shrink { group } | Self::Dissolve { group, .. } => *group,
        }
    }
}

/// The association changes one settled gesture asks for. Produced by
/// [`plan_drop`]; executed by the sync layer, which issues the network
/// requests and applies confirmations to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPlan {
    /// Move every member of `source` into `target`, then delete `source`.
    /// `moved` may be empty; the merge still runs structurally and the
    /// empty source is deleted.
    MergeGroups {
        source: Uuid,
        target: Uuid,
        moved: Vec<Uuid>,
    },
    /// A group dropped on the open workspace: ungroup all members, delete
    /// the group.
    DissolveGroup { group: Uuid, members: Vec<Uuid> },
    /// A note dropped on the open workspace: clear its association, with
    /// the dissolution rule applied to whatever group it left.
    UngroupNote {
        note: Uuid,
        vacated: Option<VacatedGroup>,
    },
    /// A note dropped on another note: evict both from their current
    /// groups, then create a fresh group containing exactly
    /// [`target`, `dragged`].
    PairNotes {
        dragged: Uuid,
        target: Uuid,
        name: String,
        vacated: Vec<VacatedGroup>,
    },
    /// A note dropped on an existing group it is not yet a member of.
    JoinGroup {
        note: Uuid,
        target: Uuid,
        vacated: Option<VacatedGroup>,
    },
}

/// Classify a settled gesture against the current model. Returns `None` for
/// every do-nothing case: no destination, dropped back where it started, a
/// group onto itself, a note onto itself or onto the group it is already in,
/// and a group onto a single note (groups cannot become pair members).
pub fn plan_drop(store: &ClientStore, event: &DropEvent) -> Option<DropPlan> {
    let destination = event.destination?;

    if event.source.target == destination.target && event.source.index == destination.index {
        return None;
    }

    match (event.item, destination.target) {
        (DragItem::Group(source), DropTarget::Group(target)) => {
            if source == target {
                return None;
            }
            Some(DropPlan::MergeGroups {
                source,
                target,
                moved: member_ids(store, source),
            })
        }
        (DragItem::Group(group), DropTarget::Workspace) => Some(DropPlan::DissolveGroup {
            members: member_ids(store, group),
            group,
        }),
        (DragItem::Group(_), DropTarget::Note(_)) => None,
        (DragItem::Note(note), DropTarget::Workspace) => Some(DropPlan::UngroupNote {
            vacated: vacated_groups(store, &[note]).into_iter().next(),
            note,
        }),
        (DragItem::Note(dragged), DropTarget::Note(target)) => {
            if dragged == target {
                return None;
            }
            Some(DropPlan::PairNotes {
                vacated: vacated_groups(store, &[dragged, target]),
                dragged,
                target,
                name: NEW_GROUP_NAME.to_string(),
            })
        }
        (DragItem::Note(note), DropTarget::Group(target)) => {
            let current = store.note(note).and_then(|n| n.group_id);
            if current == Some(target) {
                return None;
            }
            Some(DropPlan::JoinGroup {
                vacated: vacated_groups(store, &[note]).into_iter().next(),
                note,
                target,
            })
        }
    }
}

fn member_ids(store: &ClientStore, group: Uuid) -> Vec<Uuid> {
    store.group_members(group).iter().map(|n| n.id).collect()
}

/// For each distinct group the evicted notes are leaving, decide between a
/// cache shrink and a full dissolution. Membership counts come from the
/// authoritative back-references with the evicted notes already excluded.
fn vacated_groups(store: &ClientStore, evicted: &[Uuid]) -> Vec<VacatedGroup> {
    let mut seen: Vec<Uuid> = Vec::new();
    let mut out = Vec::new();
    for note_id in evicted {
        let Some(group_id) = store.note(*note_id).and_then(|n| n.group_id) else {
            continue;
        };
        if seen.contains(&group_id) {
            continue;
        }
        seen.push(group_id);

        let remaining: Vec<Uuid> = store
            .group_members(group_id)
            .iter()
            .map(|n| n.id)
            .filter(|id| !evicted.contains(id))
            .collect();
        if remaining.len() <= 1 {
            out.push(VacatedGroup::Dissolve {
                group: group_id,
                remaining,
            });
        } else {
            out.push(VacatedGroup::Shrink { group: group_id });
        }
    }
    out
}
