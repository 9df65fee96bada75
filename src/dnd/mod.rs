pub mod plan;

use uuid::Uuid;

/// The thing a gesture picked up. Notes drag under their bare id; groups
/// drag under a synthetic `group-<id>` so the two namespaces cannot collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragItem {
    Note(Uuid),
    Group(Uuid),
}

impl DragItem {
    pub fn parse(id: &str) -> Option<Self> {
        if let Some(rest) = id.strip_prefix("group-") {
            return Uuid::parse_str(rest).ok().map(Self::Group);
        }
        Uuid::parse_str(id).ok().map(Self::Note)
    }

    pub fn draggable_id(&self) -> String {
        match self {
            Self::Note(id) => id.to_string(),
            Self::Group(id) => format!("group-{}", id),
        }
    }
}

/// Where a gesture can land: the open workspace area, a group tile, or a
/// single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Workspace,
    Group(Uuid),
    Note(Uuid),
}

impl DropTarget {
    pub fn parse(id: &str) -> Option<Self> {
        if id == "workspace" {
            return Some(Self::Workspace);
        }
        if let Some(rest) = id.strip_prefix("group-") {
            return Uuid::parse_str(rest).ok().map(Self::Group);
        }
        if let Some(rest) = id.strip_prefix("note-") {
            return Uuid::parse_str(rest).ok().map(Self::Note);
        }
        None
    }

    pub fn droppable_id(&self) -> String {
        match self {
            Self::Workspace => "workspace".to_string(),
            Self::Group(id) => format!("group-{}", id),
            Self::Note(id) => format!("note-{}", id),
        }
    }
}

/// A droppable position: which list, and where in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation {
    pub target: DropTarget,
    pub index: usize,
}

/// A completed gesture as reported by the drag layer. `destination` is
/// `None` when the item was dropped outside every droppable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub item: DragItem,
    pub source: DropLocation,
    pub destination: Option<DropLocation>,
}

impl DropEvent {
    /// Build an event from the drag layer's raw identifiers. Returns `None`
    /// when the draggable or source id does not parse; such gestures carry
    /// nothing we can act on.
    pub fn from_ids(
        draggable: &str,
        source: (&str, usize),
        destination: Option<(&str, usize)>,
    ) -> Option<Self> {
        let item = DragItem::parse(draggable)?;
        let source = DropLocation {
            target: DropTarget::parse(source.0)?,
            index: source.1,
        };
        let destination = match destination {
            Some((id, index)) => Some(DropLocation {
                target: DropTarget::parse(id)?,
                index,
            }),
            None => None,
        };
        Some(Self {
            item,
            source,
            destination,
        })
    }
}

/// One gesture's lifecycle. The drag layer reports start and end; in
/// between, the dragged item is available for render feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragItem),
}

impl DragState {
    pub fn drag_start(&mut self, item: DragItem) {
        *self = Self::Dragging(item);
    }

    /// Return to idle, yielding the item that was in flight.
    pub fn drag_end(&mut self) -> Option<DragItem> {
        match std::mem::take(self) {
            Self::Dragging(item) => Some(item),
            Self::Idle => None,
        }
    }

    pub fn dragging(&self) -> Option<DragItem> {
        match self {
            Self::Dragging(item) => Some(*item),
            Self::Idle => None,
        }
    }
}
