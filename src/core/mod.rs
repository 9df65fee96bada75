pub mod group;
pub mod note;
pub mod todo;
pub mod workspace;

/// Accent color applied to notes, groups, and workspaces created without an
/// explicit color choice.
pub const DEFAULT_COLOR: &str = "#4F46E5";
