//! Application-Layer: Editor-Zustand, Commands, History und Wand-Werkzeug.

pub mod commands;
pub mod history;
/// Undo-fähiger Editor-Zustand
///
/// Grundriss und Selektion, ausschließlich über den `CommandManager` mutierbar.
pub mod state;
pub mod wall_tool;

pub use commands::{EditCommand, RemoveTarget};
pub use history::{AppliedCommand, CommandManager, EditHistory};
pub use state::{EditorState, EntityRef, SelectionState};
pub use wall_tool::{resolve_anchor, Anchor, WallTool};
