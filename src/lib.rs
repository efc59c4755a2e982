//! Grundriss-Editor Library.
//! Wandgraph, Raumerkennung und Command-History als Library exportiert für Tests und Wiederverwendung.

pub mod app;
pub mod core;
pub mod export;
pub mod shared;

pub use app::{
    Anchor, CommandManager, EditCommand, EditorState, EntityRef, RemoveTarget, SelectionState,
    WallTool,
};
pub use core::{
    Edge, EntityKind, FaceDetector, FloorPlan, GraphError, GraphResult, Surface, Vertex,
};
pub use core::{SpatialIndex, SpatialMatch};
pub use export::{export_document, import_session, load_session, rooms_csv, walls_csv};
pub use shared::DrawingOptions;
