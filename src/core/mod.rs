//! Core-Domänentypen: Vertices, Wände, Räume, Grundriss und Raumerkennung.

pub mod edge;
pub mod error;
pub mod face_detection;
/// Geometrie-Hilfsfunktionen (Snap, Treffertests, Polygonflächen)
pub mod geometry;
pub mod floor_plan;
pub mod spatial;
pub mod surface;
pub mod vertex;

pub use edge::Edge;
pub use error::{EntityKind, GraphError, GraphResult};
pub use face_detection::{trace_faces, DetectionStats, FaceDetector, TracedFace};
pub use floor_plan::{FloorPlan, RemovedVertex, SplitResult};
pub use spatial::{SpatialIndex, SpatialMatch};
pub use surface::Surface;
pub use vertex::Vertex;
