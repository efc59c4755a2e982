//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Zeichen-Optionen, die `app` (Snap, History-Tiefe) und das
//! Binary (Laden/Speichern) gemeinsam nutzen.

pub mod options;

pub use options::DrawingOptions;
pub use options::{EDGE_HIT_RADIUS_PX, GRID_RESOLUTION, HISTORY_DEPTH, VERTEX_SNAP_RADIUS_PX};
