//! Fehler-Taxonomie des Graph-Kerns.

use std::fmt;

/// Art einer Graph-Entität (für Fehlermeldungen und Selektion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Eckpunkt
    Vertex,
    /// Wand
    Edge,
    /// Raum (abgeleitet)
    Surface,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Vertex => "Vertex",
            EntityKind::Edge => "Edge",
            EntityKind::Surface => "Surface",
        };
        f.write_str(name)
    }
}

/// Fehler bei Graph-Mutationen und der Raumerkennung.
///
/// Jede abgelehnte Operation lässt den Zustand unverändert.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// ID ist bereits vergeben
    #[error("{kind} {id} existiert bereits")]
    DuplicateId { kind: EntityKind, id: u64 },

    /// Referenz auf eine nicht existierende Entität
    #[error("{kind} {id} existiert nicht")]
    InvalidReference { kind: EntityKind, id: u64 },

    /// Wand ohne Länge (gleiche Endpunkte oder deckungsgleiche Koordinaten)
    #[error("Degenerierte Geometrie: {0}")]
    DegenerateGeometry(String),

    /// Zwischen beiden Vertices existiert bereits eine Wand
    #[error("Wand zwischen Vertex {start_id} und {end_id} existiert bereits (Edge {existing_edge_id})")]
    StructuralConflict {
        start_id: u64,
        end_id: u64,
        existing_edge_id: u64,
    },

    /// Interne Inkonsistenz (z.B. Half-Edge ohne Twin), deutet auf einen Bug im Graph-Store
    #[error("Invariante verletzt: {0}")]
    InvariantViolation(String),
}

/// Ergebnis-Alias für Graph-Operationen.
pub type GraphResult<T> = Result<T, GraphError>;
