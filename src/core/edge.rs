//! Ungerichtete Wand zwischen zwei Vertices.

/// Eine Wand; beide Endpunkte werden per ID referenziert, nie per Wert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Eindeutige Edge-ID
    pub id: u64,
    /// Start-Vertex-ID
    pub start_vertex_id: u64,
    /// End-Vertex-ID
    pub end_vertex_id: u64,
}

impl Edge {
    /// Erstellt eine neue Wand
    pub fn new(id: u64, start_vertex_id: u64, end_vertex_id: u64) -> Self {
        Self {
            id,
            start_vertex_id,
            end_vertex_id,
        }
    }

    /// Ungeordnetes Vertex-Paar als Schlüssel (kleinere ID zuerst).
    pub fn vertex_pair(&self) -> (u64, u64) {
        pair_key(self.start_vertex_id, self.end_vertex_id)
    }

    /// Prüft ob die Wand den Vertex berührt.
    pub fn touches(&self, vertex_id: u64) -> bool {
        self.start_vertex_id == vertex_id || self.end_vertex_id == vertex_id
    }

    /// Liefert den jeweils anderen Endpunkt, falls `vertex_id` ein Endpunkt ist.
    pub fn other_end(&self, vertex_id: u64) -> Option<u64> {
        if self.start_vertex_id == vertex_id {
            Some(self.end_vertex_id)
        } else if self.end_vertex_id == vertex_id {
            Some(self.start_vertex_id)
        } else {
            None
        }
    }
}

/// Normalisiert ein Vertex-Paar unabhängig von der Richtung.
pub(crate) fn pair_key(a: u64, b: u64) -> (u64, u64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
