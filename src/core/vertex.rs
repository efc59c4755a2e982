//! Eckpunkt des Wandgraphen.

use glam::Vec2;

/// Ein Punkt in der Ebene, an dem Wände beginnen oder enden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Eindeutige Vertex-ID (vom Aufrufer vergeben)
    pub id: u64,
    /// Weltposition
    pub position: Vec2,
}

impl Vertex {
    /// Erstellt einen neuen Vertex
    pub fn new(id: u64, position: Vec2) -> Self {
        Self { id, position }
    }

    /// Komfort-Konstruktor aus Einzelkoordinaten
    pub fn at(id: u64, x: f32, y: f32) -> Self {
        Self::new(id, Vec2::new(x, y))
    }
}
