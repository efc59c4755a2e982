//! Spatial-Index (KD-Tree) für Vertex-Abfragen beim Snapping.

use std::collections::HashMap;

use glam::Vec2;
use kiddo::{KdTree, SquaredEuclidean};

use crate::core::Vertex;

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// ID des gefundenen Vertex
    pub vertex_id: u64,
    /// Position des Vertex
    pub position: Vec2,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f32,
}

/// Read-only Spatial-Index über allen Vertices eines Grundrisses.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    vertex_ids: Vec<u64>,
    positions: Vec<Vec2>,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            vertex_ids: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Baut einen neuen Index aus den übergebenen Vertices.
    pub fn from_vertices(vertices: &HashMap<u64, Vertex>) -> Self {
        let mut vertex_ids: Vec<u64> = vertices.keys().copied().collect();
        vertex_ids.sort_unstable();

        let positions: Vec<Vec2> = vertex_ids
            .iter()
            .filter_map(|id| vertices.get(id).map(|v| v.position))
            .collect();

        let entries: Vec<[f64; 2]> = positions
            .iter()
            .map(|p| [p.x as f64, p.y as f64])
            .collect();

        let tree: KdTree<f64, 2> = (&entries).into();

        Self {
            tree,
            vertex_ids,
            positions,
        }
    }

    /// Gibt die Anzahl indexierter Vertices zurück.
    pub fn len(&self) -> usize {
        self.vertex_ids.len()
    }

    /// Gibt `true` zurück, wenn keine Vertices im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.vertex_ids.is_empty()
    }

    fn to_match(&self, item: u64, squared_distance: f64) -> Option<SpatialMatch> {
        let index = item as usize;
        Some(SpatialMatch {
            vertex_id: *self.vertex_ids.get(index)?,
            position: *self.positions.get(index)?,
            distance: (squared_distance as f32).sqrt(),
        })
    }

    /// Findet den nächsten Vertex zur gegebenen Weltposition.
    pub fn nearest(&self, query: Vec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x as f64, query.y as f64]);
        self.to_match(result.item, result.distance)
    }

    /// Findet alle Vertices innerhalb eines Radius, nach Distanz sortiert.
    pub fn within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&[query.x as f64, query.y as f64], (radius * radius) as f64)
            .into_iter()
            .filter_map(|entry| self.to_match(entry.item, entry.distance))
            .collect::<Vec<_>>();

        results.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.vertex_id.cmp(&b.vertex_id))
        });
        results
    }

    /// Vertex, der exakt auf `point` liegt (bei Duplikaten die kleinste ID).
    pub fn occupied_by(&self, point: Vec2) -> Option<u64> {
        self.within_radius(point, f32::EPSILON)
            .into_iter()
            .find(|hit| hit.position == point)
            .map(|hit| hit.vertex_id)
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::empty()
    }
}
