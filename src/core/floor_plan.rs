//! Der zentrale Graph-Store: Vertices, Wände und abgeleitete Räume.
//!
//! Alle mutierenden Operationen prüfen ihre Vorbedingungen vollständig,
//! bevor sie etwas verändern. Schlägt eine Prüfung fehl, bleibt der Store
//! unverändert.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;

use super::edge::pair_key;
use super::error::{EntityKind, GraphError, GraphResult};
use super::geometry;
use super::{Edge, SpatialIndex, SpatialMatch, Surface, Vertex};

/// Ergebnis von [`FloorPlan::remove_vertex`]: der Vertex und alle kaskadiert entfernten Wände.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedVertex {
    /// Entfernter Vertex
    pub vertex: Vertex,
    /// Mit entfernte Wände (nach ID sortiert)
    pub edges: Vec<Edge>,
}

/// Ergebnis von [`FloorPlan::split_edge`].
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult {
    /// Die ersetzte Originalwand (ihre ID ist danach stillgelegt)
    pub original: Edge,
    /// Neu angelegter Teilungs-Vertex
    pub vertex: Vertex,
    /// Die beiden neuen Teilwände (start→neu, neu→ende)
    pub edges: [Edge; 2],
}

/// Normalisierter Wandgraph mit abgeleiteten Räumen.
#[derive(Debug, Clone, Default)]
pub struct FloorPlan {
    vertices: HashMap<u64, Vertex>,
    edges: HashMap<u64, Edge>,
    /// Aktuelle Räume, nach ID geordnet
    surfaces: BTreeMap<u64, Surface>,
    /// Vertex-ID → berührende Edge-IDs (sortiert)
    adjacency: HashMap<u64, Vec<u64>>,
    /// Ungeordnetes Vertex-Paar → Edge-ID (Duplikat-Check in O(1))
    pair_index: HashMap<(u64, u64), u64>,
    /// Persistenter Spatial-Index für Snap-Abfragen
    spatial_index: SpatialIndex,
}

impl FloorPlan {
    /// Erstellt einen leeren Grundriss
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutationen ──────────────────────────────────────────────────

    /// Fügt einen Vertex mit vorgegebener ID hinzu.
    pub fn add_vertex(&mut self, vertex: Vertex) -> GraphResult<()> {
        if self.vertices.contains_key(&vertex.id) {
            return Err(GraphError::DuplicateId {
                kind: EntityKind::Vertex,
                id: vertex.id,
            });
        }
        if !vertex.position.is_finite() {
            return Err(GraphError::DegenerateGeometry(format!(
                "Vertex {} hat keine endliche Position",
                vertex.id
            )));
        }

        self.vertices.insert(vertex.id, vertex);
        self.adjacency.entry(vertex.id).or_default();
        self.rebuild_spatial_index();
        Ok(())
    }

    /// Prüft alle Vorbedingungen für eine neue Wand, ohne zu mutieren.
    fn validate_new_edge(&self, edge: &Edge) -> GraphResult<()> {
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateId {
                kind: EntityKind::Edge,
                id: edge.id,
            });
        }

        let start = self.require_vertex(edge.start_vertex_id)?;
        let end = self.require_vertex(edge.end_vertex_id)?;

        if edge.start_vertex_id == edge.end_vertex_id {
            return Err(GraphError::DegenerateGeometry(format!(
                "Wand {} beginnt und endet an Vertex {}",
                edge.id, edge.start_vertex_id
            )));
        }
        if start.position == end.position {
            return Err(GraphError::DegenerateGeometry(format!(
                "Wand {} hat Länge 0 (Vertex {} und {} liegen aufeinander)",
                edge.id, edge.start_vertex_id, edge.end_vertex_id
            )));
        }

        if let Some(&existing_edge_id) = self.pair_index.get(&edge.vertex_pair()) {
            return Err(GraphError::StructuralConflict {
                start_id: edge.start_vertex_id,
                end_id: edge.end_vertex_id,
                existing_edge_id,
            });
        }
        Ok(())
    }

    /// Fügt eine Wand hinzu.
    ///
    /// Beide Endpunkte müssen existieren und verschieden sein; pro
    /// ungeordnetem Vertex-Paar ist nur eine Wand erlaubt.
    pub fn add_edge(&mut self, edge: Edge) -> GraphResult<()> {
        self.validate_new_edge(&edge)?;
        self.insert_edge_unchecked(edge);
        Ok(())
    }

    fn insert_edge_unchecked(&mut self, edge: Edge) {
        self.pair_index.insert(edge.vertex_pair(), edge.id);
        for vertex_id in [edge.start_vertex_id, edge.end_vertex_id] {
            let incident = self.adjacency.entry(vertex_id).or_default();
            if let Err(pos) = incident.binary_search(&edge.id) {
                incident.insert(pos, edge.id);
            }
        }
        self.edges.insert(edge.id, edge);
    }

    /// Fügt eine Wand ohne Prüfung ein (nur für Invarianten-Tests).
    #[cfg(test)]
    pub(crate) fn insert_edge_unvalidated(&mut self, edge: Edge) {
        self.insert_edge_unchecked(edge);
    }

    fn detach_edge(&mut self, edge_id: u64) -> Option<Edge> {
        let edge = self.edges.remove(&edge_id)?;
        self.pair_index.remove(&edge.vertex_pair());
        for vertex_id in [edge.start_vertex_id, edge.end_vertex_id] {
            if let Some(incident) = self.adjacency.get_mut(&vertex_id) {
                incident.retain(|&id| id != edge_id);
            }
        }
        Some(edge)
    }

    /// Verwirft alle Räume, die eine der Wände enthalten.
    fn drop_surfaces_with_edges(&mut self, edge_ids: &[u64]) {
        self.surfaces
            .retain(|_, surface| !edge_ids.iter().any(|id| surface.contains_edge(*id)));
    }

    /// Entfernt einen Vertex inklusive aller Wände, die ihn berühren.
    ///
    /// Räume mit einer der entfernten Wände werden sofort verworfen.
    pub fn remove_vertex(&mut self, vertex_id: u64) -> GraphResult<RemovedVertex> {
        let vertex = *self.require_vertex(vertex_id)?;

        let incident = self.adjacency.remove(&vertex_id).unwrap_or_default();
        let edges: Vec<Edge> = incident
            .iter()
            .filter_map(|&edge_id| self.detach_edge(edge_id))
            .collect();
        self.vertices.remove(&vertex_id);
        self.drop_surfaces_with_edges(&incident);
        self.rebuild_spatial_index();

        Ok(RemovedVertex { vertex, edges })
    }

    /// Entfernt eine Wand. Dadurch isolierte Vertices bleiben bestehen.
    pub fn remove_edge(&mut self, edge_id: u64) -> GraphResult<Edge> {
        let edge = self
            .detach_edge(edge_id)
            .ok_or(GraphError::InvalidReference {
                kind: EntityKind::Edge,
                id: edge_id,
            })?;
        self.drop_surfaces_with_edges(&[edge_id]);
        Ok(edge)
    }

    /// Ersetzt eine Wand atomar durch zwei Teilwände mit neuem Vertex bei `point`.
    ///
    /// Die Original-ID wird stillgelegt; `new_vertex_id` und `new_edge_ids`
    /// müssen frei und paarweise verschieden sein.
    pub fn split_edge(
        &mut self,
        edge_id: u64,
        point: Vec2,
        new_vertex_id: u64,
        new_edge_ids: [u64; 2],
    ) -> GraphResult<SplitResult> {
        let original = *self.require_edge(edge_id)?;

        if self.vertices.contains_key(&new_vertex_id) {
            return Err(GraphError::DuplicateId {
                kind: EntityKind::Vertex,
                id: new_vertex_id,
            });
        }
        for new_id in new_edge_ids {
            if new_id == edge_id || self.edges.contains_key(&new_id) {
                return Err(GraphError::DuplicateId {
                    kind: EntityKind::Edge,
                    id: new_id,
                });
            }
        }
        if new_edge_ids[0] == new_edge_ids[1] {
            return Err(GraphError::DuplicateId {
                kind: EntityKind::Edge,
                id: new_edge_ids[0],
            });
        }
        if !point.is_finite() {
            return Err(GraphError::DegenerateGeometry(format!(
                "Teilungspunkt für Wand {} ist nicht endlich",
                edge_id
            )));
        }

        let start = self.require_vertex(original.start_vertex_id)?.position;
        let end = self.require_vertex(original.end_vertex_id)?.position;
        if point == start || point == end {
            return Err(GraphError::DegenerateGeometry(format!(
                "Teilungspunkt fällt auf einen Endpunkt von Wand {}",
                edge_id
            )));
        }

        if let Some(occupant) = self.vertex_on(point) {
            return Err(GraphError::DegenerateGeometry(format!(
                "Teilungspunkt für Wand {} liegt auf Vertex {}",
                edge_id, occupant
            )));
        }

        // Ab hier kann nichts mehr fehlschlagen
        let vertex = Vertex::new(new_vertex_id, point);
        let edges = [
            Edge::new(new_edge_ids[0], original.start_vertex_id, new_vertex_id),
            Edge::new(new_edge_ids[1], new_vertex_id, original.end_vertex_id),
        ];

        self.detach_edge(edge_id);
        self.drop_surfaces_with_edges(&[edge_id]);
        self.vertices.insert(new_vertex_id, vertex);
        self.adjacency.entry(new_vertex_id).or_default();
        for edge in edges {
            self.insert_edge_unchecked(edge);
        }
        self.rebuild_spatial_index();

        Ok(SplitResult {
            original,
            vertex,
            edges,
        })
    }

    /// Ersetzt die Raum-Menge durch ein neues Erkennungsergebnis.
    pub(crate) fn replace_surfaces(&mut self, surfaces: BTreeMap<u64, Surface>) {
        self.surfaces = surfaces;
    }

    /// Setzt das Label eines Raums und liefert das vorherige Label.
    pub(crate) fn set_surface_label(
        &mut self,
        surface_id: u64,
        label: Option<String>,
    ) -> GraphResult<Option<String>> {
        let surface = self
            .surfaces
            .get_mut(&surface_id)
            .ok_or(GraphError::InvalidReference {
                kind: EntityKind::Surface,
                id: surface_id,
            })?;
        Ok(std::mem::replace(&mut surface.label, label))
    }

    // ── Abfragen ────────────────────────────────────────────────────

    fn require_vertex(&self, vertex_id: u64) -> GraphResult<&Vertex> {
        self.vertices
            .get(&vertex_id)
            .ok_or(GraphError::InvalidReference {
                kind: EntityKind::Vertex,
                id: vertex_id,
            })
    }

    fn require_edge(&self, edge_id: u64) -> GraphResult<&Edge> {
        self.edges.get(&edge_id).ok_or(GraphError::InvalidReference {
            kind: EntityKind::Edge,
            id: edge_id,
        })
    }

    /// Liefert einen Vertex — O(1)
    pub fn vertex(&self, vertex_id: u64) -> Option<&Vertex> {
        self.vertices.get(&vertex_id)
    }

    /// Liefert eine Wand — O(1)
    pub fn edge(&self, edge_id: u64) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Liefert einen Raum
    pub fn surface(&self, surface_id: u64) -> Option<&Surface> {
        self.surfaces.get(&surface_id)
    }

    /// Alle Räume nach ID geordnet (read-only).
    pub fn surfaces(&self) -> &BTreeMap<u64, Surface> {
        &self.surfaces
    }

    /// Alle Vertices (read-only).
    pub fn vertices(&self) -> &HashMap<u64, Vertex> {
        &self.vertices
    }

    /// Alle Wände (read-only).
    pub fn edges(&self) -> &HashMap<u64, Edge> {
        &self.edges
    }

    /// Wände nach ID sortiert (deterministische Reihenfolge).
    pub fn sorted_edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges.values().collect();
        edges.sort_unstable_by_key(|e| e.id);
        edges
    }

    /// IDs der Wände, die einen Vertex berühren — O(1)
    pub fn incident_edges(&self, vertex_id: u64) -> &[u64] {
        self.adjacency
            .get(&vertex_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Benachbarte Vertex-IDs — O(Grad)
    pub fn neighbors(&self, vertex_id: u64) -> Vec<u64> {
        self.incident_edges(vertex_id)
            .iter()
            .filter_map(|id| self.edges.get(id)?.other_end(vertex_id))
            .collect()
    }

    /// Wand zwischen zwei Vertices (richtungsunabhängig) — O(1)
    pub fn edge_between(&self, a: u64, b: u64) -> Option<u64> {
        self.pair_index.get(&pair_key(a, b)).copied()
    }

    /// Endpunkt-Positionen einer Wand.
    pub fn edge_endpoints(&self, edge_id: u64) -> Option<(Vec2, Vec2)> {
        let edge = self.edges.get(&edge_id)?;
        let start = self.vertices.get(&edge.start_vertex_id)?.position;
        let end = self.vertices.get(&edge.end_vertex_id)?.position;
        Some((start, end))
    }

    /// Länge einer Wand in Welteinheiten.
    pub fn wall_length(&self, edge_id: u64) -> Option<f32> {
        let (start, end) = self.edge_endpoints(edge_id)?;
        Some(geometry::distance(start, end))
    }

    /// Gibt die Anzahl der Vertices zurück
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Gibt die Anzahl der Wände zurück
    pub fn wall_count(&self) -> usize {
        self.edges.len()
    }

    /// Gibt die Anzahl der Räume zurück
    pub fn room_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Summe aller Raumflächen.
    pub fn total_area(&self) -> f32 {
        self.surfaces.values().map(|s| s.area).sum()
    }

    /// Prüft ob der Grundriss leer ist.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.surfaces.is_empty()
    }

    /// Berechnet die nächste freie Vertex-ID
    pub fn next_vertex_id(&self) -> u64 {
        self.vertices.keys().max().copied().unwrap_or(0) + 1
    }

    /// Berechnet die nächste freie Edge-ID
    pub fn next_edge_id(&self) -> u64 {
        self.edges.keys().max().copied().unwrap_or(0) + 1
    }

    // ── Spatial ─────────────────────────────────────────────────────

    /// Baut den persistenten Spatial-Index aus den aktuellen Vertices neu auf.
    fn rebuild_spatial_index(&mut self) {
        self.spatial_index = SpatialIndex::from_vertices(&self.vertices);
    }

    /// Findet den nächstgelegenen Vertex zur Weltposition.
    pub fn nearest_vertex(&self, query: Vec2) -> Option<SpatialMatch> {
        self.spatial_index.nearest(query)
    }

    /// Findet alle Vertices innerhalb eines Radius (Welteinheiten).
    pub fn vertices_within_radius(&self, query: Vec2, radius: f32) -> Vec<SpatialMatch> {
        self.spatial_index.within_radius(query, radius)
    }

    /// Vertex im Pixel-Snap-Radius um den Cursor (der nächste bei mehreren).
    pub fn vertex_at(&self, cursor: Vec2, snap_radius_px: f32, scale: f32) -> Option<SpatialMatch> {
        let radius = geometry::screen_to_world_threshold(snap_radius_px, scale);
        self.nearest_vertex(cursor).filter(|hit| hit.distance <= radius)
    }

    /// Vertex, der exakt auf `point` liegt.
    pub fn vertex_on(&self, point: Vec2) -> Option<u64> {
        self.spatial_index.occupied_by(point)
    }

    /// Snap-Auflösung über den Spatial-Index (Vertex-Snap vor Raster-Snap).
    ///
    /// Liefert dasselbe Ergebnis wie [`geometry::get_snapped_point`] über alle Vertices.
    pub fn snap_point(
        &self,
        cursor: Vec2,
        resolution: f32,
        scale: f32,
        snap_radius_px: f32,
    ) -> Vec2 {
        let candidate = self
            .vertex_at(cursor, snap_radius_px, scale)
            .map(|hit| hit.position);
        geometry::get_snapped_point(cursor, resolution, candidate, scale, snap_radius_px)
    }

    /// Findet die Wand, deren Inneres `point` trifft (die nächste bei mehreren).
    pub fn edge_at(&self, point: Vec2, threshold_px: f32, scale: f32) -> Option<u64> {
        self.edges
            .values()
            .filter_map(|edge| {
                let (a, b) = self.edge_endpoints(edge.id)?;
                geometry::is_point_on_segment(point, a, b, threshold_px, scale)
                    .then(|| (edge.id, geometry::distance_to_segment(point, a, b)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }
}

/// Zwei Grundrisse sind gleich, wenn Vertices, Wände und Räume übereinstimmen.
///
/// Abgeleitete Indizes (Adjazenz, Spatial-Index) werden nicht verglichen.
impl PartialEq for FloorPlan {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.edges == other.edges
            && self.surfaces == other.surfaces
    }
}
