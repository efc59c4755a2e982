//! Raumerkennung über planare Face-Traversierung.
//!
//! Jede Wand wird in zwei gerichtete Half-Edges zerlegt. An jedem Vertex
//! sind die ausgehenden Half-Edges nach absolutem Richtungswinkel (`atan2`)
//! im Uhrzeigersinn sortiert.
//! Ausgehend von einer unbesuchten Half-Edge wird immer über den Twin zur
//! nächsten Half-Edge in der Rotationsreihenfolge weitergegangen, bis die
//! Start-Half-Edge wieder erreicht ist. Da diese Nachfolger-Abbildung eine
//! Permutation ist, liegt jede Half-Edge in genau einem Face.
//!
//! Räume laufen dabei gegen den Uhrzeigersinn (positive Fläche). Die äußere
//! Begrenzung jeder Zusammenhangskomponente hat nicht-positive Fläche und
//! wird verworfen.

use std::collections::{BTreeMap, HashMap};

use glam::Vec2;

use super::error::{GraphError, GraphResult};
use super::geometry::{polygon_centroid, signed_polygon_area};
use super::surface::signature_of;
use super::{FloorPlan, Surface};

/// Mindestfläche eines Raums; kleinere Faces gelten als Außenrand oder entartet.
pub const MIN_ROOM_AREA: f32 = 1e-3;

/// Mindestanzahl verschiedener Randwände eines Raums.
pub const MIN_ROOM_EDGES: usize = 3;

/// Gerichtete Hälfte einer Wand.
#[derive(Debug, Clone, Copy)]
struct HalfEdge {
    origin: u64,
    edge_id: u64,
    angle: f32,
}

/// Ein durch Traversierung gefundener Face-Zyklus (vor der Raum-Filterung).
#[derive(Debug, Clone, PartialEq)]
pub struct TracedFace {
    /// Besuchte Vertices in Umlaufreihenfolge (inklusive Sackgassen-Abstechern)
    pub vertex_ids: Vec<u64>,
    /// Wände, die genau einmal durchlaufen wurden, in Umlaufreihenfolge
    pub boundary_edge_ids: Vec<u64>,
    /// Wände, die in beide Richtungen durchlaufen wurden (Filamente, Brücken)
    pub retraced_edge_ids: Vec<u64>,
    /// Vorzeichenbehaftete Fläche des Zyklus
    pub area: f32,
    /// Flächenschwerpunkt des Zyklus
    pub centroid: Vec2,
}

impl TracedFace {
    /// Face ohne eigenen Rand: besteht nur aus hin und zurück gelaufenen Wänden.
    pub fn is_filament(&self) -> bool {
        self.boundary_edge_ids.is_empty()
    }

    /// Prüft ob das Face als Raum gemeldet wird.
    pub fn is_room(&self) -> bool {
        !self.is_filament()
            && self.area > MIN_ROOM_AREA
            && signature_of(&self.boundary_edge_ids).len() >= MIN_ROOM_EDGES
    }

    /// Kanonische Signatur des Faces.
    pub fn signature(&self) -> Vec<u64> {
        signature_of(&self.boundary_edge_ids)
    }
}

/// Traversiert alle Faces des Grundrisses.
///
/// Liefert jeden Zyklus genau einmal, inklusive Außenrändern und Filamenten.
/// Eine Wand mit fehlendem Endpunkt ist ein fataler Invarianten-Fehler.
pub fn trace_faces(plan: &FloorPlan) -> GraphResult<Vec<TracedFace>> {
    let edges = plan.sorted_edges();

    // Half-Edge 2k: start→end, 2k+1: end→start; Twin von i ist i ^ 1
    let mut half_edges: Vec<HalfEdge> = Vec::with_capacity(edges.len() * 2);
    for edge in &edges {
        let start = plan
            .vertex(edge.start_vertex_id)
            .ok_or_else(|| missing_endpoint(edge.id, edge.start_vertex_id))?
            .position;
        let end = plan
            .vertex(edge.end_vertex_id)
            .ok_or_else(|| missing_endpoint(edge.id, edge.end_vertex_id))?
            .position;
        let forward = end - start;
        let backward = start - end;
        half_edges.push(HalfEdge {
            origin: edge.start_vertex_id,
            edge_id: edge.id,
            angle: forward.y.atan2(forward.x),
        });
        half_edges.push(HalfEdge {
            origin: edge.end_vertex_id,
            edge_id: edge.id,
            angle: backward.y.atan2(backward.x),
        });
    }

    // Rotationsreihenfolge pro Vertex: absteigender Winkel = im Uhrzeigersinn
    let mut outgoing: HashMap<u64, Vec<usize>> = HashMap::new();
    for (index, he) in half_edges.iter().enumerate() {
        outgoing.entry(he.origin).or_default().push(index);
    }
    let mut rotation_pos = vec![0usize; half_edges.len()];
    for ring in outgoing.values_mut() {
        ring.sort_by(|&a, &b| {
            half_edges[b]
                .angle
                .total_cmp(&half_edges[a].angle)
                .then(half_edges[a].edge_id.cmp(&half_edges[b].edge_id))
        });
        for (pos, &index) in ring.iter().enumerate() {
            rotation_pos[index] = pos;
        }
    }

    let mut visited = vec![false; half_edges.len()];
    let mut faces = Vec::new();

    for start in 0..half_edges.len() {
        if visited[start] {
            continue;
        }

        let mut cycle = Vec::new();
        let mut current = start;
        loop {
            visited[current] = true;
            cycle.push(current);

            let twin = current ^ 1;
            let origin = half_edges
                .get(twin)
                .ok_or_else(|| {
                    GraphError::InvariantViolation(format!("Half-Edge {} hat keinen Twin", current))
                })?
                .origin;
            let ring = outgoing.get(&origin).ok_or_else(|| {
                GraphError::InvariantViolation(format!(
                    "Vertex {} hat keine ausgehenden Half-Edges",
                    origin
                ))
            })?;
            current = ring[(rotation_pos[twin] + 1) % ring.len()];

            if current == start {
                break;
            }
            if visited[current] || cycle.len() > half_edges.len() {
                return Err(GraphError::InvariantViolation(format!(
                    "Face-Traversierung ab Half-Edge {} schließt nicht",
                    start
                )));
            }
        }

        faces.push(build_face(plan, &half_edges, cycle));
    }

    Ok(faces)
}

fn missing_endpoint(edge_id: u64, vertex_id: u64) -> GraphError {
    GraphError::InvariantViolation(format!(
        "Wand {} referenziert fehlenden Vertex {}",
        edge_id, vertex_id
    ))
}

/// Baut ein Face aus einem Half-Edge-Zyklus.
///
/// Der Zyklus wird so rotiert, dass er bei der kleinsten (Edge-ID, Richtung)
/// beginnt, damit das Ergebnis unabhängig vom Start-Half-Edge ist.
fn build_face(plan: &FloorPlan, half_edges: &[HalfEdge], mut cycle: Vec<usize>) -> TracedFace {
    if let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, index)| (half_edges[**index].edge_id, **index & 1))
        .map(|(pos, _)| pos)
    {
        cycle.rotate_left(min_pos);
    }

    let mut multiplicity: HashMap<u64, usize> = HashMap::new();
    for &index in &cycle {
        *multiplicity.entry(half_edges[index].edge_id).or_default() += 1;
    }

    let vertex_ids: Vec<u64> = cycle.iter().map(|&index| half_edges[index].origin).collect();
    let points: Vec<Vec2> = vertex_ids
        .iter()
        .filter_map(|id| plan.vertex(*id).map(|v| v.position))
        .collect();

    let mut boundary_edge_ids = Vec::new();
    let mut retraced_edge_ids = Vec::new();
    for &index in &cycle {
        let edge_id = half_edges[index].edge_id;
        if multiplicity.get(&edge_id).copied().unwrap_or(0) > 1 {
            if !retraced_edge_ids.contains(&edge_id) {
                retraced_edge_ids.push(edge_id);
            }
        } else {
            boundary_edge_ids.push(edge_id);
        }
    }

    TracedFace {
        vertex_ids,
        boundary_edge_ids,
        retraced_edge_ids,
        area: signed_polygon_area(&points),
        centroid: polygon_centroid(&points),
    }
}

/// Statistik des letzten Erkennungslaufs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionStats {
    /// Anzahl traversierter Faces insgesamt
    pub traced_faces: usize,
    /// Anzahl gemeldeter Räume
    pub rooms: usize,
    /// Räume, deren ID aus dem vorherigen Lauf übernommen wurde
    pub reused_ids: usize,
    /// Räume mit neu vergebener ID
    pub new_ids: usize,
}

/// Raumerkennung mit session-weit monotoner ID-Vergabe.
///
/// Der Zähler lebt außerhalb des Undo-fähigen Zustands: auch nach Undo wird
/// keine einmal vergebene Raum-ID erneut vergeben.
#[derive(Debug, Clone, Default)]
pub struct FaceDetector {
    last_assigned_id: u64,
    last_stats: DetectionStats,
}

impl FaceDetector {
    /// Erstellt einen Detektor für eine neue Session
    pub fn new() -> Self {
        Self::default()
    }

    /// Detektor, der erst oberhalb von `last_assigned_id` neue IDs vergibt.
    pub fn starting_after(last_assigned_id: u64) -> Self {
        Self {
            last_assigned_id,
            last_stats: DetectionStats::default(),
        }
    }

    /// Höchste bisher vergebene Raum-ID.
    pub fn last_assigned_id(&self) -> u64 {
        self.last_assigned_id
    }

    /// Statistik des letzten Laufs.
    pub fn last_stats(&self) -> DetectionStats {
        self.last_stats
    }

    /// Leitet die aktuelle Raum-Menge ab und gleicht IDs mit den bisherigen Räumen ab.
    ///
    /// Exakt gleiche Signatur → alte ID und Label werden übernommen. Sonst wird
    /// die höchste je vergebene ID + 1 vergeben. Teilräume eines geteilten
    /// Raums erhalten daher immer neue IDs.
    pub fn detect(&mut self, plan: &FloorPlan) -> GraphResult<BTreeMap<u64, Surface>> {
        let faces = trace_faces(plan)?;
        let traced_faces = faces.len();

        let previous: HashMap<Vec<u64>, &Surface> = plan
            .surfaces()
            .values()
            .map(|surface| (surface.signature(), surface))
            .collect();
        if let Some(&max_previous) = plan.surfaces().keys().next_back() {
            self.last_assigned_id = self.last_assigned_id.max(max_previous);
        }

        let mut rooms: Vec<(Vec<u64>, TracedFace)> = faces
            .into_iter()
            .filter(TracedFace::is_room)
            .map(|face| (face.signature(), face))
            .collect();
        rooms.sort_by(|a, b| a.0.cmp(&b.0));

        let mut stats = DetectionStats {
            traced_faces,
            rooms: rooms.len(),
            ..DetectionStats::default()
        };
        let mut surfaces = BTreeMap::new();
        for (signature, face) in rooms {
            let (id, label) = match previous.get(&signature) {
                Some(old) => {
                    stats.reused_ids += 1;
                    (old.id, old.label.clone())
                }
                None => {
                    stats.new_ids += 1;
                    self.last_assigned_id += 1;
                    (self.last_assigned_id, None)
                }
            };
            surfaces.insert(
                id,
                Surface {
                    id,
                    edge_ids: face.boundary_edge_ids,
                    vertex_ids: face.vertex_ids,
                    area: face.area,
                    centroid: face.centroid,
                    label,
                },
            );
        }

        log::debug!(
            "Raumerkennung: {} Faces, {} Räume ({} übernommen, {} neu)",
            stats.traced_faces,
            stats.rooms,
            stats.reused_ids,
            stats.new_ids
        );
        self.last_stats = stats;
        Ok(surfaces)
    }

    /// Erkennt die Räume und schreibt sie in den Grundriss.
    pub fn recompute(&mut self, plan: &mut FloorPlan) -> GraphResult<()> {
        let surfaces = self.detect(plan)?;
        plan.replace_surfaces(surfaces);
        Ok(())
    }
}
