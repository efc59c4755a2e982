//! Wand-Werkzeug: zwei Klicks ergeben eine Wand.
//!
//! Der erste Klick merkt sich nur einen Anker. Dieser Zustand liegt
//! außerhalb der History; `cancel()` verwirft ihn ohne Auswirkung auf den
//! Grundriss. Erst der zweite Klick erzeugt einen Command.

use glam::Vec2;

use super::commands::EditCommand;
use crate::core::geometry::closest_point_on_segment;
use crate::core::{Edge, FloorPlan, Vertex};
use crate::shared::DrawingOptions;

/// Aufgelöster Klickpunkt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Bestehender Vertex (Vertex-Snap)
    Vertex(u64),
    /// Punkt im Inneren einer Wand, die dafür geteilt wird
    Split { edge_id: u64, point: Vec2 },
    /// Freier, ggf. auf das Raster gerundeter Punkt
    Free(Vec2),
}

/// Löst einen Cursor in einen Anker auf.
///
/// Reihenfolge: Vertex-Snap, dann Wand-Treffer (falls Teilen aktiv), dann Raster.
pub fn resolve_anchor(
    plan: &FloorPlan,
    cursor: Vec2,
    scale: f32,
    options: &DrawingOptions,
) -> Anchor {
    if let Some(hit) = plan.vertex_at(cursor, options.vertex_snap_radius_px, scale) {
        return Anchor::Vertex(hit.vertex_id);
    }

    if options.split_edge_on_place {
        let split = plan
            .edge_at(cursor, options.edge_hit_radius_px, scale)
            .and_then(|edge_id| {
                let (a, b) = plan.edge_endpoints(edge_id)?;
                Some(Anchor::Split {
                    edge_id,
                    point: closest_point_on_segment(cursor, a, b),
                })
            });
        if let Some(anchor) = split {
            return anchor;
        }
    }

    let point = plan.snap_point(
        cursor,
        options.effective_resolution(),
        scale,
        options.vertex_snap_radius_px,
    );
    // Rasterpunkt kann exakt auf einem Vertex außerhalb des Snap-Radius landen
    match plan.vertex_on(point) {
        Some(vertex_id) => Anchor::Vertex(vertex_id),
        None => Anchor::Free(point),
    }
}

/// Fortlaufende ID-Vergabe für die Teil-Commands eines Klicks.
struct IdAllocator {
    next_vertex_id: u64,
    next_edge_id: u64,
}

impl IdAllocator {
    fn for_plan(plan: &FloorPlan) -> Self {
        Self {
            next_vertex_id: plan.next_vertex_id(),
            next_edge_id: plan.next_edge_id(),
        }
    }

    fn vertex(&mut self) -> u64 {
        let id = self.next_vertex_id;
        self.next_vertex_id += 1;
        id
    }

    fn edge(&mut self) -> u64 {
        let id = self.next_edge_id;
        self.next_edge_id += 1;
        id
    }
}

/// Transienter Zustand des Wand-Werkzeugs.
#[derive(Debug, Clone, Default)]
pub struct WallTool {
    pending: Option<Anchor>,
}

impl WallTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anker des ersten Klicks, solange die Wand nicht abgeschlossen ist.
    pub fn pending(&self) -> Option<&Anchor> {
        self.pending.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.pending.is_some()
    }

    /// Verwirft den begonnenen Wandzug. `true` wenn etwas verworfen wurde.
    pub fn cancel(&mut self) -> bool {
        let had_pending = self.pending.take().is_some();
        if had_pending {
            log::debug!("Wand-Werkzeug: Startpunkt verworfen");
        }
        had_pending
    }

    /// Verarbeitet einen Klick an `cursor` (Weltkoordinaten).
    ///
    /// Erster Klick: Anker merken, kein Command. Zweiter Klick: Command für
    /// die neue Wand inklusive neuer Vertices bzw. Wandteilungen. Ein zweiter
    /// Klick ohne Länge wird ignoriert und der erste Anker bleibt bestehen.
    pub fn click(
        &mut self,
        plan: &FloorPlan,
        cursor: Vec2,
        scale: f32,
        options: &DrawingOptions,
    ) -> Option<EditCommand> {
        let anchor = resolve_anchor(plan, cursor, scale, options);

        let Some(start) = self.pending.take() else {
            log::info!("Wand-Werkzeug: Startpunkt {:?}", anchor);
            self.pending = Some(anchor);
            return None;
        };

        if is_degenerate(plan, &start, &anchor) {
            log::debug!("Wand-Werkzeug: Endpunkt ergibt keine neue Wand, ignoriert");
            self.pending = Some(start);
            return None;
        }

        Some(build_wall_command(plan, start, anchor))
    }
}

/// Prüft ob zwei Anker keine eigenständige Wand ergeben.
///
/// Eine Wand vom Teilungspunkt zu einem Endpunkt derselben Wand wäre eine
/// Kopie der entstehenden Hälfte.
fn is_degenerate(plan: &FloorPlan, start: &Anchor, end: &Anchor) -> bool {
    match (start, end) {
        (Anchor::Vertex(a), Anchor::Vertex(b)) => a == b,
        (Anchor::Free(a), Anchor::Free(b)) => a == b,
        // Wand entlang derselben Wand
        (Anchor::Split { edge_id: a, .. }, Anchor::Split { edge_id: b, .. }) => a == b,
        (Anchor::Split { edge_id, .. }, Anchor::Vertex(vertex_id))
        | (Anchor::Vertex(vertex_id), Anchor::Split { edge_id, .. }) => plan
            .edge(*edge_id)
            .is_some_and(|edge| edge.touches(*vertex_id)),
        _ => false,
    }
}

/// Baut den Command für eine Wand zwischen zwei Ankern.
fn build_wall_command(plan: &FloorPlan, start: Anchor, end: Anchor) -> EditCommand {
    let mut ids = IdAllocator::for_plan(plan);
    let mut steps = Vec::new();

    let start_id = materialize(start, &mut ids, &mut steps);
    let end_id = materialize(end, &mut ids, &mut steps);
    steps.push(EditCommand::AddEdge {
        edge: Edge::new(ids.edge(), start_id, end_id),
    });

    if steps.len() == 1 {
        steps.remove(0)
    } else {
        EditCommand::Composite(steps)
    }
}

/// Ergänzt die Schritte, die den Anker zu einem Vertex machen, und liefert dessen ID.
fn materialize(anchor: Anchor, ids: &mut IdAllocator, steps: &mut Vec<EditCommand>) -> u64 {
    match anchor {
        Anchor::Vertex(vertex_id) => vertex_id,
        Anchor::Free(position) => {
            let vertex_id = ids.vertex();
            steps.push(EditCommand::AddVertex {
                vertex: Vertex::new(vertex_id, position),
            });
            vertex_id
        }
        Anchor::Split { edge_id, point } => {
            let new_vertex_id = ids.vertex();
            let new_edge_ids = [ids.edge(), ids.edge()];
            steps.push(EditCommand::SplitEdge {
                edge_id,
                point,
                new_vertex_id,
                new_edge_ids,
            });
            new_vertex_id
        }
    }
}
