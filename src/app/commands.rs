//! Edit-Commands: die einzigen Mutationen des Grundrisses.
//!
//! Jeder Command liefert beim Anwenden eine [`Inverse`], die genau die
//! strukturelle Änderung zurücknimmt. Räume und Selektion werden vom
//! `CommandManager` als Vorher/Nachher-Stand gesichert.

use std::fmt;

use glam::Vec2;

use crate::core::{
    Edge, FloorPlan, GraphError, GraphResult, RemovedVertex, SplitResult, Vertex,
};

/// Ziel eines Entfernen-Commands. Räume sind abgeleitet und nicht direkt löschbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoveTarget {
    /// Vertex inklusive aller berührenden Wände
    Vertex(u64),
    /// Einzelne Wand
    Edge(u64),
}

/// Geschlossene Menge aller Edit-Commands.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Vertex mit vorgegebener ID anlegen
    AddVertex { vertex: Vertex },
    /// Wand zwischen zwei bestehenden Vertices anlegen
    AddEdge { edge: Edge },
    /// Vertex (kaskadierend) oder Wand entfernen
    RemoveEntity { target: RemoveTarget },
    /// Wand an `point` teilen
    SplitEdge {
        edge_id: u64,
        point: Vec2,
        new_vertex_id: u64,
        new_edge_ids: [u64; 2],
    },
    /// Grundriss vollständig leeren
    ClearAll,
    /// Label eines Raums setzen oder entfernen
    SetSurfaceLabel {
        surface_id: u64,
        label: Option<String>,
    },
    /// Mehrere Commands als eine Undo-Einheit
    Composite(Vec<EditCommand>),
}

impl EditCommand {
    /// Prüft ob der Command Vertices oder Wände verändert (→ Raumerkennung nötig).
    pub fn is_structural(&self) -> bool {
        match self {
            EditCommand::SetSurfaceLabel { .. } => false,
            EditCommand::Composite(children) => children.iter().any(EditCommand::is_structural),
            _ => true,
        }
    }

    /// Wendet den Command an und liefert die strukturelle Umkehrung.
    ///
    /// Schlägt ein Teil fehl, ist der Grundriss danach unverändert,
    /// einschließlich der Räume.
    pub(crate) fn apply(&self, plan: &mut FloorPlan) -> GraphResult<Inverse> {
        match self {
            EditCommand::AddVertex { vertex } => {
                plan.add_vertex(*vertex)?;
                Ok(Inverse::RemoveVertex(vertex.id))
            }
            EditCommand::AddEdge { edge } => {
                plan.add_edge(*edge)?;
                Ok(Inverse::RemoveEdge(edge.id))
            }
            EditCommand::RemoveEntity {
                target: RemoveTarget::Vertex(vertex_id),
            } => Ok(Inverse::RestoreVertex(plan.remove_vertex(*vertex_id)?)),
            EditCommand::RemoveEntity {
                target: RemoveTarget::Edge(edge_id),
            } => Ok(Inverse::RestoreEdge(plan.remove_edge(*edge_id)?)),
            EditCommand::SplitEdge {
                edge_id,
                point,
                new_vertex_id,
                new_edge_ids,
            } => Ok(Inverse::UnsplitEdge(plan.split_edge(
                *edge_id,
                *point,
                *new_vertex_id,
                *new_edge_ids,
            )?)),
            EditCommand::ClearAll => Ok(Inverse::RestorePlan(Box::new(std::mem::take(plan)))),
            EditCommand::SetSurfaceLabel { surface_id, label } => {
                let previous = plan.set_surface_label(*surface_id, label.clone())?;
                Ok(Inverse::RestoreLabel {
                    surface_id: *surface_id,
                    label: previous,
                })
            }
            EditCommand::Composite(children) => {
                // Teilen und Entfernen verwerfen betroffene Räume, die die
                // strukturelle Umkehrung nicht wiederherstellt
                let surfaces_before = plan.surfaces().clone();
                let mut applied = Vec::with_capacity(children.len());
                for child in children {
                    match child.apply(plan) {
                        Ok(inverse) => applied.push(inverse),
                        Err(e) => {
                            Inverse::Sequence(applied).revert(plan)?;
                            plan.replace_surfaces(surfaces_before);
                            return Err(e);
                        }
                    }
                }
                Ok(Inverse::Sequence(applied))
            }
        }
    }
}

impl fmt::Display for EditCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditCommand::AddVertex { vertex } => write!(
                f,
                "Vertex {} bei ({:.1}, {:.1}) hinzufügen",
                vertex.id, vertex.position.x, vertex.position.y
            ),
            EditCommand::AddEdge { edge } => write!(
                f,
                "Wand {} ({}→{}) hinzufügen",
                edge.id, edge.start_vertex_id, edge.end_vertex_id
            ),
            EditCommand::RemoveEntity {
                target: RemoveTarget::Vertex(id),
            } => write!(f, "Vertex {} entfernen", id),
            EditCommand::RemoveEntity {
                target: RemoveTarget::Edge(id),
            } => write!(f, "Wand {} entfernen", id),
            EditCommand::SplitEdge { edge_id, point, .. } => write!(
                f,
                "Wand {} bei ({:.1}, {:.1}) teilen",
                edge_id, point.x, point.y
            ),
            EditCommand::ClearAll => f.write_str("Grundriss leeren"),
            EditCommand::SetSurfaceLabel { surface_id, label } => match label {
                Some(label) => write!(f, "Raum {} als \"{}\" benennen", surface_id, label),
                None => write!(f, "Label von Raum {} entfernen", surface_id),
            },
            EditCommand::Composite(children) => {
                write!(f, "Gruppe aus {} Schritten", children.len())
            }
        }
    }
}

/// Strukturelle Umkehrung eines angewendeten Commands.
#[derive(Debug, Clone)]
pub(crate) enum Inverse {
    RemoveVertex(u64),
    RestoreVertex(RemovedVertex),
    RemoveEdge(u64),
    RestoreEdge(Edge),
    UnsplitEdge(SplitResult),
    RestorePlan(Box<FloorPlan>),
    RestoreLabel {
        surface_id: u64,
        label: Option<String>,
    },
    /// Umkehrungen in Anwendungsreihenfolge (werden rückwärts angewendet)
    Sequence(Vec<Inverse>),
}

impl Inverse {
    /// Nimmt die Änderung zurück.
    ///
    /// Ein Fehler bedeutet, dass der Grundriss seit dem Anwenden außerhalb
    /// der History verändert wurde.
    pub(crate) fn revert(self, plan: &mut FloorPlan) -> GraphResult<()> {
        match self {
            Inverse::RemoveVertex(vertex_id) => {
                if !plan.incident_edges(vertex_id).is_empty() {
                    return Err(GraphError::InvariantViolation(format!(
                        "Vertex {} wird beim Zurücknehmen noch von Wänden referenziert",
                        vertex_id
                    )));
                }
                plan.remove_vertex(vertex_id)?;
            }
            Inverse::RestoreVertex(removed) => {
                plan.add_vertex(removed.vertex)?;
                for edge in removed.edges {
                    plan.add_edge(edge)?;
                }
            }
            Inverse::RemoveEdge(edge_id) => {
                plan.remove_edge(edge_id)?;
            }
            Inverse::RestoreEdge(edge) => plan.add_edge(edge)?,
            Inverse::UnsplitEdge(split) => {
                for edge in split.edges {
                    plan.remove_edge(edge.id)?;
                }
                plan.remove_vertex(split.vertex.id)?;
                plan.add_edge(split.original)?;
            }
            Inverse::RestorePlan(previous) => *plan = *previous,
            Inverse::RestoreLabel { surface_id, label } => {
                plan.set_surface_label(surface_id, label)?;
            }
            Inverse::Sequence(steps) => {
                for step in steps.into_iter().rev() {
                    step.revert(plan)?;
                }
            }
        }
        Ok(())
    }
}
