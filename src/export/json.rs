//! Kanonischer JSON-Export des Grundrisses und Rekonstruktion daraus.
//!
//! Format: `{version, timestamp, data: {vertices, edges, surfaces}, metadata}`.
//! Map-Schlüssel sind die Entitäts-IDs.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::app::CommandManager;
use crate::core::{Edge, FaceDetector, FloorPlan, Surface, Vertex};
use crate::shared::DrawingOptions;

/// Aktuelle Version des Export-Formats.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportVertex {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEdge {
    pub start_vertex_id: u64,
    pub end_vertex_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSurface {
    pub edge_ids: Vec<u64>,
    pub area: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Read-Model: Vertices, Wände und Räume nach ID.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExportData {
    pub vertices: BTreeMap<u64, ExportVertex>,
    pub edges: BTreeMap<u64, ExportEdge>,
    #[serde(default)]
    pub surfaces: BTreeMap<u64, ExportSurface>,
}

/// Statistik zum Zeitpunkt des Exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub total_area: f32,
    pub room_count: usize,
    pub wall_count: usize,
}

/// Vollständiges Export-Dokument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub data: ExportData,
    pub metadata: ExportMetadata,
}

/// Projiziert den Grundriss auf das Export-Dokument.
pub fn export_document(plan: &FloorPlan) -> ExportDocument {
    let vertices = plan
        .vertices()
        .values()
        .map(|v| {
            (
                v.id,
                ExportVertex {
                    x: v.position.x,
                    y: v.position.y,
                },
            )
        })
        .collect();

    let edges = plan
        .edges()
        .values()
        .map(|e| {
            (
                e.id,
                ExportEdge {
                    start_vertex_id: e.start_vertex_id,
                    end_vertex_id: e.end_vertex_id,
                },
            )
        })
        .collect();

    let surfaces = plan
        .surfaces()
        .values()
        .map(|s| {
            (
                s.id,
                ExportSurface {
                    edge_ids: s.edge_ids.clone(),
                    area: s.area,
                    label: s.label.clone(),
                },
            )
        })
        .collect();

    ExportDocument {
        version: EXPORT_FORMAT_VERSION.to_string(),
        timestamp: Utc::now(),
        data: ExportData {
            vertices,
            edges,
            surfaces,
        },
        metadata: ExportMetadata {
            total_area: plan.total_area(),
            room_count: plan.room_count(),
            wall_count: plan.wall_count(),
        },
    }
}

/// Serialisiert den Grundriss als formatiertes JSON.
pub fn to_json_string(plan: &FloorPlan) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_document(plan))?)
}

/// Schreibt den Export in eine Datei.
pub fn write_export(plan: &FloorPlan, path: &Path) -> Result<()> {
    let content = to_json_string(plan)?;
    std::fs::write(path, content)
        .with_context(|| format!("Export nach {} fehlgeschlagen", path.display()))?;
    log::info!(
        "Export geschrieben: {} ({} Wände, {} Räume)",
        path.display(),
        plan.wall_count(),
        plan.room_count()
    );
    Ok(())
}

/// Parst ein Export-Dokument.
pub fn parse_export(json: &str) -> Result<ExportDocument> {
    let document: ExportDocument =
        serde_json::from_str(json).context("Export-Datei ist kein gültiges JSON-Dokument")?;
    if document.version != EXPORT_FORMAT_VERSION {
        log::warn!(
            "Unbekannte Export-Version {} (erwartet {}), versuche Import trotzdem",
            document.version,
            EXPORT_FORMAT_VERSION
        );
    }
    Ok(document)
}

/// Baut Grundriss und Raumerkennung aus einem Export-Dokument.
///
/// Die exportierten Räume dienen als Vorgänger-Stand der Erkennung: bei
/// gleicher Signatur bleiben ID und Label erhalten. Der Detektor vergibt
/// neue IDs erst oberhalb der höchsten exportierten Raum-ID.
pub fn plan_from_document(document: &ExportDocument) -> Result<(FloorPlan, FaceDetector)> {
    let mut plan = FloorPlan::new();

    for (&id, v) in &document.data.vertices {
        plan.add_vertex(Vertex::new(id, Vec2::new(v.x, v.y)))
            .with_context(|| format!("Vertex {} nicht importierbar", id))?;
    }
    for (&id, e) in &document.data.edges {
        plan.add_edge(Edge::new(id, e.start_vertex_id, e.end_vertex_id))
            .with_context(|| format!("Wand {} nicht importierbar", id))?;
    }

    let previous: BTreeMap<u64, Surface> = document
        .data
        .surfaces
        .iter()
        .map(|(&id, s)| {
            (
                id,
                Surface {
                    id,
                    edge_ids: s.edge_ids.clone(),
                    vertex_ids: Vec::new(),
                    area: s.area,
                    centroid: Vec2::ZERO,
                    label: s.label.clone(),
                },
            )
        })
        .collect();
    let last_id = previous.keys().next_back().copied().unwrap_or(0);
    plan.replace_surfaces(previous);

    Ok((plan, FaceDetector::starting_after(last_id)))
}

/// Rekonstruiert eine Session aus einem JSON-Export.
pub fn import_session(json: &str, options: &DrawingOptions) -> Result<CommandManager> {
    let document = parse_export(json)?;
    let (plan, detector) = plan_from_document(&document)?;
    let manager = CommandManager::from_plan(plan, detector, options.history_depth)
        .context("Raumerkennung nach Import fehlgeschlagen")?;

    let exported_rooms = document.data.surfaces.len();
    let detected_rooms = manager.plan().room_count();
    if exported_rooms != detected_rooms {
        log::warn!(
            "Import: {} Räume exportiert, {} erkannt",
            exported_rooms,
            detected_rooms
        );
    }
    if manager.plan().wall_count() != document.metadata.wall_count {
        bail!(
            "Import inkonsistent: Metadaten nennen {} Wände, Daten enthalten {}",
            document.metadata.wall_count,
            manager.plan().wall_count()
        );
    }
    Ok(manager)
}

/// Lädt eine Session aus einer Export-Datei.
pub fn load_session(path: &Path, options: &DrawingOptions) -> Result<CommandManager> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Datei {} nicht lesbar", path.display()))?;
    let manager = import_session(&json, options)?;
    log::info!(
        "Geladen: {} ({} Vertices, {} Wände, {} Räume)",
        path.display(),
        manager.plan().vertex_count(),
        manager.plan().wall_count(),
        manager.plan().room_count()
    );
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled_square() -> FloorPlan {
        let mut plan = FloorPlan::new();
        for (id, x, y) in [(1, 0.0, 0.0), (2, 100.0, 0.0), (3, 100.0, 100.0), (4, 0.0, 100.0)] {
            plan.add_vertex(Vertex::at(id, x, y)).expect("Vertex");
        }
        for (id, a, b) in [(1, 1, 2), (2, 2, 3), (3, 3, 4), (4, 4, 1)] {
            plan.add_edge(Edge::new(id, a, b)).expect("Wand");
        }
        FaceDetector::starting_after(6)
            .recompute(&mut plan)
            .expect("Erkennung");
        plan.set_surface_label(7, Some("Bad".to_string()))
            .expect("Label");
        plan
    }

    #[test]
    fn export_uses_camel_case_contract() {
        let json = to_json_string(&labelled_square()).expect("serialisierbar");
        let value: serde_json::Value = serde_json::from_str(&json).expect("gültiges JSON");

        assert_eq!(value["version"], "1.0");
        assert!(value["timestamp"].is_string());
        assert_eq!(value["data"]["edges"]["1"]["startVertexId"], 1);
        assert_eq!(value["data"]["edges"]["1"]["endVertexId"], 2);
        assert_eq!(value["data"]["vertices"]["3"]["x"], 100.0);
        assert_eq!(value["data"]["surfaces"]["7"]["edgeIds"].as_array().map(Vec::len), Some(4));
        assert_eq!(value["data"]["surfaces"]["7"]["label"], "Bad");
        assert_eq!(value["metadata"]["roomCount"], 1);
        assert_eq!(value["metadata"]["wallCount"], 4);
        assert_eq!(value["metadata"]["totalArea"], 10_000.0);
    }

    #[test]
    fn plan_from_document_seeds_surface_ids() {
        let document = export_document(&labelled_square());
        let (plan, detector) = plan_from_document(&document).expect("importierbar");

        assert_eq!(plan.vertex_count(), 4);
        assert_eq!(plan.wall_count(), 4);
        assert_eq!(detector.last_assigned_id(), 7);
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(parse_export("{ kein json").is_err());
    }

    #[test]
    fn dangling_edge_reference_is_rejected() {
        let mut document = export_document(&labelled_square());
        document.data.edges.insert(
            9,
            ExportEdge {
                start_vertex_id: 1,
                end_vertex_id: 42,
            },
        );
        assert!(plan_from_document(&document).is_err());
    }
}
