//! Tabellarische Berichte (Raum- und Wandliste) als CSV.
//!
//! Reine Projektion des Grundrisses, ohne eigene Logik.

use crate::core::FloorPlan;

/// Maskiert ein CSV-Feld, falls nötig.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Raumliste: `id,name,area,edges`, nach ID sortiert.
pub fn rooms_csv(plan: &FloorPlan) -> String {
    let mut output = String::from("id,name,area,edges\n");
    for surface in plan.surfaces().values() {
        output.push_str(&format!(
            "{},{},{:.2},{}\n",
            surface.id,
            escape_csv(&surface.display_name()),
            surface.area,
            surface.edge_ids.len()
        ));
    }
    output
}

/// Wandliste: `id,start,end,length`, nach ID sortiert.
pub fn walls_csv(plan: &FloorPlan) -> String {
    let mut output = String::from("id,start,end,length\n");
    for edge in plan.sorted_edges() {
        let length = plan.wall_length(edge.id).unwrap_or(0.0);
        output.push_str(&format!(
            "{},{},{},{:.2}\n",
            edge.id, edge.start_vertex_id, edge.end_vertex_id, length
        ));
    }
    output
}
