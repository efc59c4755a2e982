//! Grundriss-Editor (Kommandozeile).
//!
//! Lädt einen JSON-Export, erkennt die Räume neu und gibt Raum- und
//! Wandliste als CSV aus.

use std::path::PathBuf;

use anyhow::Context;
use floorplan_editor::{load_session, rooms_csv, walls_csv, DrawingOptions};

fn main() -> anyhow::Result<()> {
    // Logger initialisieren (RUST_LOG überschreibt den Standard)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("Grundriss-Editor v{} startet...", env!("CARGO_PKG_VERSION"));

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("Aufruf: floorplan-editor <export.json>")?;

    let options = DrawingOptions::load_from_file(&DrawingOptions::config_path());
    let manager = load_session(&path, &options)?;
    let plan = manager.plan();

    log::info!(
        "Statistik: {} Vertices, {} Wände, {} Räume, Gesamtfläche {:.2}",
        plan.vertex_count(),
        plan.wall_count(),
        plan.room_count(),
        plan.total_area()
    );
    let stats = manager.detector().last_stats();
    log::info!(
        "Raumerkennung: {} Faces, {} IDs übernommen, {} neu vergeben",
        stats.traced_faces,
        stats.reused_ids,
        stats.new_ids
    );

    println!("{}", rooms_csv(plan));
    print!("{}", walls_csv(plan));
    Ok(())
}
