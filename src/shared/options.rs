//! Zentrale Konfiguration für den Grundriss-Editor.
//!
//! `DrawingOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};

// ── Snapping ────────────────────────────────────────────────────────

/// Raster-Auflösung in Welteinheiten.
pub const GRID_RESOLUTION: f32 = 10.0;
/// Vertex-Snap-Radius in Screen-Pixeln.
pub const VERTEX_SNAP_RADIUS_PX: f32 = 10.0;
/// Treffer-Radius für Klicks auf eine Wand in Screen-Pixeln.
pub const EDGE_HIT_RADIUS_PX: f32 = 6.0;

// ── History ─────────────────────────────────────────────────────────

/// Maximale Anzahl Undo-Schritte.
pub const HISTORY_DEPTH: usize = 200;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Zeichen-Optionen.
/// Wird als `floorplan_editor.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrawingOptions {
    // ── Snapping ────────────────────────────────────────────────
    /// Raster-Snap aktiv (Vertex-Snap greift immer)
    pub snap_enabled: bool,
    /// Raster-Auflösung in Welteinheiten
    pub grid_resolution: f32,
    /// Vertex-Snap-Radius in Screen-Pixeln
    pub vertex_snap_radius_px: f32,
    /// Treffer-Radius für Wand-Klicks in Screen-Pixeln
    #[serde(default = "default_edge_hit_radius_px")]
    pub edge_hit_radius_px: f32,

    // ── Wand-Werkzeug ───────────────────────────────────────────
    /// Klick auf eine Wand teilt sie, statt einen freien Punkt zu setzen
    #[serde(default = "default_split_edge_on_place")]
    pub split_edge_on_place: bool,

    // ── History ─────────────────────────────────────────────────
    /// Maximale Undo-Tiefe
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            grid_resolution: GRID_RESOLUTION,
            vertex_snap_radius_px: VERTEX_SNAP_RADIUS_PX,
            edge_hit_radius_px: EDGE_HIT_RADIUS_PX,
            split_edge_on_place: true,
            history_depth: HISTORY_DEPTH,
        }
    }
}

/// Serde-Default für `edge_hit_radius_px` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_edge_hit_radius_px() -> f32 {
    EDGE_HIT_RADIUS_PX
}

fn default_split_edge_on_place() -> bool {
    true
}

fn default_history_depth() -> usize {
    HISTORY_DEPTH
}

impl DrawingOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("floorplan-editor"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("floorplan_editor.toml")
    }

    /// Effektive Raster-Auflösung: 0 bei deaktiviertem Raster-Snap.
    ///
    /// `get_snapped_point` lässt den Cursor bei Auflösung ≤ 0 unverändert.
    pub fn effective_resolution(&self) -> f32 {
        if self.snap_enabled {
            self.grid_resolution
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let opts = DrawingOptions::default();
        assert!(opts.snap_enabled);
        assert_eq!(opts.grid_resolution, GRID_RESOLUTION);
        assert_eq!(opts.vertex_snap_radius_px, VERTEX_SNAP_RADIUS_PX);
        assert_eq!(opts.history_depth, HISTORY_DEPTH);
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let opts = DrawingOptions {
            snap_enabled: false,
            grid_resolution: 25.0,
            history_depth: 12,
            ..DrawingOptions::default()
        };
        let text = toml::to_string_pretty(&opts).expect("serialisierbar");
        let parsed: DrawingOptions = toml::from_str(&text).expect("parsebar");
        assert_eq!(parsed, opts);
    }

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let text = "snap_enabled = true\ngrid_resolution = 50.0\nvertex_snap_radius_px = 8.0\n";
        let parsed: DrawingOptions = toml::from_str(text).expect("parsebar");
        assert_eq!(parsed.grid_resolution, 50.0);
        assert_eq!(parsed.edge_hit_radius_px, EDGE_HIT_RADIUS_PX);
        assert!(parsed.split_edge_on_place);
        assert_eq!(parsed.history_depth, HISTORY_DEPTH);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("floorplan_editor_gibt_es_nicht.toml");
        assert_eq!(DrawingOptions::load_from_file(&path), DrawingOptions::default());
    }

    #[test]
    fn disabled_snap_disables_grid() {
        let opts = DrawingOptions {
            snap_enabled: false,
            ..DrawingOptions::default()
        };
        assert_eq!(opts.effective_resolution(), 0.0);
    }
}
