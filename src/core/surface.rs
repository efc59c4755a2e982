//! Abgeleiteter Raum (Surface) aus der Raumerkennung.

use glam::Vec2;

/// Ein geschlossener Raum, begrenzt durch mindestens drei Wände.
///
/// Surfaces werden nie direkt von Commands angelegt: sie sind immer das
/// Ergebnis eines Erkennungslaufs. Nur das Label ist vom Benutzer änderbar.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Session-weit eindeutige ID (wird nie wiederverwendet)
    pub id: u64,
    /// Randwände in Umlaufreihenfolge (beginnend bei der kleinsten ID)
    pub edge_ids: Vec<u64>,
    /// Besuchte Vertices in Umlaufreihenfolge
    pub vertex_ids: Vec<u64>,
    /// Vorzeichenbehaftete Fläche (Räume laufen gegen den Uhrzeigersinn → positiv)
    pub area: f32,
    /// Flächenschwerpunkt (Label-Position)
    pub centroid: Vec2,
    /// Benutzer-Label
    pub label: Option<String>,
}

impl Surface {
    /// Kanonische Signatur: sortierte Menge der Randwand-IDs.
    pub fn signature(&self) -> Vec<u64> {
        signature_of(&self.edge_ids)
    }

    /// Anzeigename: Label oder "Raum <id>".
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("Raum {}", self.id),
        }
    }

    /// Prüft ob die Wand zum Rand gehört.
    pub fn contains_edge(&self, edge_id: u64) -> bool {
        self.edge_ids.contains(&edge_id)
    }
}

/// Sortierte, deduplizierte Edge-IDs als Identitäts-Schlüssel.
pub fn signature_of(edge_ids: &[u64]) -> Vec<u64> {
    let mut signature = edge_ids.to_vec();
    signature.sort_unstable();
    signature.dedup();
    signature
}
