//! Rein-mathematische Geometrie-Hilfsfunktionen ohne Zustand.
//!
//! Schwellwerte werden in Screen-Pixeln angegeben und über den aktuellen
//! Zoom (`scale` = Pixel pro Welteinheit) in Welteinheiten umgerechnet.

use glam::Vec2;

/// Euklidische Distanz zwischen zwei Punkten.
pub fn distance(p: Vec2, q: Vec2) -> f32 {
    p.distance(q)
}

/// Rechnet einen Screen-Pixel-Schwellwert in Welteinheiten um.
///
/// Ein nicht-positiver Zoom wird wie Zoom 1.0 behandelt.
pub fn screen_to_world_threshold(threshold_px: f32, scale: f32) -> f32 {
    if scale > 0.0 {
        threshold_px / scale
    } else {
        threshold_px
    }
}

/// Prüft ob `q` innerhalb des Pixel-Radius um `p` liegt (inklusive Rand).
pub fn is_near_point(p: Vec2, q: Vec2, threshold_px: f32, scale: f32) -> bool {
    distance(p, q) <= screen_to_world_threshold(threshold_px, scale)
}

/// Projektionsparameter von `p` auf die Gerade durch `a`→`b`, auf [0, 1] geklemmt.
fn segment_parameter(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return 0.0;
    }
    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

/// Nächster Punkt auf der Strecke `a`–`b` zu `p`.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    a + (b - a) * segment_parameter(p, a, b)
}

/// Abstand von `p` zur Strecke `a`–`b`.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    distance(p, closest_point_on_segment(p, a, b))
}

/// Prüft ob `p` auf dem Inneren der Strecke `a`–`b` liegt.
///
/// Treffer auf oder hinter den Endpunkten zählen nicht: dort greift der
/// Vertex-Snap. Degenerierte Strecken liefern immer `false`.
pub fn is_point_on_segment(p: Vec2, a: Vec2, b: Vec2, threshold_px: f32, scale: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return false;
    }

    let t = (p - a).dot(ab) / len_sq;
    if t <= 0.0 || t >= 1.0 {
        return false;
    }

    let threshold = screen_to_world_threshold(threshold_px, scale);
    if distance(p, a) <= threshold || distance(p, b) <= threshold {
        return false;
    }

    distance(p, a + ab * t) <= threshold
}

/// Rastet einen Wert auf das nächste Vielfache von `resolution` ein.
fn snap_to_grid(value: f32, resolution: f32) -> f32 {
    (value / resolution).round() * resolution
}

/// Zweistufige Snap-Auflösung für einen Cursor-Punkt.
///
/// 1. Liegt ein existierender Vertex innerhalb von `snap_radius_px` (skaliert
///    mit `scale`), gewinnt dessen exakte Position (der nächste bei mehreren).
/// 2. Sonst wird jede Koordinate einzeln auf das nächste Vielfache von
///    `resolution` gerundet. `resolution <= 0` deaktiviert das Raster.
pub fn get_snapped_point<I>(
    cursor: Vec2,
    resolution: f32,
    vertices: I,
    scale: f32,
    snap_radius_px: f32,
) -> Vec2
where
    I: IntoIterator<Item = Vec2>,
{
    let radius = screen_to_world_threshold(snap_radius_px, scale);
    let nearest = vertices
        .into_iter()
        .map(|pos| (pos, distance(cursor, pos)))
        .filter(|(_, dist)| *dist <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((pos, _)) = nearest {
        return pos;
    }

    if resolution > 0.0 {
        Vec2::new(
            snap_to_grid(cursor.x, resolution),
            snap_to_grid(cursor.y, resolution),
        )
    } else {
        cursor
    }
}

/// Vorzeichenbehaftete Polygonfläche nach der Gaußschen Trapezformel (Shoelace).
///
/// Gegen den Uhrzeigersinn (mathematisch positiv) ergibt eine positive Fläche.
pub fn signed_polygon_area(points: &[Vec2]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        sum += p.x * q.y - q.x * p.y;
    }
    0.5 * sum
}

/// Flächenschwerpunkt eines einfachen Polygons.
///
/// Bei (nahezu) verschwindender Fläche wird der Mittelwert der Eckpunkte geliefert.
pub fn polygon_centroid(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }

    let area = signed_polygon_area(points);
    if area.abs() <= f32::EPSILON {
        let sum: Vec2 = points.iter().copied().sum();
        return sum / points.len() as f32;
    }

    let mut c = Vec2::ZERO;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let cross = p.x * q.y - q.x * p.y;
        c += (*p + q) * cross;
    }
    c / (6.0 * area)
}
