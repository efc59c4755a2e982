//! Undo-fähiger Editor-Zustand: Grundriss plus Selektion.

use indexmap::IndexSet;

use crate::core::{EntityKind, FloorPlan};

/// Verweis auf eine selektierbare Entität.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    /// Eckpunkt
    Vertex(u64),
    /// Wand
    Edge(u64),
    /// Raum
    Surface(u64),
}

impl EntityRef {
    /// Art der Entität
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Vertex(_) => EntityKind::Vertex,
            EntityRef::Edge(_) => EntityKind::Edge,
            EntityRef::Surface(_) => EntityKind::Surface,
        }
    }

    /// ID der Entität
    pub fn id(&self) -> u64 {
        match *self {
            EntityRef::Vertex(id) | EntityRef::Edge(id) | EntityRef::Surface(id) => id,
        }
    }

    /// Prüft ob die Entität im Grundriss existiert.
    pub fn exists_in(&self, plan: &FloorPlan) -> bool {
        match *self {
            EntityRef::Vertex(id) => plan.vertex(id).is_some(),
            EntityRef::Edge(id) => plan.edge(id).is_some(),
            EntityRef::Surface(id) => plan.surface(id).is_some(),
        }
    }
}

/// Auswahlbezogener Zustand (Reihenfolge = Selektionsreihenfolge)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected: IndexSet<EntityRef>,
}

impl SelectionState {
    /// Erstellt einen leeren Selektionszustand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selektierte Entitäten in Selektionsreihenfolge
    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        self.selected.iter()
    }

    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.selected.contains(entity)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Fügt eine Entität hinzu; `false` wenn sie schon selektiert war.
    pub fn insert(&mut self, entity: EntityRef) -> bool {
        self.selected.insert(entity)
    }

    /// Entfernt eine Entität unter Erhalt der Reihenfolge.
    pub fn remove(&mut self, entity: &EntityRef) -> bool {
        self.selected.shift_remove(entity)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Entfernt alle Verweise auf nicht mehr existierende Entitäten.
    pub fn prune(&mut self, plan: &FloorPlan) -> usize {
        let before = self.selected.len();
        self.selected.retain(|entity| entity.exists_in(plan));
        before - self.selected.len()
    }
}

/// Vollständiger Undo-fähiger Zustand: Vertices, Wände, Räume und Selektion.
///
/// Wird ausschließlich vom `CommandManager` besessen und mutiert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    /// Aktueller Grundriss inklusive abgeleiteter Räume
    pub plan: FloorPlan,
    /// Aktuelle Selektion
    pub selection: SelectionState,
}

impl EditorState {
    /// Erstellt einen leeren Zustand.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zustand aus einem bestehenden Grundriss (z.B. nach Import).
    pub fn from_plan(plan: FloorPlan) -> Self {
        Self {
            plan,
            selection: SelectionState::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Edge, Vertex};

    fn plan_with_wall() -> FloorPlan {
        let mut plan = FloorPlan::new();
        plan.add_vertex(Vertex::at(1, 0.0, 0.0)).expect("Vertex 1");
        plan.add_vertex(Vertex::at(2, 10.0, 0.0)).expect("Vertex 2");
        plan.add_edge(Edge::new(1, 1, 2)).expect("Wand 1");
        plan
    }

    #[test]
    fn entity_ref_reports_kind_and_id() {
        assert_eq!(EntityRef::Edge(7).kind(), EntityKind::Edge);
        assert_eq!(EntityRef::Surface(3).id(), 3);
    }

    #[test]
    fn selection_keeps_insertion_order() {
        let mut selection = SelectionState::new();
        selection.insert(EntityRef::Edge(5));
        selection.insert(EntityRef::Vertex(1));
        selection.insert(EntityRef::Vertex(9));
        selection.remove(&EntityRef::Vertex(1));

        let order: Vec<EntityRef> = selection.iter().copied().collect();
        assert_eq!(order, vec![EntityRef::Edge(5), EntityRef::Vertex(9)]);
    }

    #[test]
    fn prune_drops_missing_entities() {
        let plan = plan_with_wall();
        let mut selection = SelectionState::new();
        selection.insert(EntityRef::Vertex(1));
        selection.insert(EntityRef::Vertex(3));
        selection.insert(EntityRef::Edge(1));
        selection.insert(EntityRef::Surface(1));

        assert_eq!(selection.prune(&plan), 2);
        assert!(selection.contains(&EntityRef::Vertex(1)));
        assert!(selection.contains(&EntityRef::Edge(1)));
        assert_eq!(selection.len(), 2);
    }
}
