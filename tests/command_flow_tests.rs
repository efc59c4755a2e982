//! Integrationstests für den Command-Flow:
//! - Raumerkennung über dispatchte Commands (Quadrat, Diagonale, getrennte Räume)
//! - Undo/Redo als exakte Umkehrung
//! - Wand-Werkzeug mit Vertex-Snap, Wandteilung und Abbruch
//! - Monotone Raum-IDs über zufällige Command-Folgen

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use floorplan_editor::core::geometry::get_snapped_point;
use floorplan_editor::{
    CommandManager, DrawingOptions, EditCommand, Edge, EntityRef, FloorPlan, GraphError,
    RemoveTarget, Vertex, WallTool,
};
use glam::Vec2;
use proptest::prelude::*;

fn add_vertex(id: u64, x: f32, y: f32) -> EditCommand {
    EditCommand::AddVertex {
        vertex: Vertex::at(id, x, y),
    }
}

fn add_edge(id: u64, a: u64, b: u64) -> EditCommand {
    EditCommand::AddEdge {
        edge: Edge::new(id, a, b),
    }
}

/// Quadrat A(0,0) B(100,0) C(100,100) D(0,100) als ein Command.
fn square_command(first_vertex: u64, first_edge: u64, origin: Vec2) -> EditCommand {
    let v = first_vertex;
    let e = first_edge;
    EditCommand::Composite(vec![
        add_vertex(v, origin.x, origin.y),
        add_vertex(v + 1, origin.x + 100.0, origin.y),
        add_vertex(v + 2, origin.x + 100.0, origin.y + 100.0),
        add_vertex(v + 3, origin.x, origin.y + 100.0),
        add_edge(e, v, v + 1),
        add_edge(e + 1, v + 1, v + 2),
        add_edge(e + 2, v + 2, v + 3),
        add_edge(e + 3, v + 3, v),
    ])
}

fn manager_with_square() -> CommandManager {
    let mut manager = CommandManager::new();
    manager
        .dispatch(square_command(1, 1, Vec2::ZERO))
        .expect("Quadrat gültig");
    manager
}

/// Prüft `undo(execute(c, s)) == s` und `redo(undo(execute(c, s))) == execute(c, s)`.
fn assert_inverse_law(manager: &mut CommandManager, command: EditCommand) {
    let before = manager.state().clone();
    manager.dispatch(command).expect("Command gültig");
    let after = manager.state().clone();

    assert_eq!(manager.undo(), Ok(true));
    assert_eq!(manager.state(), &before);
    assert_eq!(manager.redo(), Ok(true));
    assert_eq!(manager.state(), &after);
}

// ─── Raumerkennung über Commands ─────────────────────────────────────────────

#[test]
fn test_quadrat_ergibt_einen_raum() {
    let manager = manager_with_square();
    let plan = manager.plan();

    assert_eq!(plan.room_count(), 1);
    let room = plan.surface(1).expect("Raum 1");
    assert_eq!(room.edge_ids.len(), 4);
    assert_relative_eq!(room.area, 10_000.0, epsilon = 1e-2);
}

#[test]
fn test_diagonale_teilt_in_zwei_dreiecke() {
    let mut manager = manager_with_square();
    manager.dispatch(add_edge(5, 1, 3)).expect("Diagonale gültig");
    let plan = manager.plan();

    assert_eq!(plan.room_count(), 2);
    for room in plan.surfaces().values() {
        assert_relative_eq!(room.area, 5_000.0, epsilon = 1e-2);
        assert!(room.contains_edge(5));
    }
    // Teilräume bekommen neue IDs
    assert_eq!(plan.surfaces().keys().copied().collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn test_getrennte_quadrate_sind_unabhaengig() {
    let mut manager = CommandManager::new();
    manager
        .dispatch(square_command(1, 1, Vec2::ZERO))
        .expect("erstes Quadrat");
    manager
        .dispatch(square_command(5, 5, Vec2::new(300.0, 0.0)))
        .expect("zweites Quadrat");

    let plan = manager.plan();
    assert_eq!(plan.room_count(), 2);
    let first = plan.surface(1).expect("Raum 1");
    let second = plan.surface(2).expect("Raum 2");
    assert_eq!(first.signature(), vec![1, 2, 3, 4]);
    assert_eq!(second.signature(), vec![5, 6, 7, 8]);
    assert!(first.vertex_ids.iter().all(|id| !second.vertex_ids.contains(id)));
}

#[test]
fn test_snap_szenario() {
    let cursor = Vec2::new(37.0, 142.0);
    assert_eq!(
        get_snapped_point(cursor, 100.0, std::iter::empty::<Vec2>(), 1.0, 10.0),
        Vec2::new(0.0, 100.0)
    );
    assert_eq!(
        get_snapped_point(cursor, 100.0, [Vec2::new(40.0, 140.0)], 1.0, 10.0),
        Vec2::new(40.0, 140.0)
    );
}

// ─── Undo/Redo ───────────────────────────────────────────────────────────────

#[test]
fn test_inverse_gilt_fuer_alle_command_arten() {
    let mut manager = manager_with_square();
    manager
        .dispatch(EditCommand::SetSurfaceLabel {
            surface_id: 1,
            label: Some("Wohnen".to_string()),
        })
        .expect("Label gültig");
    manager.select(EntityRef::Vertex(2)).expect("selektierbar");
    manager.select(EntityRef::Surface(1)).expect("selektierbar");

    assert_inverse_law(&mut manager, add_vertex(10, 500.0, 500.0));
    assert_inverse_law(
        &mut manager,
        EditCommand::SetSurfaceLabel {
            surface_id: 1,
            label: None,
        },
    );
    assert_inverse_law(
        &mut manager,
        EditCommand::SplitEdge {
            edge_id: 1,
            point: Vec2::new(50.0, 0.0),
            new_vertex_id: 20,
            new_edge_ids: [20, 21],
        },
    );
    assert_inverse_law(&mut manager, add_edge(10, 1, 3));
    assert_inverse_law(
        &mut manager,
        EditCommand::RemoveEntity {
            target: RemoveTarget::Edge(3),
        },
    );
    assert_inverse_law(
        &mut manager,
        EditCommand::RemoveEntity {
            target: RemoveTarget::Vertex(2),
        },
    );
    assert_inverse_law(&mut manager, EditCommand::ClearAll);
}

#[test]
fn test_entfernen_und_undo_stellt_raum_mit_label_wieder_her() {
    let mut manager = manager_with_square();
    manager
        .dispatch(EditCommand::SetSurfaceLabel {
            surface_id: 1,
            label: Some("Küche".to_string()),
        })
        .expect("Label gültig");

    manager
        .dispatch(EditCommand::RemoveEntity {
            target: RemoveTarget::Vertex(3),
        })
        .expect("entfernbar");
    assert_eq!(manager.plan().room_count(), 0);
    assert_eq!(manager.plan().wall_count(), 2);

    manager.undo().expect("Undo");
    let room = manager.plan().surface(1).expect("Raum 1 zurück");
    assert_eq!(room.label.as_deref(), Some("Küche"));
    assert_eq!(manager.plan().wall_count(), 4);
}

#[test]
fn test_teilen_erhaelt_raum_in_neuer_form() {
    let mut manager = manager_with_square();
    manager
        .dispatch(EditCommand::SplitEdge {
            edge_id: 1,
            point: Vec2::new(50.0, 0.0),
            new_vertex_id: 5,
            new_edge_ids: [5, 6],
        })
        .expect("Teilung gültig");

    let plan = manager.plan();
    assert!(plan.edge(1).is_none());
    assert_eq!(plan.room_count(), 1);
    let room = plan.surfaces().values().next().expect("ein Raum");
    assert_eq!(room.signature(), vec![2, 3, 4, 5, 6]);
    assert_relative_eq!(room.area, 10_000.0, epsilon = 1e-2);
    // Geänderte Signatur → neue ID
    assert_eq!(room.id, 2);

    manager.undo().expect("Undo");
    assert_eq!(manager.plan().edge(1), Some(&Edge::new(1, 1, 2)));
    assert!(manager.plan().vertex(5).is_none());
    assert!(manager.plan().surface(1).is_some());
}

#[test]
fn test_abgelehnter_composite_aendert_nichts() {
    let mut manager = manager_with_square();
    let before = manager.state().clone();

    let result = manager.dispatch(EditCommand::Composite(vec![
        add_vertex(5, 50.0, 50.0),
        add_edge(5, 1, 5),
        add_edge(6, 5, 77),
    ]));

    assert!(matches!(
        result,
        Err(GraphError::InvalidReference { id: 77, .. })
    ));
    assert_eq!(manager.state(), &before);
    assert_eq!(manager.history_len(), 1);
}

#[test]
fn test_undo_redo_auf_leerer_history_ist_noop() {
    let mut manager = CommandManager::new();
    assert_eq!(manager.undo(), Ok(false));
    assert_eq!(manager.redo(), Ok(false));
    assert!(manager.plan().is_empty());
}

#[test]
fn test_neuer_command_verwirft_redo_zweig() {
    let mut manager = manager_with_square();
    manager.dispatch(add_edge(5, 1, 3)).expect("Diagonale");
    manager.undo().expect("Undo");
    assert!(manager.can_redo());

    manager.dispatch(add_edge(5, 2, 4)).expect("andere Diagonale");
    assert!(!manager.can_redo());
    assert_eq!(manager.redo(), Ok(false));
    assert_eq!(manager.plan().edge(5), Some(&Edge::new(5, 2, 4)));
}

// ─── Wand-Werkzeug ───────────────────────────────────────────────────────────

fn click(manager: &mut CommandManager, tool: &mut WallTool, x: f32, y: f32) {
    let options = DrawingOptions::default();
    if let Some(command) = tool.click(manager.plan(), Vec2::new(x, y), 1.0, &options) {
        manager.dispatch(command).expect("Wand gültig");
    }
}

#[test]
fn test_wand_werkzeug_zeichnet_quadrat() {
    let mut manager = CommandManager::new();
    let mut tool = WallTool::new();

    for (start, end) in [
        ((0.0, 0.0), (100.0, 0.0)),
        ((100.0, 0.0), (100.0, 100.0)),
        ((100.0, 100.0), (0.0, 100.0)),
        ((0.0, 100.0), (0.0, 0.0)),
    ] {
        click(&mut manager, &mut tool, start.0, start.1);
        click(&mut manager, &mut tool, end.0, end.1);
    }

    let plan = manager.plan();
    assert_eq!(plan.vertex_count(), 4);
    assert_eq!(plan.wall_count(), 4);
    assert_eq!(plan.room_count(), 1);
    assert_relative_eq!(plan.total_area(), 10_000.0, epsilon = 1e-2);
    assert_eq!(manager.history_len(), 4);
}

#[test]
fn test_wand_werkzeug_teilt_waende() {
    let mut manager = manager_with_square();
    let mut tool = WallTool::new();

    click(&mut manager, &mut tool, 50.0, 1.0);
    click(&mut manager, &mut tool, 50.0, 99.0);

    let plan = manager.plan();
    assert_eq!(plan.vertex_count(), 6);
    assert_eq!(plan.wall_count(), 7);
    assert_eq!(plan.room_count(), 2);
    for room in plan.surfaces().values() {
        assert_relative_eq!(room.area, 5_000.0, epsilon = 1e-2);
    }

    // Eine Undo-Einheit
    manager.undo().expect("Undo");
    assert_eq!(manager.plan().wall_count(), 4);
    assert_eq!(manager.plan().room_count(), 1);
}

#[test]
fn test_abbruch_laesst_zustand_unberuehrt() {
    let mut manager = manager_with_square();
    let mut tool = WallTool::new();
    let before = manager.state().clone();

    click(&mut manager, &mut tool, 300.0, 300.0);
    assert!(tool.is_drawing());
    assert!(tool.cancel());

    assert_eq!(manager.state(), &before);
    assert_eq!(manager.history_len(), 1);
    assert!(tool.pending().is_none());
}

// ─── Zufällige Command-Folgen ────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    AddVertex(u8, u8),
    AddEdge(u8, u8),
    RemoveVertex(u8),
    RemoveEdge(u8),
    Split(u8),
    /// Wand teilen und vom neuen Vertex aus verbinden (eine Undo-Einheit)
    SplitAndConnect(u8, u8),
    /// Zwei Klicks mit dem Wand-Werkzeug
    Wall((u8, u8), (u8, u8)),
    Label(u8),
    Clear,
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..5, 0u8..5).prop_map(|(x, y)| Op::AddVertex(x, y)),
        6 => (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::AddEdge(a, b)),
        1 => any::<u8>().prop_map(Op::RemoveVertex),
        1 => any::<u8>().prop_map(Op::RemoveEdge),
        1 => any::<u8>().prop_map(Op::Split),
        2 => (any::<u8>(), any::<u8>()).prop_map(|(e, v)| Op::SplitAndConnect(e, v)),
        3 => ((0u8..9, 0u8..9), (0u8..9, 0u8..9)).prop_map(|(a, b)| Op::Wall(a, b)),
        1 => any::<u8>().prop_map(Op::Label),
        1 => Just(Op::Clear),
        2 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

fn pick(mut ids: Vec<u64>, index: u8) -> Option<u64> {
    if ids.is_empty() {
        return None;
    }
    ids.sort_unstable();
    Some(ids[index as usize % ids.len()])
}

fn to_command(op: &Op, plan: &FloorPlan) -> Option<EditCommand> {
    let vertex_ids = || plan.vertices().keys().copied().collect::<Vec<_>>();
    let edge_ids = || plan.edges().keys().copied().collect::<Vec<_>>();

    match *op {
        Op::AddVertex(x, y) => Some(add_vertex(
            plan.next_vertex_id(),
            f32::from(x) * 50.0,
            f32::from(y) * 50.0,
        )),
        Op::AddEdge(a, b) => Some(add_edge(
            plan.next_edge_id(),
            pick(vertex_ids(), a)?,
            pick(vertex_ids(), b)?,
        )),
        Op::RemoveVertex(index) => Some(EditCommand::RemoveEntity {
            target: RemoveTarget::Vertex(pick(vertex_ids(), index)?),
        }),
        Op::RemoveEdge(index) => Some(EditCommand::RemoveEntity {
            target: RemoveTarget::Edge(pick(edge_ids(), index)?),
        }),
        Op::Split(index) => {
            let edge_id = pick(edge_ids(), index)?;
            let (a, b) = plan.edge_endpoints(edge_id)?;
            let next_edge = plan.next_edge_id();
            Some(EditCommand::SplitEdge {
                edge_id,
                point: (a + b) * 0.5,
                new_vertex_id: plan.next_vertex_id(),
                new_edge_ids: [next_edge, next_edge + 1],
            })
        }
        Op::SplitAndConnect(edge_index, vertex_index) => {
            let edge_id = pick(edge_ids(), edge_index)?;
            let target = pick(vertex_ids(), vertex_index)?;
            let (a, b) = plan.edge_endpoints(edge_id)?;
            let new_vertex_id = plan.next_vertex_id();
            let next_edge = plan.next_edge_id();
            Some(EditCommand::Composite(vec![
                EditCommand::SplitEdge {
                    edge_id,
                    point: (a + b) * 0.5,
                    new_vertex_id,
                    new_edge_ids: [next_edge, next_edge + 1],
                },
                add_edge(next_edge + 2, new_vertex_id, target),
            ]))
        }
        Op::Wall((x0, y0), (x1, y1)) => {
            // Raster 25: trifft Vertices auf dem 50er-Raster und Wandmitten
            let options = DrawingOptions::default();
            let mut tool = WallTool::new();
            let first = Vec2::new(f32::from(x0), f32::from(y0)) * 25.0;
            let second = Vec2::new(f32::from(x1), f32::from(y1)) * 25.0;
            tool.click(plan, first, 1.0, &options);
            tool.click(plan, second, 1.0, &options)
        }
        Op::Label(index) => Some(EditCommand::SetSurfaceLabel {
            surface_id: pick(plan.surfaces().keys().copied().collect(), index)?,
            label: Some(format!("Raum-{}", index)),
        }),
        Op::Clear => Some(EditCommand::ClearAll),
        Op::Undo | Op::Redo => None,
    }
}

/// Jede Raum-ID gehört immer zur selben Signatur; neue IDs liegen über allen bisherigen.
fn check_surface_ids(
    plan: &FloorPlan,
    seen: &mut BTreeMap<u64, Vec<u64>>,
) -> Result<(), TestCaseError> {
    let max_seen = seen.keys().next_back().copied().unwrap_or(0);
    let mut fresh = Vec::new();
    for surface in plan.surfaces().values() {
        match seen.get(&surface.id) {
            Some(signature) => {
                prop_assert_eq!(signature, &surface.signature());
            }
            None => {
                prop_assert!(surface.id > max_seen);
                fresh.push((surface.id, surface.signature()));
            }
        }
    }
    seen.extend(fresh);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_undo_redo_sind_exakte_umkehrungen(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut manager = CommandManager::new();
        let mut seen = BTreeMap::new();

        for op in &ops {
            match op {
                Op::Undo => {
                    prop_assert!(manager.undo().is_ok());
                }
                Op::Redo => {
                    prop_assert!(manager.redo().is_ok());
                }
                _ => {
                    let Some(command) = to_command(op, manager.plan()) else {
                        continue;
                    };
                    let before = manager.state().clone();
                    let history_before = manager.history_len();

                    if manager.dispatch(command).is_ok() {
                        let after = manager.state().clone();
                        prop_assert_eq!(manager.undo(), Ok(true));
                        prop_assert_eq!(manager.state(), &before);
                        prop_assert_eq!(manager.redo(), Ok(true));
                        prop_assert_eq!(manager.state(), &after);
                    } else {
                        prop_assert_eq!(manager.state(), &before);
                        prop_assert_eq!(manager.history_len(), history_before);
                    }
                }
            }
            check_surface_ids(manager.plan(), &mut seen)?;
        }
    }

    #[test]
    fn prop_erkennung_ist_idempotent(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let mut manager = CommandManager::new();
        for op in &ops {
            if let Some(command) = to_command(op, manager.plan()) {
                let _ = manager.dispatch(command);
            }
        }

        let mut plan = manager.plan().clone();
        let mut detector = manager.detector().clone();
        detector.recompute(&mut plan).expect("Erkennung ok");
        prop_assert_eq!(plan.surfaces(), manager.plan().surfaces());
    }
}
