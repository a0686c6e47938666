//! Session-level tests for mindmap-core

use crate::geometry::Footprint;
use crate::interaction::{Effect, InteractionController, PointerInput, PointerState};
use crate::model::*;
use crate::persistence;
use crate::test_utils::*;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn test_root_only_save_load_roundtrip() {
    let mut diagram = sample_diagram();
    let json = diagram.save_json().unwrap();

    let notice = diagram.load_str(&json).unwrap();
    assert!(notice.is_success(), "{notice:?}");
    assert_eq!(diagram.store().len(), 1);
    assert_eq!(diagram.store().edge_count(), 0);
    assert!(diagram.store().root().is_central);
}

#[test]
fn test_deleting_inner_node_reparents_children_to_root() {
    let mut diagram = sample_diagram();
    assert!(diagram.add_entry("EC2").is_success());
    diagram.select("EC2");
    assert!(diagram.add_entry("S3").is_success());
    assert_eq!(diagram.store().get("S3").unwrap().parent_id.as_deref(), Some("EC2"));

    diagram.select("EC2");
    let notice = diagram.delete_selected(|node| node.id == "EC2").unwrap();
    assert!(notice.is_success());

    let store = diagram.store();
    let ids: Vec<&str> = store.all().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, [ROOT_ID, "S3"]);
    assert_eq!(store.get("S3").unwrap().parent_id.as_deref(), Some(ROOT_ID));
    assert_eq!(store.edge_count(), 1);
    assert!(store.edge(ROOT_ID, "S3").is_some());
    assert_eq!(diagram.selection().current(), Some(ROOT_ID));
}

#[test]
fn test_deleting_root_is_a_warning_noop() {
    let mut diagram = sample_diagram();
    diagram.add_entry("EC2");
    diagram.select(ROOT_ID);

    let mut asked = false;
    let notice = diagram
        .delete_selected(|_| {
            asked = true;
            true
        })
        .unwrap();
    assert_eq!(notice.severity, Severity::Warning);
    assert!(!asked);
    assert_eq!(diagram.store().len(), 2);
}

#[test]
fn test_declined_confirmation_changes_nothing() {
    let mut diagram = sample_diagram();
    diagram.add_entry("EC2");
    diagram.select("EC2");
    assert!(diagram.delete_selected(|_| false).is_none());
    assert!(diagram.clear(|_| false).is_none());
    assert_eq!(diagram.store().len(), 2);
    assert_eq!(diagram.selection().current(), Some("EC2"));
}

#[test]
fn test_load_without_x_is_rejected_and_store_untouched() {
    let mut diagram = sample_diagram();
    diagram.add_entry("EC2");
    let before = diagram.document();

    let doc = json!({ "nodes": [{ "id": ROOT_ID, "name": "Root", "y": 400.0 }] });
    let mut asked = false;
    let err = diagram
        .load(&doc, |_| {
            asked = true;
            true
        })
        .unwrap_err();
    assert!(matches!(err, crate::DiagramError::Validation(_)));
    assert!(!asked);
    assert_eq!(diagram.document(), before);
}

#[test]
fn test_save_load_preserves_ids_positions_and_parents() {
    let mut diagram = sample_diagram();
    diagram.add_category("Compute");
    diagram.select("Lambda");
    diagram.add_custom("Cold starts", "Custom Notes", "");
    diagram.wheel(100.0, 100.0, 1.0);
    let json = diagram.save_json().unwrap();

    let mut restored = sample_diagram();
    restored.load_str(&json).unwrap();
    assert_eq!(restored.document(), diagram.document());
    assert_eq!(restored.viewport().rect(), diagram.viewport().rect());
    assert_eq!(restored.store().edge_count(), diagram.store().edge_count());
    assert!(restored.store().get("Cold starts").unwrap().is_custom);
}

#[test]
fn test_overlapping_nodes_have_no_rendered_edge() {
    let mut diagram = sample_diagram();
    diagram.add_entry("EC2");
    assert!(diagram.store().edge(ROOT_ID, "EC2").is_some());

    let root = diagram.store().root().position;
    let ec2 = diagram.store().get("EC2").unwrap().clone();
    let overlap = Footprint::of(diagram.store().root()).radius() + Footprint::of(&ec2).radius() - 1.0;
    let screen_from = diagram.viewport().to_screen(ec2.position);
    let screen_to = diagram.viewport().to_screen(Point::new(root.x + overlap, root.y));

    diagram.pointer(PointerInput::Down { x: screen_from.x, y: screen_from.y });
    diagram.pointer(PointerInput::Move { x: screen_to.x, y: screen_to.y });
    diagram.pointer(PointerInput::Up);

    let moved = diagram.store().get("EC2").unwrap().position;
    assert!((moved.distance(root) - overlap).abs() < 1e-6);
    assert!(diagram.store().edge(ROOT_ID, "EC2").is_none());
    assert_eq!(diagram.store().edge_count(), 0);
}

#[test]
fn test_pointer_on_empty_space_pans() {
    let mut diagram = sample_diagram();
    let before = diagram.viewport().rect();

    diagram.pointer(PointerInput::Down { x: 10.0, y: 10.0 });
    assert!(matches!(diagram.interaction().state(), PointerState::Panning { .. }));
    let effect = diagram.pointer(PointerInput::Move { x: 30.0, y: 5.0 });
    assert_eq!(effect, Some(Effect::Pan { dx: 20.0, dy: -5.0 }));
    diagram.pointer(PointerInput::Leave);

    let after = diagram.viewport().rect();
    assert_eq!(after.x, before.x - 20.0);
    assert_eq!(after.y, before.y + 5.0);
    assert_eq!(diagram.interaction().state(), &PointerState::Idle);
}

#[test]
fn test_separate_pointer_states_do_not_interfere() {
    let mut diagram = sample_diagram();
    diagram.add_entry("EC2");
    let ec2 = diagram.store().get("EC2").unwrap().position;
    let grab = diagram.viewport().to_screen(ec2);

    let mut dragger = InteractionController::new();
    let mut panner = InteractionController::new();
    diagram.pointer_with(&mut dragger, PointerInput::Down { x: grab.x, y: grab.y });
    diagram.pointer_with(&mut panner, PointerInput::Down { x: 5.0, y: 5.0 });
    assert!(matches!(dragger.state(), PointerState::DraggingNode { node, .. } if node == "EC2"));
    assert!(matches!(panner.state(), PointerState::Panning { .. }));

    let effect = diagram.pointer_with(&mut panner, PointerInput::Move { x: 15.0, y: 5.0 });
    assert_eq!(effect, Some(Effect::Pan { dx: 10.0, dy: 0.0 }));
    let effect = diagram.pointer_with(&mut dragger, PointerInput::Move { x: grab.x, y: grab.y + 40.0 });
    assert!(matches!(effect, Some(Effect::MoveNode { ref id, .. }) if id == "EC2"));
    assert_ne!(diagram.store().get("EC2").unwrap().position, ec2);

    diagram.pointer_with(&mut panner, PointerInput::Up);
    assert!(matches!(dragger.state(), PointerState::DraggingNode { .. }));
    assert_eq!(diagram.interaction().state(), &PointerState::Idle);
}

#[test]
fn test_same_seed_places_nodes_identically() {
    let mut a = sample_diagram();
    let mut b = sample_diagram();
    for diagram in [&mut a, &mut b] {
        diagram.add_entry("EC2");
        diagram.select("EC2");
        diagram.add_category("Storage");
    }
    assert_eq!(a.document(), b.document());
}

#[test]
fn test_adding_existing_and_unknown_entries_warns() {
    let mut diagram = sample_diagram();
    assert!(diagram.add_entry("EC2").is_success());
    assert_eq!(diagram.add_entry("EC2").severity, Severity::Warning);
    assert_eq!(diagram.add_entry("Nope").severity, Severity::Warning);
    assert_eq!(diagram.add_custom("EC2", "Notes", "").severity, Severity::Warning);
    assert_eq!(diagram.add_custom("  ", "Notes", "").severity, Severity::Warning);
    assert_eq!(diagram.add_category("Compute").message, "1 entries from \"Compute\" added");
    assert_eq!(diagram.add_category("Compute").severity, Severity::Warning);
    assert_eq!(diagram.add_category("Quantum").severity, Severity::Error);
    assert_eq!(diagram.store().len(), 3);
}

#[test]
fn test_default_descriptions_are_filled() {
    let mut diagram = sample_diagram();
    diagram.add_entry("RDS");
    diagram.add_custom("Idea", "Custom Notes", "   ");
    let store = diagram.store();
    assert_eq!(store.get("RDS").unwrap().description, crate::diagram::DEFAULT_ENTRY_DESCRIPTION);
    assert_eq!(store.get("Idea").unwrap().description, crate::diagram::DEFAULT_CUSTOM_DESCRIPTION);
}

#[test]
fn test_clear_keeps_root_and_resets_selection() {
    let mut diagram = sample_diagram();
    diagram.add_category("Storage");
    diagram.select("S3");

    let mut count = 0;
    let notice = diagram
        .clear(|n| {
            count = n;
            true
        })
        .unwrap();
    assert!(notice.is_success());
    assert_eq!(count, 2);
    assert_eq!(diagram.store().len(), 1);
    assert_eq!(diagram.store().edge_count(), 0);
    assert_eq!(diagram.selection().current(), Some(ROOT_ID));
    assert_eq!(diagram.clear(|_| true).unwrap().severity, Severity::Warning);
}

#[test]
fn test_load_repairs_dangling_parents() {
    let mut diagram = sample_diagram();
    let doc = json!({
        "nodes": [
            { "id": ROOT_ID, "name": "Root", "x": 800.0, "y": 400.0, "isCentral": true },
            { "id": "EC2", "name": "EC2", "x": 1100.0, "y": 400.0, "parentId": "Gone" },
        ],
        "viewBox": { "x": 10.0, "y": 20.0, "width": 800.0, "height": 400.0 }
    });
    let notice = diagram.load(&doc, |loaded| !loaded.warnings.is_empty()).unwrap().unwrap();
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(diagram.store().get("EC2").unwrap().parent_id.as_deref(), Some(ROOT_ID));
    assert_eq!(diagram.viewport().rect(), Rect::new(10.0, 20.0, 800.0, 400.0));
    assert_no_dangling_parents(diagram.store());
}

#[test]
fn test_wire_shape_of_persisted_document() {
    let mut diagram = sample_diagram();
    diagram.add_custom("Idea", "Custom Notes", "Try it");
    let mut doc = diagram.document();
    doc.nodes[1].x = 980.5;
    doc.nodes[1].y = 412.25;
    let value = serde_json::to_value(&doc.nodes[1]).unwrap();
    insta::assert_json_snapshot!(value, @r#"
    {
      "category": "Custom Notes",
      "description": "Try it",
      "id": "Idea",
      "isCentral": false,
      "isCustom": true,
      "name": "Idea",
      "parentId": "central_root_node",
      "x": 980.5,
      "y": 412.25
    }
    "#);
    assert_eq!(persistence::document_file_name(chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()), "mindmap-state-20240309.json");
}

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Custom(u8),
    Select(usize),
    Delete,
    Clear,
    Drag(usize, f64, f64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..6usize).prop_map(Op::Add),
        2 => any::<u8>().prop_map(Op::Custom),
        3 => (0..12usize).prop_map(Op::Select),
        2 => Just(Op::Delete),
        1 => Just(Op::Clear),
        2 => (0..12usize, -500.0..500.0f64, -500.0..500.0f64).prop_map(|(i, x, y)| Op::Drag(i, x, y)),
    ]
}

proptest! {
    #[test]
    fn prop_no_dangling_parents(ops in prop::collection::vec(op(), 1..40)) {
        let mut diagram = sample_diagram();
        let services: Vec<String> =
            diagram.catalog().entries().iter().map(|e| e.service.clone()).collect();

        for op in ops {
            match op {
                Op::Add(i) => {
                    diagram.add_entry(&services[i % services.len()]);
                }
                Op::Custom(n) => {
                    diagram.add_custom(&format!("note-{n}"), "Custom Notes", "");
                }
                Op::Select(i) => {
                    let ids: Vec<String> = diagram.store().all().map(|n| n.id.clone()).collect();
                    diagram.select(&ids[i % ids.len()]);
                }
                Op::Delete => {
                    diagram.delete_selected(|_| true);
                }
                Op::Clear => {
                    diagram.clear(|_| true);
                }
                Op::Drag(i, dx, dy) => {
                    let nodes: Vec<Point> = diagram.store().all().map(|n| n.position).collect();
                    let from = diagram.viewport().to_screen(nodes[i % nodes.len()]);
                    diagram.pointer(PointerInput::Down { x: from.x, y: from.y });
                    diagram.pointer(PointerInput::Move { x: from.x + dx, y: from.y + dy });
                    diagram.pointer(PointerInput::Up);
                }
            }
            assert_no_dangling_parents(diagram.store());
            for edge in diagram.store().edges() {
                let source = diagram.store().get(edge.source).unwrap();
                let target = diagram.store().get(edge.target).unwrap();
                prop_assert_eq!(target.parent_id.as_deref(), Some(edge.source));
                let reach = Footprint::of(source).radius() + Footprint::of(target).radius();
                prop_assert!(source.position.distance(target.position) >= reach);
            }
        }
    }
}
