//! Tests for the editor session: drag gestures, expansion and derived views.

use rstest::{fixture, rstest};

use btbuilder::application::{CandidateMove, DropOutcome, Editor};
use btbuilder::domain::{EditError, KindRecord, LayoutMetrics, MoveMode, NodeId};
use btbuilder::util::testing;

#[fixture]
fn editor() -> Editor {
    testing::init_test_setup();
    let mut editor = Editor::new(LayoutMetrics::default());
    editor
        .register_kinds(vec![
            KindRecord::leaf("MoveTo", "drive"),
            KindRecord::leaf("Wait", "idle"),
        ])
        .expect("register leaves");
    editor
}

// ============================================================
// adding and expansion
// ============================================================

#[rstest]
fn given_composite_kind_when_adding_then_starts_expanded(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    let leaf = editor.add_node("MoveTo").unwrap();

    assert!(editor.expanded().contains(seq));
    assert!(!editor.expanded().contains(leaf));
}

#[rstest]
fn given_unknown_kind_when_adding_then_rejected(mut editor: Editor) {
    assert!(editor.add_node("Teleport").is_err());
    assert!(editor.forest().is_empty());
}

#[rstest]
fn given_collapsed_target_when_adding_child_then_target_expanded(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    editor.toggle_expand(seq);
    assert!(!editor.expanded().contains(seq));

    let leaf = editor
        .add_node_at("MoveTo", seq, MoveMode::Child)
        .expect("add child");

    assert!(editor.expanded().contains(seq));
    assert!(editor.layout().is_visible(leaf));
}

#[rstest]
fn given_unknown_id_when_toggling_then_none(mut editor: Editor) {
    assert_eq!(editor.toggle_expand(NodeId::new(77)), None);
}

#[rstest]
fn given_removed_subtree_when_removing_then_expanded_ids_pruned(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    let inv = editor
        .add_node_at("InvertNode", seq, MoveMode::Child)
        .unwrap();
    assert!(editor.expanded().contains(inv));

    let removed = editor.remove_node(seq).expect("remove");

    assert_eq!(removed.subtree_ids(), vec![seq, inv]);
    assert!(editor.expanded().is_empty());
    assert_eq!(editor.code(), "");
}

// ============================================================
// drag and drop
// ============================================================

#[rstest]
fn given_hovered_child_zone_when_dropping_then_moved_and_target_expanded(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    let leaf = editor.add_node("MoveTo").unwrap();
    editor.set_expanded(seq, false);

    assert!(editor.drag_start(leaf));
    assert!(editor.drag_over_zone(seq, MoveMode::Child));
    let outcome = editor.drop(seq, MoveMode::Child);

    assert_eq!(
        outcome,
        DropOutcome::Moved(CandidateMove {
            source: leaf,
            target: seq,
            mode: MoveMode::Child,
        })
    );
    assert_eq!(editor.code(), "SequenceNode<MoveTo>");
    assert!(editor.expanded().contains(seq));
    assert!(!editor.drag().is_active());
}

#[rstest]
fn given_leaf_target_when_hovering_child_zone_then_no_candidate(mut editor: Editor) {
    let a = editor.add_node("MoveTo").unwrap();
    let b = editor.add_node("Wait").unwrap();

    editor.drag_start(a);
    assert!(!editor.drag_over_zone(b, MoveMode::Child));
    assert!(editor.drag_over_zone(b, MoveMode::Sibling));
    assert!(editor.drag().candidate().is_some());
}

#[rstest]
fn given_left_zone_when_dropping_then_ignored(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    let leaf = editor.add_node("MoveTo").unwrap();

    editor.drag_start(leaf);
    editor.drag_over_zone(seq, MoveMode::Child);
    editor.drag_leave_zone();

    assert_eq!(editor.drop(seq, MoveMode::Child), DropOutcome::Ignored);
    assert_eq!(editor.code(), "SequenceNode<void>\nMoveTo");
}

#[rstest]
fn given_no_drag_when_dropping_then_ignored(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    assert_eq!(editor.drop(seq, MoveMode::Child), DropOutcome::Ignored);
}

#[rstest]
fn given_drop_onto_descendant_when_dropping_then_rejected_and_unchanged(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    let sel = editor
        .add_node_at("SelectorNode", seq, MoveMode::Child)
        .unwrap();
    let before = editor.forest().clone();

    editor.drag_start(seq);
    assert!(editor.drag_over_zone(sel, MoveMode::Child));
    let outcome = editor.drop(sel, MoveMode::Child);

    assert!(matches!(
        outcome,
        DropOutcome::Rejected(_, EditError::CycleRejected { .. })
    ));
    assert_eq!(editor.forest(), &before);
    assert!(!editor.drag().is_active());
}

#[rstest]
fn given_cancelled_drag_when_dropping_then_ignored(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    let leaf = editor.add_node("MoveTo").unwrap();

    editor.drag_start(leaf);
    editor.drag_over_zone(seq, MoveMode::Child);
    editor.drag_cancel();

    assert_eq!(editor.drop(seq, MoveMode::Child), DropOutcome::Ignored);
}

#[rstest]
fn given_unknown_source_when_starting_drag_then_not_started(mut editor: Editor) {
    assert!(!editor.drag_start(NodeId::new(5)));
    assert!(!editor.drag().is_active());
}

// ============================================================
// memoized views
// ============================================================

#[rstest]
fn given_edits_when_reading_views_then_cached_equals_fresh(mut editor: Editor) {
    let seq = editor.add_node("SequenceNode").unwrap();
    let leaf = editor.add_node_at("MoveTo", seq, MoveMode::Child).unwrap();
    let _ = editor.layout();
    let _ = editor.code();

    editor.add_node_at("Wait", leaf, MoveMode::Sibling).unwrap();
    assert_eq!(editor.layout().clone(), editor.compute_layout());
    assert_eq!(editor.code(), "SequenceNode<Wait, MoveTo>");

    editor.toggle_expand(seq);
    assert_eq!(editor.layout().clone(), editor.compute_layout());
    assert_eq!(editor.layout().nodes.len(), 1);
}

#[rstest]
fn given_new_metrics_when_reading_layout_then_recomputed(mut editor: Editor) {
    let leaf = editor.add_node("MoveTo").unwrap();
    assert_eq!(editor.layout().rect(leaf).unwrap().width, 250.0);

    editor.set_metrics(LayoutMetrics {
        node_width: 120.0,
        ..LayoutMetrics::default()
    });

    assert_eq!(editor.layout().rect(leaf).unwrap().width, 120.0);
}
