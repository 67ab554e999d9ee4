//! Tests for the layout engine: exact placement, visibility and bounds.

use rstest::rstest;

use btbuilder::domain::layout::compute;
use btbuilder::domain::{
    Catalog, ExpandedSet, Forest, KindRecord, LayoutMetrics, NodeId, Rect,
};

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .register(vec![
            KindRecord::leaf("A", ""),
            KindRecord::leaf("B", ""),
            KindRecord::leaf("C", ""),
        ])
        .expect("register leaves");
    catalog
}

/// `SequenceNode{A, B}` as a single root.
fn sequence_of_two() -> (Forest, NodeId, NodeId, NodeId) {
    let mut catalog = catalog();
    let mut forest = Forest::new();
    let seq = forest.insert_as_root(catalog.instantiate_named("SequenceNode").unwrap());
    let a = catalog.instantiate_named("A").unwrap();
    let a_id = a.id();
    forest.insert_as_child(a, seq).unwrap();
    let b = catalog.instantiate_named("B").unwrap();
    let b_id = b.id();
    forest.insert_as_child(b, seq).unwrap();
    (forest, seq, a_id, b_id)
}

fn rect(x: f64, y: f64) -> Rect {
    Rect {
        x,
        y,
        width: 250.0,
        height: 60.0,
    }
}

#[test]
fn given_empty_forest_when_computing_then_nothing_placed_and_zero_bounds() {
    let layout = compute(&Forest::new(), &ExpandedSet::new(), &LayoutMetrics::default());

    assert!(layout.nodes.is_empty());
    assert!(layout.connectors.is_empty());
    assert_eq!(layout.total_width, 0.0);
    assert_eq!(layout.total_height, 0.0);
}

#[test]
fn given_expanded_sequence_when_computing_then_parent_centered_over_children() {
    let (forest, seq, a, b) = sequence_of_two();
    let expanded: ExpandedSet = [seq].into_iter().collect();

    let layout = compute(&forest, &expanded, &LayoutMetrics::default());

    assert_eq!(layout.rect(a), Some(rect(0.0, 100.0)));
    assert_eq!(layout.rect(b), Some(rect(270.0, 100.0)));
    assert_eq!(layout.rect(seq), Some(rect(135.0, 0.0)));
    assert_eq!(layout.total_width, 540.0);
    assert_eq!(layout.total_height, 240.0);

    let placed = layout.get(seq).expect("sequence placed");
    assert!(placed.expanded);
    assert!(placed.has_children);
    assert!(!layout.get(a).expect("a placed").has_children);
}

#[test]
fn given_expanded_sequence_when_computing_then_connectors_join_bottom_to_top_centers() {
    let (forest, seq, a, b) = sequence_of_two();
    let expanded: ExpandedSet = [seq].into_iter().collect();

    let layout = compute(&forest, &expanded, &LayoutMetrics::default());

    let ends: Vec<_> = layout
        .connectors
        .iter()
        .map(|c| (c.parent, c.child, c.x1, c.y1, c.x2, c.y2))
        .collect();
    assert_eq!(
        ends,
        vec![
            (seq, a, 260.0, 60.0, 125.0, 100.0),
            (seq, b, 260.0, 60.0, 395.0, 100.0),
        ]
    );
}

#[test]
fn given_collapsed_sequence_when_computing_then_children_hidden() {
    let (forest, seq, a, b) = sequence_of_two();

    let layout = compute(&forest, &ExpandedSet::new(), &LayoutMetrics::default());

    assert_eq!(layout.rect(seq), Some(rect(0.0, 0.0)));
    assert!(!layout.is_visible(a));
    assert!(!layout.is_visible(b));
    assert!(layout.connectors.is_empty());
    assert_eq!(layout.total_width, 270.0);
    assert_eq!(layout.total_height, 140.0);

    let placed = layout.get(seq).expect("sequence placed");
    assert!(!placed.expanded);
    assert!(placed.has_children);
}

#[test]
fn given_collapse_then_expand_when_computing_then_layout_restored() {
    let (forest, seq, _, _) = sequence_of_two();
    let metrics = LayoutMetrics::default();
    let mut expanded: ExpandedSet = [seq].into_iter().collect();
    let before = compute(&forest, &expanded, &metrics);

    expanded.toggle(seq);
    let collapsed = compute(&forest, &expanded, &metrics);
    expanded.toggle(seq);
    let after = compute(&forest, &expanded, &metrics);

    assert_ne!(before, collapsed);
    assert_eq!(before, after);
}

#[test]
fn given_several_roots_when_computing_then_placed_left_to_right_with_spacing() {
    let mut catalog = catalog();
    let mut forest = Forest::new();
    let ids: Vec<NodeId> = ["A", "B", "C"]
        .into_iter()
        .map(|k| forest.insert_as_root(catalog.instantiate_named(k).unwrap()))
        .collect();

    let layout = compute(&forest, &ExpandedSet::new(), &LayoutMetrics::default());

    let xs: Vec<f64> = ids.iter().map(|id| layout.rect(*id).unwrap().x).collect();
    assert_eq!(xs, vec![0.0, 270.0, 540.0]);
    assert_eq!(layout.total_width, 810.0);
    assert_eq!(layout.total_height, 140.0);
}

#[test]
fn given_narrow_children_when_computing_then_parent_width_is_node_width() {
    let mut catalog = catalog();
    let mut forest = Forest::new();
    let inv = forest.insert_as_root(catalog.instantiate_named("InvertNode").unwrap());
    let leaf = catalog.instantiate_named("A").unwrap();
    let leaf_id = leaf.id();
    forest.insert_as_child(leaf, inv).unwrap();
    let expanded: ExpandedSet = [inv].into_iter().collect();

    let layout = compute(&forest, &expanded, &LayoutMetrics::default());

    assert_eq!(layout.rect(inv), Some(rect(0.0, 0.0)));
    assert_eq!(layout.rect(leaf_id), Some(rect(0.0, 100.0)));
    assert_eq!(layout.total_width, 270.0);
}

#[test]
fn given_wide_nested_subtree_when_computing_then_right_siblings_pushed_and_roots_follow() {
    let mut catalog = catalog();
    let mut forest = Forest::new();
    let outer = forest.insert_as_root(catalog.instantiate_named("SequenceNode").unwrap());
    let mut child_of = |forest: &mut Forest, kind: &str, parent: NodeId| {
        let node = catalog.instantiate_named(kind).unwrap();
        let id = node.id();
        forest.insert_as_child(node, parent).unwrap();
        id
    };
    let inner = child_of(&mut forest, "SequenceNode", outer);
    let a = child_of(&mut forest, "A", inner);
    let b = child_of(&mut forest, "B", inner);
    let c = child_of(&mut forest, "C", outer);
    let second = forest.insert_as_root(catalog.instantiate_named("A").unwrap());
    let expanded: ExpandedSet = [outer, inner].into_iter().collect();

    let layout = compute(&forest, &expanded, &LayoutMetrics::default());

    assert_eq!(layout.rect(a), Some(rect(0.0, 200.0)));
    assert_eq!(layout.rect(b), Some(rect(270.0, 200.0)));
    assert_eq!(layout.rect(inner), Some(rect(135.0, 100.0)));
    assert_eq!(layout.rect(c), Some(rect(540.0, 100.0)));
    assert_eq!(layout.rect(outer), Some(rect(270.0, 0.0)));
    assert_eq!(layout.rect(second), Some(rect(810.0, 0.0)));
    assert_eq!(layout.total_width, 1080.0);
    assert_eq!(layout.total_height, 340.0);
}

#[test]
fn given_collapsed_inner_subtree_when_computing_then_siblings_close_up() {
    let mut catalog = catalog();
    let mut forest = Forest::new();
    let outer = forest.insert_as_root(catalog.instantiate_named("SequenceNode").unwrap());
    let inner = catalog.instantiate_named("SequenceNode").unwrap();
    let inner_id = inner.id();
    forest.insert_as_child(inner, outer).unwrap();
    for kind in ["A", "B"] {
        forest
            .insert_as_child(catalog.instantiate_named(kind).unwrap(), inner_id)
            .unwrap();
    }
    let c = catalog.instantiate_named("C").unwrap();
    let c_id = c.id();
    forest.insert_as_child(c, outer).unwrap();
    let expanded: ExpandedSet = [outer].into_iter().collect();

    let layout = compute(&forest, &expanded, &LayoutMetrics::default());

    assert_eq!(layout.rect(inner_id), Some(rect(0.0, 100.0)));
    assert_eq!(layout.rect(c_id), Some(rect(270.0, 100.0)));
    assert_eq!(layout.rect(outer), Some(rect(135.0, 0.0)));
    assert_eq!(layout.nodes.len(), 3);
    assert_eq!(layout.total_height, 240.0);
}

#[rstest]
#[case::defaults(LayoutMetrics::default())]
#[case::compact(LayoutMetrics { node_width: 100.0, node_height: 30.0, level_height: 50.0, horizontal_spacing: 5.0, padding: 10.0 })]
fn given_same_inputs_when_computing_twice_then_identical(#[case] metrics: LayoutMetrics) {
    let (forest, seq, a, _) = sequence_of_two();
    let expanded: ExpandedSet = [seq].into_iter().collect();

    let first = compute(&forest, &expanded, &metrics);
    let second = compute(&forest, &expanded, &metrics);

    assert_eq!(first, second);
    let parent = first.rect(seq).unwrap();
    let child = first.rect(a).unwrap();
    assert_eq!(child.y - parent.y, metrics.level_height);
}
