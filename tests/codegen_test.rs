//! Tests for code generation from a forest.

use rstest::rstest;

use btbuilder::domain::codegen::{generate, generate_node};
use btbuilder::domain::{Catalog, Forest, KindRecord, NodeId};

/// Build a forest from a compact description: `(kind, parent index)` where
/// the parent index refers to an earlier entry, `None` for a root.
fn build(shape: &[(&str, Option<usize>)]) -> Forest {
    let mut catalog = Catalog::new();
    catalog
        .register(vec![
            KindRecord::leaf("A", ""),
            KindRecord::leaf("B", ""),
            KindRecord::leaf("X", ""),
            KindRecord::leaf("Y", ""),
        ])
        .expect("register leaves");

    let mut forest = Forest::new();
    let mut ids: Vec<NodeId> = Vec::new();
    for (kind, parent) in shape {
        let node = catalog.instantiate_named(kind).expect("known kind");
        ids.push(node.id());
        match parent {
            None => {
                forest.insert_as_root(node);
            }
            Some(index) => forest
                .insert_as_child(node, ids[*index])
                .expect("insert child"),
        }
    }
    forest
}

#[rstest]
#[case::empty(&[], "")]
#[case::two_leaf_roots(&[("A", None), ("B", None)], "A\nB")]
#[case::sequence(&[("SequenceNode", None), ("A", Some(0)), ("B", Some(0))], "SequenceNode<A, B>")]
#[case::decorator(&[("InvertNode", None), ("A", Some(0))], "InvertNode<A>")]
#[case::empty_decorator(&[("InvertNode", None)], "InvertNode<void>")]
#[case::empty_control(&[("SelectorNode", None)], "SelectorNode<void>")]
#[case::nested(
    &[("SequenceNode", None), ("X", Some(0)), ("RetryNode", Some(0)), ("Y", Some(2))],
    "SequenceNode<X, RetryNode<Y>>"
)]
#[case::mixed_roots(
    &[("ParallelNode", None), ("RepeatNode", None), ("A", Some(0))],
    "ParallelNode<A>\nRepeatNode<void>"
)]
fn given_forest_when_generating_then_nested_template_syntax(
    #[case] shape: &[(&str, Option<usize>)],
    #[case] expected: &str,
) {
    let forest = build(shape);
    assert_eq!(generate(&forest), expected);
}

#[test]
fn given_subtree_when_generating_node_then_only_that_subtree() {
    let forest = build(&[("SequenceNode", None), ("InvertNode", Some(0)), ("A", Some(1))]);
    let inner = &forest.roots()[0].children()[0];
    assert_eq!(generate_node(inner), "InvertNode<A>");
}

#[test]
fn given_move_when_regenerating_then_code_follows_structure() {
    let mut forest = build(&[("SequenceNode", None), ("A", Some(0)), ("B", Some(0))]);
    let a = forest.roots()[0].children()[0].id();
    let b = forest.roots()[0].children()[1].id();

    forest
        .move_node(b, a, btbuilder::domain::MoveMode::Sibling)
        .expect("reorder");

    assert_eq!(generate(&forest), "SequenceNode<B, A>");
}
