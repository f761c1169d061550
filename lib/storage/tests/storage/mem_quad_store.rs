use crate::{ex, example_quad, example_quad_in_graph, sorted_quads};
use insta::assert_snapshot;
use ontoquad_common::QuadSource;
use ontoquad_model::{Graph, GraphName, GraphNameRef, Literal, Quad, Triple};
use ontoquad_storage::MemQuadStore;

#[test]
fn test_insert_quad() {
    let mut store = MemQuadStore::new();

    assert!(store.insert(&example_quad()));
    assert_eq!(store.len(), 1);
    store.validate().unwrap();
}

#[test]
fn test_insert_duplicate_quads_no_effect() {
    let mut store = MemQuadStore::new();

    store.insert(&example_quad());
    assert!(!store.insert(&example_quad()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_extend_counts_new_quads() {
    let mut store = MemQuadStore::new();

    let inserted = store.extend(&[example_quad(), example_quad(), example_quad_in_graph("g")]);
    assert_eq!(inserted, 2);
    assert_eq!(store.named_graphs(), vec![GraphName::NamedNode(ex("g"))]);
}

#[test]
fn test_remove_quad() {
    let mut store = MemQuadStore::new();
    let quad = example_quad_in_graph("g");

    store.insert(&quad);
    assert!(store.remove(&quad));
    assert!(!store.remove(&quad));
    assert!(store.is_empty());
    assert_eq!(store.term_count(), 0);
    store.validate().unwrap();
}

#[test]
fn test_index_consistency_after_add_remove() {
    let mut store = MemQuadStore::new();
    let quads = (0..10)
        .map(|i| {
            Quad::new(
                ex(&format!("s{}", i % 3)),
                ex(&format!("p{}", i % 2)),
                Literal::from(i),
                GraphName::NamedNode(ex(&format!("g{}", i % 4))),
            )
        })
        .collect::<Vec<_>>();

    store.extend(&quads);
    store.validate().unwrap();

    for quad in quads.iter().step_by(2) {
        assert!(store.remove(quad));
        store.validate().unwrap();
    }
    assert_eq!(store.len(), 5);

    for quad in quads.iter().skip(1).step_by(2) {
        assert!(store.remove(quad));
        store.validate().unwrap();
    }
    assert!(store.is_empty());
    assert_eq!(store.term_count(), 0);
}

#[test]
fn test_clear() {
    let mut store = MemQuadStore::new();
    store.extend(&[example_quad(), example_quad_in_graph("g")]);

    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.term_count(), 0);
    store.validate().unwrap();
}

#[test]
fn test_pattern_with_unknown_term_is_empty() {
    let mut store = MemQuadStore::new();
    store.insert(&example_quad());

    let unknown = ex("unknown");
    let quads = store
        .quads_for_pattern(None, Some(unknown.as_ref().into()), None, None)
        .unwrap();
    assert!(quads.is_empty());
}

#[test]
fn test_default_graph_restriction() {
    let mut store = MemQuadStore::new();
    store.extend(&[example_quad(), example_quad_in_graph("g")]);

    let quads = store
        .quads_for_pattern(Some(GraphNameRef::DefaultGraph), None, None, None)
        .unwrap();
    assert_eq!(quads, vec![example_quad()]);

    let all = store.quads_for_pattern(None, None, None, None).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_graph_round_trip() {
    let mut graph = Graph::new();
    graph.insert(&Triple::new(ex("alice"), ex("knows"), ex("bob")));
    graph.insert(&Triple::new(ex("alice"), ex("age"), Literal::from(42)));

    let store = MemQuadStore::from_graph(&graph);
    assert_eq!(store.to_graph().unwrap(), graph);
    assert_snapshot!(sorted_quads(&store), @r#"
    <http://example.com/alice> <http://example.com/age> "42"^^<http://www.w3.org/2001/XMLSchema#integer>
    <http://example.com/alice> <http://example.com/knows> <http://example.com/bob>
    "#);
}
