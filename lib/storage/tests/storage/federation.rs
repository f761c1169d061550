use crate::{ex, example_quad, example_quad_in_graph, sorted_quads};
use insta::assert_snapshot;
use ontoquad_common::{QuadSource, QuadSourceExt};
use ontoquad_model::{Graph, Triple};
use ontoquad_storage::{Federation, MemQuadStore};
use std::sync::Arc;

#[test]
fn test_federation_deduplicates_quads() {
    let mut first = MemQuadStore::new();
    first.extend(&[example_quad(), example_quad_in_graph("g")]);
    let mut second = MemQuadStore::new();
    second.insert(&example_quad());

    let federation = Federation::new()
        .with_source(Arc::new(first))
        .with_source(Arc::new(second));

    assert_eq!(federation.len(), 2);
    assert_eq!(federation.all_quads().unwrap().len(), 2);
}

#[test]
fn test_federation_combines_graphs_and_stores() {
    let mut graph = Graph::new();
    graph.insert(&Triple::new(ex("alice"), ex("knows"), ex("bob")));
    let mut store = MemQuadStore::new();
    store.insert(&example_quad_in_graph("g"));

    let federation: Federation = [
        Arc::new(graph) as Arc<dyn QuadSource>,
        Arc::new(store) as Arc<dyn QuadSource>,
    ]
    .into_iter()
    .collect();

    assert_snapshot!(sorted_quads(&federation), @r#"
    <http://example.com/alice> <http://example.com/knows> <http://example.com/bob>
    <http://example.com/subject> <http://example.com/predicate> "value" <http://example.com/g>
    "#);

    let knows = ex("knows");
    let quads = federation
        .quads_for_pattern(None, None, Some(knows.as_ref()), None)
        .unwrap();
    assert_eq!(quads.len(), 1);
}

#[test]
fn test_empty_federation_has_no_quads() {
    let federation = Federation::new();
    assert!(federation.is_empty());
    assert!(federation.all_quads().unwrap().is_empty());
}
