use crate::{ex, pattern, social_store, var};
use insta::assert_snapshot;
use ontoquad_engine::{
    ConstructQuery, ConstructQueryResult, DescribeQuery, PatternGroup, QueryBody, QueryEngine,
};
use ontoquad_model::{Graph, Literal, Pattern, Subject, Triple};
use std::sync::Arc;

fn all_triples() -> QueryBody {
    QueryBody::new()
        .with_member(PatternGroup::new("all").with_pattern(pattern("?s", "?p", "?o")))
}

#[test]
fn test_construct_round_trip_through_graph() {
    let store = social_store();
    let engine = QueryEngine::new(Arc::new(store.clone()));
    let query = ConstructQuery::new(vec![pattern("?s", "?p", "?o")], all_triples());

    let result = engine.evaluate_construct(&query).unwrap();
    let graph = result.to_graph();

    assert_eq!(graph, store.to_graph().unwrap());
    assert_eq!(ConstructQueryResult::from_graph(&graph).to_graph(), graph);
    assert_eq!(result.to_store().len(), store.len());
}

#[test]
fn test_construct_instantiates_template() {
    let mut graph = Graph::new();
    graph.insert(&Triple::new(ex("alice"), ex("age"), Literal::from(30)));
    graph.insert(&Triple::new(ex("bob"), ex("age"), Literal::from(17)));
    let engine = QueryEngine::new(Arc::new(graph));

    let group = PatternGroup::new("ages").with_pattern(pattern("?person", "age", "?age"));
    let template = vec![
        Pattern::new(var("age"), ex("ageOf"), var("person")).unwrap(),
        pattern("?person", "type", "Person"),
    ];
    let query = ConstructQuery::new(template, QueryBody::new().with_member(group));

    let result = engine.evaluate_construct(&query).unwrap();
    let mut triples = result
        .to_graph()
        .iter()
        .map(|triple| triple.to_string())
        .collect::<Vec<_>>();
    triples.sort();

    assert_snapshot!(triples.join("\n"), @r"
    <http://example.com/alice> <http://example.com/type> <http://example.com/Person>
    <http://example.com/bob> <http://example.com/type> <http://example.com/Person>
    ");
}

#[test]
fn test_describe_constant_resource() {
    let engine = QueryEngine::new(Arc::new(social_store()));
    let query = DescribeQuery::new(vec![ex("bob").into()], QueryBody::new());

    let result = engine.evaluate_describe(&query).unwrap();

    assert_eq!(result.len(), 3);
    assert!(result
        .quads()
        .iter()
        .all(|quad| quad.subject == Subject::from(ex("bob"))));
}
