use crate::{ex, pattern, var};
use insta::assert_snapshot;
use ontoquad_engine::{
    AggregateFunction, Aggregator, GroupBy, Modifier, ModifierPipeline, OrderBy, PatternGroup,
    QueryBody, QueryEngine, SelectQuery, SolutionTable,
};
use ontoquad_model::vocab::xsd;
use ontoquad_model::{GraphName, Literal, NamedNode, Quad, Term};
use ontoquad_storage::MemQuadStore;
use std::sync::Arc;

/// Items whose `value` mixes numbers, plain strings and a custom datatype. `i7` has no value.
fn mixed_values() -> Vec<(&'static str, Option<Literal>)> {
    let custom = NamedNode::new_unchecked("http://example.com/dt");
    vec![
        ("i1", Some(Literal::from(3))),
        ("i2", Some(Literal::new_simple_literal("b"))),
        ("i3", Some(Literal::new_typed_literal("zzz", custom.clone()))),
        ("i4", Some(Literal::new_typed_literal("aaa", custom))),
        ("i5", Some(Literal::new_typed_literal("1.5", xsd::DECIMAL))),
        ("i6", Some(Literal::new_simple_literal("a"))),
        ("i7", None),
    ]
}

fn mixed_store() -> MemQuadStore {
    let mut store = MemQuadStore::new();
    for (item, value) in mixed_values() {
        store.insert(&Quad::new(ex(item), ex("a"), ex("Item"), GraphName::DefaultGraph));
        if let Some(value) = value {
            store.insert(&Quad::new(ex(item), ex("value"), value, GraphName::DefaultGraph));
        }
    }
    store
}

fn ordered_items(order_by: OrderBy) -> SolutionTable {
    let group = PatternGroup::new("items")
        .with_pattern(pattern("?item", "a", "Item"))
        .with_pattern(pattern("?item", "value", "?value").optional());
    let query = SelectQuery::new(QueryBody::new().with_member(group))
        .with_projection(vec![var("item"), var("value")])
        .with_modifier(Modifier::OrderBy(order_by));
    QueryEngine::new(Arc::new(mixed_store()))
        .evaluate_select(&query)
        .unwrap()
        .table()
        .clone()
}

fn value_table(values: Vec<Option<Literal>>) -> SolutionTable {
    let rows = values
        .into_iter()
        .map(|value| vec![value.map(Term::from)])
        .collect();
    SolutionTable::try_new(vec![var("value")], rows).unwrap()
}

#[test]
fn test_order_by_mixed_term_types() {
    let ascending = ordered_items(OrderBy::ascending(var("value")));

    assert_snapshot!(&ascending, @r#"
    | ?item | ?value |
    | <http://example.com/i7> |  |
    | <http://example.com/i5> | "1.5"^^<http://www.w3.org/2001/XMLSchema#decimal> |
    | <http://example.com/i1> | "3"^^<http://www.w3.org/2001/XMLSchema#integer> |
    | <http://example.com/i6> | "a" |
    | <http://example.com/i2> | "b" |
    | <http://example.com/i4> | "aaa"^^<http://example.com/dt> |
    | <http://example.com/i3> | "zzz"^^<http://example.com/dt> |
    "#);

    let mut descending = ordered_items(OrderBy::descending(var("value"))).into_rows();
    descending.reverse();
    assert_eq!(descending, ascending.into_rows());
}

#[test]
fn test_min_and_max_do_not_depend_on_input_order() {
    let group_by = GroupBy::new(Vec::new())
        .with_aggregator(Aggregator::new(
            AggregateFunction::Min,
            var("value"),
            var("min"),
        ))
        .with_aggregator(Aggregator::new(
            AggregateFunction::Max,
            var("value"),
            var("max"),
        ));
    let modifiers = [Modifier::GroupBy(group_by)];
    let pipeline = ModifierPipeline::new(&modifiers);

    let values = mixed_values()
        .into_iter()
        .map(|(_, value)| value)
        .collect::<Vec<_>>();
    let mut reversed = values.clone();
    reversed.reverse();

    let forward = pipeline.apply(value_table(values), None).unwrap();
    let backward = pipeline.apply(value_table(reversed), None).unwrap();

    assert_snapshot!(&forward, @r#"
    | ?min | ?max |
    | "1.5"^^<http://www.w3.org/2001/XMLSchema#decimal> | "zzz"^^<http://example.com/dt> |
    "#);
    assert_eq!(forward.into_rows(), backward.into_rows());
}
