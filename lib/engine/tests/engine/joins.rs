use crate::{ex, pattern, social_store, var};
use insta::assert_snapshot;
use ontoquad_engine::{
    Modifier, OrderBy, PatternGroup, PropertyPath, QueryBody, QueryEngine, QueryMember,
    SelectQuery,
};
use std::sync::Arc;

fn engine() -> QueryEngine {
    QueryEngine::new(Arc::new(social_store()))
}

fn ordered_by(query: SelectQuery, variable: &str) -> SelectQuery {
    query.with_modifier(Modifier::OrderBy(OrderBy::ascending(var(variable))))
}

#[test]
fn test_join_on_shared_variable() {
    let group = PatternGroup::new("friend-names")
        .with_pattern(pattern("alice", "knows", "?friend"))
        .with_pattern(pattern("?friend", "name", "?name"));
    let query = SelectQuery::new(QueryBody::new().with_member(group));

    let result = engine().evaluate_select(&query).unwrap();

    assert_snapshot!(result.table(), @r#"
    | ?friend | ?name |
    | <http://example.com/bob> | "Bob" |
    "#);
}

#[test]
fn test_join_drops_rows_without_partner() {
    let group = PatternGroup::new("friend-names")
        .with_pattern(pattern("?person", "knows", "?friend"))
        .with_pattern(pattern("?friend", "name", "?name"));
    let query = ordered_by(SelectQuery::new(QueryBody::new().with_member(group)), "person");

    let result = engine().evaluate_select(&query).unwrap();

    assert_snapshot!(result.table(), @r#"
    | ?person | ?friend | ?name |
    | <http://example.com/alice> | <http://example.com/bob> | "Bob" |
    | <http://example.com/carol> | <http://example.com/alice> | "Alice" |
    "#);
}

#[test]
fn test_optional_pattern_yields_unbound_cell() {
    let group = PatternGroup::new("optional-name")
        .with_pattern(pattern("bob", "knows", "?friend"))
        .with_pattern(pattern("?friend", "name", "?name").optional());
    let query = SelectQuery::new(QueryBody::new().with_member(group));

    let result = engine().evaluate_select(&query).unwrap();

    assert_snapshot!(result.table(), @r"
    | ?friend | ?name |
    | <http://example.com/carol> |  |
    ");
}

#[test]
fn test_optional_group_keeps_all_rows() {
    let people = PatternGroup::new("people").with_pattern(pattern("?person", "knows", "?friend"));
    let ages = PatternGroup::new("ages").with_pattern(pattern("?person", "age", "?age"));
    let query = ordered_by(
        SelectQuery::new(
            QueryBody::new()
                .with_member(people)
                .with_member(QueryMember::group(ages).optional()),
        )
        .with_projection(vec![var("person"), var("age")]),
        "person",
    );

    let result = engine().evaluate_select(&query).unwrap();

    assert_snapshot!(result.table(), @r#"
    | ?person | ?age |
    | <http://example.com/alice> | "30"^^<http://www.w3.org/2001/XMLSchema#integer> |
    | <http://example.com/bob> | "17"^^<http://www.w3.org/2001/XMLSchema#integer> |
    | <http://example.com/carol> |  |
    "#);
}

#[test]
fn test_union_of_groups() {
    let names = PatternGroup::new("names").with_pattern(pattern("?person", "name", "?value"));
    let ages = PatternGroup::new("ages").with_pattern(pattern("?person", "age", "?age"));
    let query = SelectQuery::new(
        QueryBody::new()
            .with_member(QueryMember::group(names).union_with_next())
            .with_member(ages),
    );

    let result = engine().evaluate_select(&query).unwrap();

    assert_eq!(result.len(), 4);
    assert_eq!(result.variables(), &[var("person"), var("value"), var("age")]);
}

#[test]
fn test_property_path_sequence() {
    let path = PropertyPath::new(ex("alice"), var("name"))
        .unwrap()
        .then(ex("knows"))
        .then(ex("knows"))
        .then(ex("knows"))
        .then(ex("name"));
    let group = PatternGroup::new("cycle").with_path(path);
    let query = SelectQuery::new(QueryBody::new().with_member(group));

    let result = engine().evaluate_select(&query).unwrap();

    assert_snapshot!(result.table(), @r#"
    | ?name |
    | "Alice" |
    "#);
}
