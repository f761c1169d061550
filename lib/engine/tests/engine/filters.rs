use crate::{ex, pattern, social_store, var};
use insta::assert_snapshot;
use ontoquad_engine::{
    ComparisonOperator, Filter, Modifier, OrderBy, PatternGroup, QueryBody, QueryEngine,
    SelectQuery,
};
use ontoquad_model::Literal;
use std::sync::Arc;

fn engine() -> QueryEngine {
    QueryEngine::new(Arc::new(social_store()))
}

fn count(group: PatternGroup) -> usize {
    let query = SelectQuery::new(QueryBody::new().with_member(group));
    engine().evaluate_select(&query).unwrap().len()
}

fn people() -> PatternGroup {
    PatternGroup::new("people")
        .with_pattern(pattern("?person", "knows", "?friend"))
        .with_pattern(pattern("?person", "age", "?age").optional())
        .with_pattern(pattern("?person", "name", "?name").optional())
}

fn filters() -> Vec<Filter> {
    vec![
        Filter::comparison(ComparisonOperator::Less, var("age"), Literal::from(18)),
        Filter::Bound(var("name")),
        Filter::regex(var("name"), "^a", "i"),
        Filter::IsLiteral(var("friend")),
        Filter::or(
            Filter::Bound(var("age")),
            Filter::SameTerm {
                variable: var("person"),
                term: ex("carol").into(),
            },
        ),
        Filter::not(Filter::Bound(var("age"))),
    ]
}

#[test]
fn test_negated_filter_keeps_the_complement() {
    let total = count(people());
    assert_eq!(total, 3);

    for filter in filters() {
        let kept = count(people().with_filter(filter.clone()));
        let dropped = count(people().with_negated_filter(filter));
        assert_eq!(kept + dropped, total);
    }
}

#[test]
fn test_not_exists_is_the_complement_of_exists() {
    let named_friend = || {
        PatternGroup::new("named-friend").with_pattern(pattern("?friend", "name", "?friend_name"))
    };
    let base = || PatternGroup::new("knows").with_pattern(pattern("?person", "knows", "?friend"));

    let exists = count(base().with_filter(Filter::exists(named_friend())));
    let not_exists = count(base().with_filter(Filter::not_exists(named_friend())));
    let negated_exists = count(base().with_negated_filter(Filter::exists(named_friend())));

    assert_eq!(exists, 2);
    assert_eq!(not_exists, 1);
    assert_eq!(not_exists, negated_exists);
}

#[test]
fn test_filter_on_numeric_comparison() {
    let group = people().with_filter(Filter::comparison(
        ComparisonOperator::GreaterOrEqual,
        var("age"),
        Literal::from(18),
    ));
    let query = SelectQuery::new(QueryBody::new().with_member(group))
        .with_projection(vec![var("person"), var("age")])
        .with_modifier(Modifier::OrderBy(OrderBy::ascending(var("person"))));

    let result = engine().evaluate_select(&query).unwrap();

    assert_snapshot!(result.table(), @r#"
    | ?person | ?age |
    | <http://example.com/alice> | "30"^^<http://www.w3.org/2001/XMLSchema#integer> |
    "#);
}
