use crate::{pattern, social_store};
use ontoquad_engine::{AskQuery, PatternGroup, QueryBody, QueryEngine, SelectQuery};
use std::sync::Arc;

fn knows() -> QueryBody {
    QueryBody::new()
        .with_member(PatternGroup::new("knows").with_pattern(pattern("?a", "knows", "?b")))
}

#[tokio::test]
async fn test_select_async_matches_sync() {
    let engine = QueryEngine::new(Arc::new(social_store()));
    let query = SelectQuery::new(knows());

    let sync = engine.evaluate_select(&query).unwrap();
    let result = engine.evaluate_select_async(query).await.unwrap();

    assert_eq!(result, sync);
    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn test_ask_async() {
    let engine = QueryEngine::new(Arc::new(social_store()));

    let result = engine.evaluate_ask_async(AskQuery::new(knows())).await.unwrap();

    assert!(result.value());
}
