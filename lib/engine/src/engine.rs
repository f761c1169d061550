use crate::error::QueryError;
use crate::query::{AskQuery, ConstructQuery, DescribeQuery, SelectQuery};
use crate::results::{AskQueryResult, ConstructQueryResult, DescribeQueryResult, SelectQueryResult};
use ontoquad_common::QuadSource;
use std::sync::Arc;
use tracing::debug;

/// Options for evaluating queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryOptions {
    /// Whether patterns without a context match the quads of all graphs. If disabled, they only
    /// match the default graph.
    pub union_default_graph: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            union_default_graph: true,
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub fn with_union_default_graph(mut self, union_default_graph: bool) -> Self {
        self.union_default_graph = union_default_graph;
        self
    }
}

/// Evaluates queries against a data source.
///
/// ```
/// use ontoquad_engine::{PatternGroup, QueryBody, QueryEngine, SelectQuery};
/// use ontoquad_model::{GraphName, NamedNode, Pattern, Quad, Variable};
/// use ontoquad_storage::MemQuadStore;
/// use std::sync::Arc;
///
/// let ex = NamedNode::new("http://example.com")?;
/// let mut store = MemQuadStore::new();
/// store.insert(&Quad::new(ex.clone(), ex.clone(), ex.clone(), GraphName::DefaultGraph));
///
/// let group = PatternGroup::new("all").with_pattern(Pattern::new(
///     Variable::new("s")?,
///     ex.clone(),
///     Variable::new("o")?,
/// )?);
/// let query = SelectQuery::new(QueryBody::new().with_member(group));
///
/// let engine = QueryEngine::new(Arc::new(store));
/// let result = engine.evaluate_select(&query)?;
/// assert_eq!(result.len(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug)]
pub struct QueryEngine {
    source: Arc<dyn QuadSource>,
    options: QueryOptions,
}

impl QueryEngine {
    pub fn new(source: Arc<dyn QuadSource>) -> Self {
        Self {
            source,
            options: QueryOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &Arc<dyn QuadSource> {
        &self.source
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn evaluate_select(&self, query: &SelectQuery) -> Result<SelectQueryResult, QueryError> {
        debug!(members = query.body().members().len(), "Evaluating SELECT query");
        query.evaluate(self.source.as_ref(), &self.options)
    }

    pub fn evaluate_ask(&self, query: &AskQuery) -> Result<AskQueryResult, QueryError> {
        debug!(members = query.body().members().len(), "Evaluating ASK query");
        query.evaluate(self.source.as_ref(), &self.options)
    }

    pub fn evaluate_construct(
        &self,
        query: &ConstructQuery,
    ) -> Result<ConstructQueryResult, QueryError> {
        debug!(members = query.body().members().len(), "Evaluating CONSTRUCT query");
        query.evaluate(self.source.as_ref(), &self.options)
    }

    pub fn evaluate_describe(
        &self,
        query: &DescribeQuery,
    ) -> Result<DescribeQueryResult, QueryError> {
        debug!(members = query.body().members().len(), "Evaluating DESCRIBE query");
        query.evaluate(self.source.as_ref(), &self.options)
    }

    /// Evaluates `query` on the blocking thread pool of the current Tokio runtime.
    pub async fn evaluate_select_async(
        &self,
        query: SelectQuery,
    ) -> Result<SelectQueryResult, QueryError> {
        let engine = self.clone();
        spawn_evaluation(move || engine.evaluate_select(&query)).await
    }

    /// Evaluates `query` on the blocking thread pool of the current Tokio runtime.
    pub async fn evaluate_ask_async(&self, query: AskQuery) -> Result<AskQueryResult, QueryError> {
        let engine = self.clone();
        spawn_evaluation(move || engine.evaluate_ask(&query)).await
    }

    /// Evaluates `query` on the blocking thread pool of the current Tokio runtime.
    pub async fn evaluate_construct_async(
        &self,
        query: ConstructQuery,
    ) -> Result<ConstructQueryResult, QueryError> {
        let engine = self.clone();
        spawn_evaluation(move || engine.evaluate_construct(&query)).await
    }

    /// Evaluates `query` on the blocking thread pool of the current Tokio runtime.
    pub async fn evaluate_describe_async(
        &self,
        query: DescribeQuery,
    ) -> Result<DescribeQueryResult, QueryError> {
        let engine = self.clone();
        spawn_evaluation(move || engine.evaluate_describe(&query)).await
    }
}

async fn spawn_evaluation<T: Send + 'static>(
    evaluation: impl FnOnce() -> Result<T, QueryError> + Send + 'static,
) -> Result<T, QueryError> {
    tokio::task::spawn_blocking(evaluation)
        .await
        .map_err(|error| QueryError::Internal(format!("The evaluation task failed: {error}")))?
}
