//! A store that combines the quad store, the query engine, and the reasoner.

use crate::error::OntoquadError;
use ontoquad_common::QuadSource;
use ontoquad_engine::{
    AskQuery, AskQueryResult, ConstructQuery, ConstructQueryResult, DescribeQuery,
    DescribeQueryResult, QueryEngine, QueryOptions, SelectQuery, SelectQueryResult,
};
use ontoquad_model::{GraphNameRef, QuadRef};
use ontoquad_reasoner::{Ontology, Reasoner, ReasonerRuleset, ReasoningReport};
use ontoquad_storage::MemQuadStore;
use std::sync::Arc;
use tracing::debug;

/// An in-memory quad store whose default graph holds an ontology.
///
/// Queries run against a snapshot of the store. [KnowledgeBase::materialize] reasons over the
/// default graph and writes the inferred triples back into it.
#[derive(Debug)]
pub struct KnowledgeBase {
    store: Arc<MemQuadStore>,
    reasoner: Reasoner,
    options: QueryOptions,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Creates an empty knowledge base with all standard rules enabled.
    pub fn new() -> Self {
        Self::from_store(MemQuadStore::new())
    }

    pub fn from_store(store: MemQuadStore) -> Self {
        Self {
            store: Arc::new(store),
            reasoner: Reasoner::new(ReasonerRuleset::with_all_standard_rules()),
            options: QueryOptions::default(),
        }
    }

    #[must_use]
    pub fn with_reasoner(mut self, reasoner: Reasoner) -> Self {
        self.reasoner = reasoner;
        self
    }

    #[must_use]
    pub fn with_query_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &MemQuadStore {
        &self.store
    }

    pub fn reasoner(&self) -> &Reasoner {
        &self.reasoner
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Inserts a quad. Returns whether the quad was not yet present.
    pub fn insert<'a>(&mut self, quad: impl Into<QuadRef<'a>>) -> bool {
        Arc::make_mut(&mut self.store).insert(quad)
    }

    /// Removes a quad. Returns whether the quad was present.
    pub fn remove<'a>(&mut self, quad: impl Into<QuadRef<'a>>) -> bool {
        Arc::make_mut(&mut self.store).remove(quad)
    }

    /// Returns a query engine over the current content of the store.
    pub fn engine(&self) -> QueryEngine {
        let source: Arc<dyn QuadSource> = Arc::<MemQuadStore>::clone(&self.store);
        QueryEngine::new(source).with_options(self.options.clone())
    }

    pub fn select(&self, query: &SelectQuery) -> Result<SelectQueryResult, OntoquadError> {
        Ok(self.engine().evaluate_select(query)?)
    }

    pub fn ask(&self, query: &AskQuery) -> Result<AskQueryResult, OntoquadError> {
        Ok(self.engine().evaluate_ask(query)?)
    }

    pub fn construct(
        &self,
        query: &ConstructQuery,
    ) -> Result<ConstructQueryResult, OntoquadError> {
        Ok(self.engine().evaluate_construct(query)?)
    }

    pub fn describe(&self, query: &DescribeQuery) -> Result<DescribeQueryResult, OntoquadError> {
        Ok(self.engine().evaluate_describe(query)?)
    }

    /// Reads the ontology of the default graph.
    pub fn ontology(&self) -> Result<Ontology, OntoquadError> {
        let graph = self.store.graph(GraphNameRef::DefaultGraph)?;
        Ok(Ontology::from_graph(&graph)?)
    }

    /// Reasons over the ontology of the default graph and inserts the inferred triples into it.
    ///
    /// Validation issues of the ontology are logged by the reasoner but do not stop reasoning.
    pub fn materialize(&mut self) -> Result<ReasoningReport, OntoquadError> {
        let ontology = self.ontology()?;
        let validation = ontology.validate();
        let report = self.reasoner.apply(&ontology, &validation)?;

        let store = Arc::make_mut(&mut self.store);
        let mut inserted = 0;
        for evidence in report.evidences() {
            let triple = evidence.entry().to_triple();
            if store.insert(triple.as_ref().in_graph(GraphNameRef::DefaultGraph)) {
                inserted += 1;
            }
        }
        debug!(
            ontology = %ontology.name(),
            evidences = report.len(),
            inserted,
            "Materialized inferred triples"
        );
        Ok(report)
    }
}
