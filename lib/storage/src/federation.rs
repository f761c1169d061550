use ontoquad_common::error::StorageError;
use ontoquad_common::QuadSource;
use ontoquad_model::{GraphNameRef, NamedNodeRef, Quad, SubjectRef, TermRef};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::debug;

/// A read-only union of multiple data sources.
///
/// A pattern is dispatched to every member and the results are concatenated in member order.
/// Quads that are provided by more than one member are reported once.
#[derive(Debug, Clone, Default)]
pub struct Federation {
    sources: Vec<Arc<dyn QuadSource>>,
}

impl Federation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `source` as a member of the federation.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn QuadSource>) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: Arc<dyn QuadSource>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Arc<dyn QuadSource>] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl FromIterator<Arc<dyn QuadSource>> for Federation {
    fn from_iter<T: IntoIterator<Item = Arc<dyn QuadSource>>>(iter: T) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}

impl QuadSource for Federation {
    fn quads_for_pattern(
        &self,
        graph_name: Option<GraphNameRef<'_>>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError> {
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        for source in &self.sources {
            let quads = source.quads_for_pattern(graph_name, subject, predicate, object)?;
            for quad in quads {
                if seen.insert(quad.clone()) {
                    result.push(quad);
                }
            }
        }
        debug!(
            members = self.sources.len(),
            matches = result.len(),
            "Evaluated pattern on federation"
        );
        Ok(result)
    }
}
