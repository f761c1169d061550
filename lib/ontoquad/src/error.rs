use ontoquad_common::error::StorageError;
use ontoquad_engine::QueryError;
use ontoquad_reasoner::ReasonerError;
use std::io;

/// An error raised by a [`KnowledgeBase`](crate::store::KnowledgeBase).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OntoquadError {
    /// An error raised while accessing the quads of the store.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// An error raised while evaluating a query.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// An error raised while reasoning over the ontology of the store.
    #[error(transparent)]
    Reasoner(#[from] ReasonerError),
}

impl From<OntoquadError> for io::Error {
    #[inline]
    fn from(error: OntoquadError) -> Self {
        match error {
            OntoquadError::Storage(error) => error.into(),
            OntoquadError::Query(error) => Self::other(error),
            OntoquadError::Reasoner(error) => Self::new(io::ErrorKind::InvalidData, error),
        }
    }
}
