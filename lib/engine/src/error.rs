use ontoquad_common::error::StorageError;
use ontoquad_model::PatternError;
use std::convert::Infallible;
use std::error::Error;

/// An error raised while building or evaluating a query.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryError {
    /// An error from the data source.
    #[error(transparent)]
    Storage(StorageError),
    /// A pattern could not be constructed.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// The query is malformed, e.g., a `BIND` re-binds a variable that is already in scope.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// A SPARQL endpoint could not be reached or returned an invalid response.
    #[error("The SPARQL endpoint {endpoint} failed: {error}")]
    Endpoint {
        endpoint: String,
        #[source]
        error: Box<dyn Error + Send + Sync + 'static>,
    },
    #[error("An internal error that likely indicates towards a bug in ontoquad: {0}")]
    Internal(String),
}

impl QueryError {
    pub fn invalid_query<T>(cause: impl Into<String>) -> Result<T, Self> {
        Err(QueryError::InvalidQuery(cause.into()))
    }

    pub fn internal<T>(cause: impl Into<String>) -> Result<T, Self> {
        Err(QueryError::Internal(cause.into()))
    }
}

impl From<StorageError> for QueryError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Remote { source_name, error } => Self::Endpoint {
                endpoint: source_name,
                error,
            },
            error => Self::Storage(error),
        }
    }
}

impl From<Infallible> for QueryError {
    #[inline]
    fn from(error: Infallible) -> Self {
        match error {}
    }
}
