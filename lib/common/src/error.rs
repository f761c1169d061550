use std::error::Error;
use std::io;

/// An error related to reading quads from a data source.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    /// Error from the OS I/O layer.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Error related to an inconsistent index.
    #[error(transparent)]
    Corruption(#[from] CorruptionError),
    /// Error while querying a remote data source.
    #[error("The remote data source {source_name} failed: {error}")]
    Remote {
        /// The name (e.g., the URL) of the remote source.
        source_name: String,
        /// The transport error.
        #[source]
        error: Box<dyn Error + Send + Sync + 'static>,
    },
    #[error("{0}")]
    Other(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl StorageError {
    /// Builds a [StorageError::Remote] for the given source.
    pub fn remote(
        source_name: impl Into<String>,
        error: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::Remote {
            source_name: source_name.into(),
            error: error.into(),
        }
    }
}

impl From<StorageError> for io::Error {
    #[inline]
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Io(error) => error,
            StorageError::Corruption(error) => error.into(),
            StorageError::Remote { .. } | StorageError::Other(_) => Self::other(error),
        }
    }
}

/// An error returned if an index of a store references a term or a quad that is unknown.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct CorruptionError(#[from] CorruptionErrorKind);

#[derive(Debug, thiserror::Error)]
enum CorruptionErrorKind {
    #[error("{0}")]
    Msg(String),
    #[error("{0}")]
    Other(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl CorruptionError {
    /// Builds an error from another error.
    #[inline]
    pub fn new(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self(CorruptionErrorKind::Other(error.into()))
    }

    /// Builds an error from a printable error message.
    #[inline]
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(CorruptionErrorKind::Msg(msg.into()))
    }
}

impl From<CorruptionError> for io::Error {
    #[inline]
    fn from(error: CorruptionError) -> Self {
        Self::new(io::ErrorKind::InvalidData, error)
    }
}
