use crate::PatternMember;
use oxsdatatypes::{ParseDateTimeError, ParseDecimalError};
use std::fmt::{Display, Formatter};
use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;
use thiserror::Error;

/// A light-weight result, mainly used for evaluating filters and expressions on a single row.
pub type ThinResult<T> = Result<T, ThinError>;

/// A thin error type that indicates an *expected* failure without any reason.
///
/// Comparing a literal with an IRI or evaluating an expression on an unbound variable can fail.
/// These failures are part of the query evaluation and all of them are treated equally: the row
/// is discarded or the binding stays unbound. Therefore, we do not need to store a reason.
#[derive(Clone, Copy, Debug, Default, Error, PartialEq, Eq)]
pub struct ThinError {}

impl ThinError {
    /// Creates a result with a [ThinError].
    pub fn expected<T>() -> ThinResult<T> {
        Err(ThinError::default())
    }
}

impl Display for ThinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("An expected error occurred.")
    }
}

macro_rules! implement_from {
    ($t:ty) => {
        impl From<$t> for ThinError {
            fn from(_: $t) -> Self {
                ThinError::default()
            }
        }
    };
}

implement_from!(ParseBoolError);
implement_from!(ParseIntError);
implement_from!(ParseFloatError);
implement_from!(ParseDecimalError);
implement_from!(ParseDateTimeError);

/// An error raised while constructing a [`Pattern`](crate::Pattern) with members that cannot
/// occupy the requested position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// Literals cannot be used as subjects.
    #[error("The subject of a pattern must be a resource or a variable, found {0}")]
    InvalidSubject(PatternMember),
    /// Predicates must be IRIs; blank nodes and literals are rejected.
    #[error("The predicate of a pattern must be an IRI or a variable, found {0}")]
    InvalidPredicate(PatternMember),
    /// Contexts must be IRIs.
    #[error("The context of a pattern must be an IRI or a variable, found {0}")]
    InvalidContext(PatternMember),
    /// The start or end of a property path is a literal in a subject position.
    #[error("The start of a property path must be a resource or a variable, found {0}")]
    InvalidPathStart(PatternMember),
}
