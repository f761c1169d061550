mod error;
mod hash;
mod member;
mod numeric;
mod ordering;
mod pattern;
pub mod vocab;

pub use error::*;
pub use hash::*;
pub use member::*;
pub use numeric::*;
pub use ordering::*;
pub use pattern::*;

// Re-export some oxrdf types.
pub use oxrdf::{
    BlankNode, BlankNodeRef, Graph, GraphName, GraphNameRef, IriParseError, Literal, LiteralRef,
    NamedNode, NamedNodeRef, Quad, QuadRef, Subject, SubjectRef, Term, TermRef, Triple, TripleRef,
    Variable, VariableNameParseError, VariableRef,
};
