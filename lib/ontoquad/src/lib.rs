//! Ontoquad is an in-memory RDF quad store with a query engine for the SPARQL algebra and a
//! forward-chaining OWL reasoner.
//!
//! The [KnowledgeBase](store::KnowledgeBase) ties the three together:
//!
//! ```
//! use ontoquad::model::vocab::{owl, rdf, rdfs};
//! use ontoquad::model::{GraphName, NamedNode, Quad};
//! use ontoquad::store::KnowledgeBase;
//!
//! let ex = |name: &str| NamedNode::new_unchecked(format!("http://example.com/{name}"));
//! let mut knowledge_base = KnowledgeBase::new();
//! for (s, p, o) in [
//!     (ex("zoo"), rdf::TYPE.into_owned(), owl::ONTOLOGY.into_owned()),
//!     (ex("Lion"), rdfs::SUB_CLASS_OF.into_owned(), ex("Animal")),
//!     (ex("leo"), rdf::TYPE.into_owned(), ex("Lion")),
//! ] {
//!     knowledge_base.insert(&Quad::new(s, p, o, GraphName::DefaultGraph));
//! }
//!
//! let report = knowledge_base.materialize()?;
//! assert_eq!(report.len(), 1);
//! assert_eq!(knowledge_base.len(), 4);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

pub mod error;
pub mod store;

pub mod model {
    pub use ontoquad_model::*;
}

pub mod common {
    pub use ontoquad_common::*;
}

pub mod storage {
    pub use ontoquad_storage::*;
}

pub mod engine {
    pub use ontoquad_engine::*;
}

pub mod reasoner {
    pub use ontoquad_reasoner::*;
}
