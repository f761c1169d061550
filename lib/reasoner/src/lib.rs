//! A forward-chaining reasoner for ontologies.
//!
//! An [Ontology] consists of a class model, a property model, and data. Each of them holds
//! [Taxonomy]s of [TaxonomyEntry]s. The [Reasoner] applies the enabled [StandardRule]s and the
//! user-provided [ReasoningRule]s and records every new entry as an [Evidence] in a
//! [ReasoningReport].

mod error;
mod ontology;
mod reasoner;
mod report;
mod rules;
mod ruleset;
mod taxonomy;
mod validation;

pub use error::ReasonerError;
pub use ontology::{ClassModel, Ontology, OntologyData, PropertyModel};
pub use reasoner::{Reasoner, ReasonerOptions, MAX_FIXPOINT_PASSES};
pub use report::{Evidence, EvidenceCategory, ReasoningReport};
pub use rules::StandardRule;
pub use ruleset::{CustomRule, ReasonerRuleset, ReasoningRule};
pub use taxonomy::{Taxonomy, TaxonomyEntry};
pub use validation::ValidationReport;
