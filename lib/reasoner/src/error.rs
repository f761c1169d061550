use ontoquad_model::IdentityHash;

/// An error raised by the reasoner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ReasonerError {
    /// The validation report or reasoning report belongs to a different ontology.
    #[error("The report belongs to ontology {report}, but the ontology is {ontology}")]
    ValidationReportMismatch {
        ontology: IdentityHash,
        report: IdentityHash,
    },
    /// The graph does not declare an `owl:Ontology`.
    #[error("The graph does not contain an owl:Ontology declaration")]
    MissingOntologyDeclaration,
    /// The graph declares more than one `owl:Ontology`.
    #[error("The graph contains more than one owl:Ontology declaration")]
    AmbiguousOntologyDeclaration,
}
