use crate::{IdentityHash, Identified};
use oxrdf::{
    BlankNode, GraphName, Literal, NamedNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef,
    Variable,
};
use std::fmt::{Display, Formatter};

/// Anything that can occupy a position of a [`Pattern`](crate::Pattern).
///
/// IRIs in the context position of a pattern act as contexts (named graphs).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternMember {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    Variable(Variable),
}

impl PatternMember {
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Returns the RDF term of this member, or [None] for variables.
    pub fn as_term(&self) -> Option<TermRef<'_>> {
        match self {
            Self::NamedNode(node) => Some(node.as_ref().into()),
            Self::BlankNode(node) => Some(node.as_ref().into()),
            Self::Literal(literal) => Some(literal.as_ref().into()),
            Self::Variable(_) => None,
        }
    }

    pub fn as_subject(&self) -> Option<SubjectRef<'_>> {
        match self {
            Self::NamedNode(node) => Some(node.as_ref().into()),
            Self::BlankNode(node) => Some(node.as_ref().into()),
            _ => None,
        }
    }

    pub fn as_named_node(&self) -> Option<NamedNodeRef<'_>> {
        match self {
            Self::NamedNode(node) => Some(node.as_ref()),
            _ => None,
        }
    }
}

impl Display for PatternMember {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NamedNode(node) => node.fmt(f),
            Self::BlankNode(node) => node.fmt(f),
            Self::Literal(literal) => literal.fmt(f),
            Self::Variable(variable) => variable.fmt(f),
        }
    }
}

impl Identified for PatternMember {
    fn identity(&self) -> IdentityHash {
        IdentityHash::new(&self.to_string())
    }
}

impl From<NamedNode> for PatternMember {
    fn from(value: NamedNode) -> Self {
        Self::NamedNode(value)
    }
}

impl From<NamedNodeRef<'_>> for PatternMember {
    fn from(value: NamedNodeRef<'_>) -> Self {
        Self::NamedNode(value.into_owned())
    }
}

impl From<BlankNode> for PatternMember {
    fn from(value: BlankNode) -> Self {
        Self::BlankNode(value)
    }
}

impl From<Literal> for PatternMember {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl From<Variable> for PatternMember {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}

impl From<Subject> for PatternMember {
    fn from(value: Subject) -> Self {
        Term::from(value).into()
    }
}

impl From<Term> for PatternMember {
    fn from(value: Term) -> Self {
        match value {
            Term::NamedNode(node) => Self::NamedNode(node),
            Term::BlankNode(node) => Self::BlankNode(node),
            Term::Literal(literal) => Self::Literal(literal),
        }
    }
}

/// Converts a term into a subject. Returns [None] for literals.
pub fn term_to_subject(term: Term) -> Option<Subject> {
    match term {
        Term::NamedNode(node) => Some(Subject::NamedNode(node)),
        Term::BlankNode(node) => Some(Subject::BlankNode(node)),
        Term::Literal(_) => None,
    }
}

/// Converts a term into a graph name. Returns [None] for literals.
pub fn term_to_graph_name(term: Term) -> Option<GraphName> {
    match term {
        Term::NamedNode(node) => Some(GraphName::NamedNode(node)),
        Term::BlankNode(node) => Some(GraphName::BlankNode(node)),
        Term::Literal(_) => None,
    }
}

/// Returns the graph name as a term or [None] for the default graph.
pub fn graph_name_to_term(graph_name: GraphName) -> Option<Term> {
    match graph_name {
        GraphName::NamedNode(node) => Some(node.into()),
        GraphName::BlankNode(node) => Some(node.into()),
        GraphName::DefaultGraph => None,
    }
}
