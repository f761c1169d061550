use oxrdf::{
    BlankNode, GraphName, GraphNameRef, Literal, NamedNode, Quad, QuadRef, Subject, Term, TermRef,
    Triple, Variable,
};
use siphasher::sip::SipHasher24;
use std::fmt::{Display, Formatter};
use std::hash::Hasher;

/// A stable 64-bit identity computed from the canonical string form of a value.
///
/// Two values with the same canonical string form always have the same identity. The identity is
/// used as the key of the store indexes and of the reasoner's taxonomies.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct IdentityHash(u64);

impl IdentityHash {
    /// Computes the identity of the given canonical string.
    pub fn new(value: &str) -> Self {
        let mut hasher = SipHasher24::new();
        hasher.write(value.as_bytes());
        Self(hasher.finish())
    }

    #[inline]
    pub fn from_u64(hash: u64) -> Self {
        Self(hash)
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for IdentityHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Types that have an [IdentityHash].
pub trait Identified {
    /// Returns the identity of `self`.
    fn identity(&self) -> IdentityHash;
}

macro_rules! identified_by_display {
    ($t:ty) => {
        impl Identified for $t {
            fn identity(&self) -> IdentityHash {
                IdentityHash::new(&self.to_string())
            }
        }
    };
}

identified_by_display!(NamedNode);
identified_by_display!(BlankNode);
identified_by_display!(Literal);
identified_by_display!(Variable);
identified_by_display!(Subject);
identified_by_display!(Term);
identified_by_display!(TermRef<'_>);
identified_by_display!(Triple);

impl Identified for GraphName {
    fn identity(&self) -> IdentityHash {
        self.as_ref().identity()
    }
}

impl Identified for GraphNameRef<'_> {
    fn identity(&self) -> IdentityHash {
        match self {
            GraphNameRef::NamedNode(node) => IdentityHash::new(&node.to_string()),
            GraphNameRef::BlankNode(node) => IdentityHash::new(&node.to_string()),
            GraphNameRef::DefaultGraph => IdentityHash::new(DEFAULT_CONTEXT),
        }
    }
}

impl Identified for QuadRef<'_> {
    fn identity(&self) -> IdentityHash {
        let context = match self.graph_name {
            GraphNameRef::DefaultGraph => DEFAULT_CONTEXT.to_owned(),
            graph_name => graph_name.to_string(),
        };
        IdentityHash::new(&format!(
            "{context} {} {} {}",
            self.subject, self.predicate, self.object
        ))
    }
}

impl Identified for Quad {
    fn identity(&self) -> IdentityHash {
        self.as_ref().identity()
    }
}

/// The canonical string form of the default context.
const DEFAULT_CONTEXT: &str = "<urn:ontoquad:default-context>";

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{LiteralRef, NamedNodeRef};

    #[test]
    fn equal_strings_have_equal_identities() {
        assert_eq!(IdentityHash::new("foo"), IdentityHash::new("foo"));
        assert_ne!(IdentityHash::new("foo"), IdentityHash::new("bar"));
    }

    #[test]
    fn term_identity_follows_canonical_form() {
        let iri = NamedNode::new_unchecked("http://example.com/a");
        assert_eq!(
            iri.identity(),
            Term::from(iri.clone()).identity(),
            "a resource and its term wrapper share the same canonical form"
        );
        assert_ne!(
            iri.identity(),
            Literal::new_simple_literal("http://example.com/a").identity()
        );
        assert_eq!(
            LiteralRef::new_typed_literal("1", oxrdf::vocab::xsd::INTEGER)
                .into_owned()
                .identity(),
            Literal::new_typed_literal("1", oxrdf::vocab::xsd::INTEGER).identity()
        );
    }

    #[test]
    fn quad_identity_distinguishes_contexts() {
        let ex = NamedNodeRef::new_unchecked("http://example.com/a");
        let default = QuadRef::new(ex, ex, ex, GraphNameRef::DefaultGraph);
        let named = QuadRef::new(ex, ex, ex, ex);
        assert_ne!(default.identity(), named.identity());
        assert_eq!(default.identity(), default.into_owned().identity());
    }
}
