use ontoquad_model::{Identified, IdentityHash, NamedNode, Subject, Term, Triple};
use rustc_hash::FxHashMap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// A `(subject, predicate, object)` relation of an ontology.
///
/// Entries derived by the reasoner are marked as inferred. Two entries are equal if they describe
/// the same relation, regardless of whether they are inferred.
#[derive(Clone, Debug)]
pub struct TaxonomyEntry {
    subject: Subject,
    predicate: NamedNode,
    object: Term,
    inferred: bool,
    identity: IdentityHash,
}

impl TaxonomyEntry {
    /// Creates a new asserted entry.
    pub fn new(
        subject: impl Into<Subject>,
        predicate: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) -> Self {
        let subject = subject.into();
        let predicate = predicate.into();
        let object = object.into();
        let identity = IdentityHash::new(&format!("{subject} {predicate} {object}"));
        Self {
            subject,
            predicate,
            object,
            inferred: false,
            identity,
        }
    }

    #[must_use]
    pub fn mark_inferred(mut self) -> Self {
        self.inferred = true;
        self
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn predicate(&self) -> &NamedNode {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }

    pub fn is_inferred(&self) -> bool {
        self.inferred
    }

    pub fn to_triple(&self) -> Triple {
        Triple::new(
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
        )
    }
}

impl Identified for TaxonomyEntry {
    fn identity(&self) -> IdentityHash {
        self.identity
    }
}

impl PartialEq for TaxonomyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for TaxonomyEntry {}

impl Hash for TaxonomyEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl Display for TaxonomyEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A set of [TaxonomyEntry]s that keeps the insertion order.
#[derive(Clone, Debug, Default)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
    positions: FxHashMap<IdentityHash, usize>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `entry` and returns whether the taxonomy grew. An existing entry for the same
    /// relation is kept as it is.
    pub fn insert(&mut self, entry: TaxonomyEntry) -> bool {
        if self.positions.contains_key(&entry.identity) {
            return false;
        }
        self.positions.insert(entry.identity, self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn contains(&self, entry: &TaxonomyEntry) -> bool {
        self.positions.contains_key(&entry.identity)
    }

    /// Returns the stored entry for the relation of `entry`.
    pub fn get(&self, entry: &TaxonomyEntry) -> Option<&TaxonomyEntry> {
        self.positions
            .get(&entry.identity)
            .map(|position| &self.entries[*position])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaxonomyEntry> {
        self.entries.iter()
    }

    pub fn asserted(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.entries.iter().filter(|entry| !entry.inferred)
    }

    pub fn inferred(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.entries.iter().filter(|entry| entry.inferred)
    }
}

impl<'a> IntoIterator for &'a Taxonomy {
    type Item = &'a TaxonomyEntry;
    type IntoIter = std::slice::Iter<'a, TaxonomyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<TaxonomyEntry> for Taxonomy {
    fn extend<T: IntoIterator<Item = TaxonomyEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<TaxonomyEntry> for Taxonomy {
    fn from_iter<T: IntoIterator<Item = TaxonomyEntry>>(iter: T) -> Self {
        let mut taxonomy = Taxonomy::new();
        taxonomy.extend(iter);
        taxonomy
    }
}
