use crate::store::QuadFlavor;
use ontoquad_model::IdentityHash;
use rustc_hash::{FxHashMap, FxHashSet};

/// A quad where every position is replaced by the identity of its term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EncodedQuad {
    pub context: IdentityHash,
    pub subject: IdentityHash,
    pub predicate: IdentityHash,
    pub object: IdentityHash,
    pub flavor: QuadFlavor,
}

impl EncodedQuad {
    /// Returns the index dimension and key of each position of the quad.
    pub fn keys(&self) -> [(IndexDimension, IdentityHash); 4] {
        let object_dimension = match self.flavor {
            QuadFlavor::Spo => IndexDimension::Object,
            QuadFlavor::Spl => IndexDimension::Literal,
        };
        [
            (IndexDimension::Context, self.context),
            (IndexDimension::Subject, self.subject),
            (IndexDimension::Predicate, self.predicate),
            (object_dimension, self.object),
        ]
    }
}

/// The position of a quad that an index covers. Resource objects and literal objects are kept
/// in separate dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum IndexDimension {
    Context,
    Subject,
    Predicate,
    Object,
    Literal,
}

impl IndexDimension {
    pub const ALL: [IndexDimension; 5] = [
        Self::Context,
        Self::Subject,
        Self::Predicate,
        Self::Object,
        Self::Literal,
    ];
}

type Postings = FxHashMap<IdentityHash, FxHashSet<IdentityHash>>;

/// Maps the identity of a term to the identities of all quads that hold the term in a given
/// position.
///
/// Empty sets are never kept, so a key is present iff at least one quad references the term in
/// that dimension.
#[derive(Debug, Clone, Default)]
pub(crate) struct QuadIndex {
    contexts: Postings,
    subjects: Postings,
    predicates: Postings,
    objects: Postings,
    literals: Postings,
}

impl QuadIndex {
    pub fn insert(&mut self, quad_id: IdentityHash, quad: &EncodedQuad) {
        for (dimension, key) in quad.keys() {
            self.postings_mut(dimension)
                .entry(key)
                .or_default()
                .insert(quad_id);
        }
    }

    pub fn remove(&mut self, quad_id: IdentityHash, quad: &EncodedQuad) {
        for (dimension, key) in quad.keys() {
            let postings = self.postings_mut(dimension);
            if let Some(quads) = postings.get_mut(&key) {
                quads.remove(&quad_id);
                if quads.is_empty() {
                    postings.remove(&key);
                }
            }
        }
    }

    /// Returns the quads that reference `key` in `dimension`.
    pub fn lookup(
        &self,
        dimension: IndexDimension,
        key: IdentityHash,
    ) -> Option<&FxHashSet<IdentityHash>> {
        self.postings(dimension).get(&key)
    }

    pub fn references(&self, dimension: IndexDimension, key: IdentityHash) -> bool {
        self.postings(dimension).contains_key(&key)
    }

    /// Iterates over all (key, quads) entries of `dimension`.
    pub fn entries(
        &self,
        dimension: IndexDimension,
    ) -> impl Iterator<Item = (IdentityHash, &FxHashSet<IdentityHash>)> {
        self.postings(dimension)
            .iter()
            .map(|(key, quads)| (*key, quads))
    }

    pub fn clear(&mut self) {
        for dimension in IndexDimension::ALL {
            self.postings_mut(dimension).clear();
        }
    }

    fn postings(&self, dimension: IndexDimension) -> &Postings {
        match dimension {
            IndexDimension::Context => &self.contexts,
            IndexDimension::Subject => &self.subjects,
            IndexDimension::Predicate => &self.predicates,
            IndexDimension::Object => &self.objects,
            IndexDimension::Literal => &self.literals,
        }
    }

    fn postings_mut(&mut self, dimension: IndexDimension) -> &mut Postings {
        match dimension {
            IndexDimension::Context => &mut self.contexts,
            IndexDimension::Subject => &mut self.subjects,
            IndexDimension::Predicate => &mut self.predicates,
            IndexDimension::Object => &mut self.objects,
            IndexDimension::Literal => &mut self.literals,
        }
    }
}
