use ontoquad_model::IdentityHash;
use rustc_hash::FxHashMap;

/// Maps identity hashes to their canonical term.
///
/// Each distinct term is held exactly once, no matter how many quads reference it.
#[derive(Debug, Clone)]
pub(crate) struct Register<T> {
    terms: FxHashMap<IdentityHash, T>,
}

impl<T> Default for Register<T> {
    fn default() -> Self {
        Self {
            terms: FxHashMap::default(),
        }
    }
}

impl<T> Register<T> {
    /// Registers `term` under `id` unless it is already known.
    pub fn register(&mut self, id: IdentityHash, term: impl FnOnce() -> T) {
        self.terms.entry(id).or_insert_with(term);
    }

    pub fn get(&self, id: IdentityHash) -> Option<&T> {
        self.terms.get(&id)
    }

    pub fn contains(&self, id: IdentityHash) -> bool {
        self.terms.contains_key(&id)
    }

    pub fn unregister(&mut self, id: IdentityHash) -> Option<T> {
        self.terms.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = IdentityHash> + '_ {
        self.terms.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.terms.values()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }
}
