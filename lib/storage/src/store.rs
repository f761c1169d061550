use crate::index::{EncodedQuad, IndexDimension, QuadIndex};
use crate::register::Register;
use ontoquad_common::error::{CorruptionError, StorageError};
use ontoquad_common::QuadSource;
use ontoquad_model::{
    term_to_subject, Graph, GraphName, GraphNameRef, IdentityHash, Identified, Literal,
    NamedNodeRef, Quad, QuadRef, SubjectRef, Term, TermRef, TripleRef,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

/// Distinguishes quads with a resource object from quads with a literal object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuadFlavor {
    /// Subject, predicate, and a resource (IRI or blank node) object.
    Spo,
    /// Subject, predicate, and a literal object.
    Spl,
}

impl QuadFlavor {
    pub fn of(quad: QuadRef<'_>) -> Self {
        match quad.object {
            TermRef::Literal(_) => Self::Spl,
            TermRef::NamedNode(_) | TermRef::BlankNode(_) => Self::Spo,
        }
    }
}

/// An in-memory quad store.
///
/// # Layout
///
/// Quads are kept in their encoded form, i.e., each position holds the [IdentityHash] of its
/// term. The terms themselves are held in three registers:
/// - *contexts*: the graph names (including the default graph),
/// - *resources*: IRIs and blank nodes used as subject, predicate, or object,
/// - *literals*: literals used as object.
///
/// For every position there is an index that maps a term identity to the identities of all quads
/// that hold this term in the position. Literal objects and resource objects are indexed
/// separately, resulting in five indexes in total.
///
/// A term is removed from its register as soon as no index references it anymore.
///
/// # Example
///
/// ```
/// use ontoquad_model::{GraphName, NamedNode, Quad};
/// use ontoquad_storage::MemQuadStore;
///
/// let ex = NamedNode::new("http://example.com")?;
/// let quad = Quad::new(ex.clone(), ex.clone(), ex.clone(), GraphName::DefaultGraph);
///
/// let mut store = MemQuadStore::new();
/// assert!(store.insert(&quad));
/// assert!(!store.insert(&quad));
/// assert_eq!(store.len(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemQuadStore {
    quads: FxHashMap<IdentityHash, EncodedQuad>,
    index: QuadIndex,
    contexts: Register<GraphName>,
    resources: Register<Term>,
    literals: Register<Literal>,
}

impl MemQuadStore {
    /// Creates a new empty [MemQuadStore].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new store that contains all triples of `graph` in the default graph.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut store = Self::new();
        store.extend(
            graph
                .iter()
                .map(|triple| triple.in_graph(GraphNameRef::DefaultGraph)),
        );
        store
    }

    /// Returns the number of quads.
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Inserts a quad. Returns `false` if the quad was already present.
    pub fn insert<'a>(&mut self, quad: impl Into<QuadRef<'a>>) -> bool {
        let quad = quad.into();
        let quad_id = quad.identity();
        if self.quads.contains_key(&quad_id) {
            return false;
        }

        let encoded = self.register_terms(quad);
        self.index.insert(quad_id, &encoded);
        self.quads.insert(quad_id, encoded);
        trace!(%quad_id, %quad, "Inserted quad");
        true
    }

    /// Inserts all `quads`. Returns the number of quads that were not present before.
    pub fn extend<'a>(
        &mut self,
        quads: impl IntoIterator<Item = impl Into<QuadRef<'a>>>,
    ) -> usize {
        let inserted = quads
            .into_iter()
            .map(|quad| self.insert(quad))
            .filter(|inserted| *inserted)
            .count();
        debug!(inserted, len = self.len(), "Extended store");
        inserted
    }

    /// Removes a quad. Returns `false` if the quad was not present.
    ///
    /// All indexes are updated and terms that are no longer referenced are removed from their
    /// register.
    pub fn remove<'a>(&mut self, quad: impl Into<QuadRef<'a>>) -> bool {
        let quad = quad.into();
        let quad_id = quad.identity();
        let Some(encoded) = self.quads.remove(&quad_id) else {
            return false;
        };

        self.index.remove(quad_id, &encoded);
        self.release_terms(&encoded);
        trace!(%quad_id, %quad, "Removed quad");
        true
    }

    pub fn contains<'a>(&self, quad: impl Into<QuadRef<'a>>) -> bool {
        self.quads.contains_key(&quad.into().identity())
    }

    /// Returns whether any quad references `term` as subject, predicate, or object.
    pub fn contains_term<'a>(&self, term: impl Into<TermRef<'a>>) -> bool {
        let term = term.into();
        let id = term.identity();
        match term {
            TermRef::Literal(_) => self.literals.contains(id),
            TermRef::NamedNode(_) | TermRef::BlankNode(_) => self.resources.contains(id),
        }
    }

    /// Returns the number of distinct terms held by the registers.
    pub fn term_count(&self) -> usize {
        self.contexts.len() + self.resources.len() + self.literals.len()
    }

    /// Removes all quads.
    pub fn clear(&mut self) {
        self.quads.clear();
        self.index.clear();
        self.contexts.clear();
        self.resources.clear();
        self.literals.clear();
        debug!("Cleared store");
    }

    /// Returns all quads of the store.
    pub fn quads(&self) -> Result<Vec<Quad>, StorageError> {
        self.quads
            .iter()
            .map(|(quad_id, encoded)| self.decode(*quad_id, encoded))
            .collect()
    }

    /// Returns the named graphs that hold at least one quad.
    pub fn named_graphs(&self) -> Vec<GraphName> {
        self.contexts
            .values()
            .filter(|graph_name| !graph_name.is_default_graph())
            .cloned()
            .collect()
    }

    /// Exports the quads of `graph_name` as a graph.
    pub fn graph<'a>(
        &self,
        graph_name: impl Into<GraphNameRef<'a>>,
    ) -> Result<Graph, StorageError> {
        let quads = self.quads_for_pattern(Some(graph_name.into()), None, None, None)?;
        let mut graph = Graph::new();
        for quad in &quads {
            graph.insert(TripleRef::from(quad.as_ref()));
        }
        Ok(graph)
    }

    /// Exports the default graph.
    pub fn to_graph(&self) -> Result<Graph, StorageError> {
        self.graph(GraphNameRef::DefaultGraph)
    }

    /// Checks that the indexes and the registers are consistent with the stored quads.
    ///
    /// Every quad must be referenced by exactly the index entries of its terms, every index entry
    /// must reference stored quads, and every registered term must be referenced by an index.
    pub fn validate(&self) -> Result<(), StorageError> {
        for (quad_id, encoded) in &self.quads {
            for (dimension, key) in encoded.keys() {
                let indexed = self
                    .index
                    .lookup(dimension, key)
                    .is_some_and(|quads| quads.contains(quad_id));
                if !indexed {
                    return Err(corruption(format!(
                        "Quad {quad_id} is missing from the {dimension:?} index"
                    )));
                }
                if !self.is_registered(dimension, key) {
                    return Err(corruption(format!(
                        "Term {key} of quad {quad_id} is not registered"
                    )));
                }
            }
        }

        for dimension in IndexDimension::ALL {
            for (key, quads) in self.index.entries(dimension) {
                if quads.is_empty() {
                    return Err(corruption(format!(
                        "The {dimension:?} index holds an empty entry for {key}"
                    )));
                }
                if let Some(quad_id) = quads.iter().find(|id| !self.quads.contains_key(*id)) {
                    return Err(corruption(format!(
                        "The {dimension:?} index references the unknown quad {quad_id}"
                    )));
                }
            }
        }

        let unreferenced = self
            .contexts
            .ids()
            .find(|id| !self.index.references(IndexDimension::Context, *id))
            .or_else(|| {
                self.resources
                    .ids()
                    .find(|id| !self.is_resource_referenced(*id))
            })
            .or_else(|| {
                self.literals
                    .ids()
                    .find(|id| !self.index.references(IndexDimension::Literal, *id))
            });
        match unreferenced {
            Some(id) => Err(corruption(format!("The term {id} is registered but unused"))),
            None => Ok(()),
        }
    }

    fn register_terms(&mut self, quad: QuadRef<'_>) -> EncodedQuad {
        let context = quad.graph_name.identity();
        self.contexts
            .register(context, || quad.graph_name.into_owned());

        let subject_term = TermRef::from(quad.subject);
        let subject = subject_term.identity();
        self.resources
            .register(subject, || subject_term.into_owned());

        let predicate_term = TermRef::from(quad.predicate);
        let predicate = predicate_term.identity();
        self.resources
            .register(predicate, || predicate_term.into_owned());

        let object = quad.object.identity();
        match quad.object {
            TermRef::Literal(literal) => self.literals.register(object, || literal.into_owned()),
            resource => self.resources.register(object, || resource.into_owned()),
        }

        EncodedQuad {
            context,
            subject,
            predicate,
            object,
            flavor: QuadFlavor::of(quad),
        }
    }

    fn release_terms(&mut self, encoded: &EncodedQuad) {
        for (dimension, key) in encoded.keys() {
            match dimension {
                IndexDimension::Context => {
                    if !self.index.references(IndexDimension::Context, key) {
                        self.contexts.unregister(key);
                    }
                }
                IndexDimension::Literal => {
                    if !self.index.references(IndexDimension::Literal, key) {
                        self.literals.unregister(key);
                    }
                }
                IndexDimension::Subject | IndexDimension::Predicate | IndexDimension::Object => {
                    if !self.is_resource_referenced(key) {
                        self.resources.unregister(key);
                    }
                }
            }
        }
    }

    fn is_resource_referenced(&self, key: IdentityHash) -> bool {
        self.index.references(IndexDimension::Subject, key)
            || self.index.references(IndexDimension::Predicate, key)
            || self.index.references(IndexDimension::Object, key)
    }

    fn is_registered(&self, dimension: IndexDimension, key: IdentityHash) -> bool {
        match dimension {
            IndexDimension::Context => self.contexts.contains(key),
            IndexDimension::Literal => self.literals.contains(key),
            IndexDimension::Subject | IndexDimension::Predicate | IndexDimension::Object => {
                self.resources.contains(key)
            }
        }
    }

    /// Returns the identities of the quads that match all `keys`.
    ///
    /// The index sets are intersected starting from the smallest one.
    fn matching_quad_ids(&self, keys: &[(IndexDimension, IdentityHash)]) -> Vec<IdentityHash> {
        let mut candidates: Vec<&FxHashSet<IdentityHash>> = Vec::with_capacity(keys.len());
        for (dimension, key) in keys {
            match self.index.lookup(*dimension, *key) {
                Some(quads) => candidates.push(quads),
                None => return Vec::new(),
            }
        }

        candidates.sort_by_key(|quads| quads.len());
        match candidates.split_first() {
            None => self.quads.keys().copied().collect(),
            Some((smallest, rest)) => smallest
                .iter()
                .filter(|quad_id| rest.iter().all(|quads| quads.contains(*quad_id)))
                .copied()
                .collect(),
        }
    }

    fn decode(&self, quad_id: IdentityHash, encoded: &EncodedQuad) -> Result<Quad, StorageError> {
        let graph_name = self
            .contexts
            .get(encoded.context)
            .ok_or_else(|| unknown_term(quad_id, encoded.context))?
            .clone();
        let subject = self
            .resources
            .get(encoded.subject)
            .cloned()
            .and_then(term_to_subject)
            .ok_or_else(|| unknown_term(quad_id, encoded.subject))?;
        let predicate = match self.resources.get(encoded.predicate) {
            Some(Term::NamedNode(predicate)) => predicate.clone(),
            _ => return Err(unknown_term(quad_id, encoded.predicate)),
        };
        let object = match encoded.flavor {
            QuadFlavor::Spo => self.resources.get(encoded.object).cloned(),
            QuadFlavor::Spl => self.literals.get(encoded.object).cloned().map(Term::from),
        }
        .ok_or_else(|| unknown_term(quad_id, encoded.object))?;

        Ok(Quad::new(subject, predicate, object, graph_name))
    }
}

impl QuadSource for MemQuadStore {
    fn quads_for_pattern(
        &self,
        graph_name: Option<GraphNameRef<'_>>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError> {
        let mut keys = Vec::with_capacity(4);
        if let Some(graph_name) = graph_name {
            keys.push((IndexDimension::Context, graph_name.identity()));
        }
        if let Some(subject) = subject {
            keys.push((IndexDimension::Subject, TermRef::from(subject).identity()));
        }
        if let Some(predicate) = predicate {
            keys.push((IndexDimension::Predicate, TermRef::from(predicate).identity()));
        }
        if let Some(object) = object {
            let dimension = match object {
                TermRef::Literal(_) => IndexDimension::Literal,
                TermRef::NamedNode(_) | TermRef::BlankNode(_) => IndexDimension::Object,
            };
            keys.push((dimension, object.identity()));
        }

        let quad_ids = self.matching_quad_ids(&keys);
        trace!(constraints = keys.len(), matches = quad_ids.len(), "Scanned store");
        quad_ids
            .into_iter()
            .map(|quad_id| {
                let encoded = self.quads.get(&quad_id).ok_or_else(|| {
                    corruption(format!("The quad {quad_id} is indexed but unknown"))
                })?;
                self.decode(quad_id, encoded)
            })
            .collect()
    }
}

fn corruption(msg: String) -> StorageError {
    CorruptionError::msg(msg).into()
}

fn unknown_term(quad_id: IdentityHash, term: IdentityHash) -> StorageError {
    corruption(format!("The term {term} of quad {quad_id} is not registered"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoquad_model::NamedNode;

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn quad(s: &str, p: &str, o: impl Into<Term>, g: Option<&str>) -> Quad {
        let graph_name = g.map_or(GraphName::DefaultGraph, |g| ex(g).into());
        Quad::new(ex(s), ex(p), o, graph_name)
    }

    #[test]
    fn removing_last_reference_unregisters_terms() {
        let mut store = MemQuadStore::new();
        let first = quad("alice", "knows", ex("bob"), None);
        let second = quad("alice", "name", Literal::from("Alice"), Some("g"));
        store.insert(&first);
        store.insert(&second);
        assert!(store.contains_term(Literal::from("Alice").as_ref()));
        assert!(store.validate().is_ok());

        assert!(store.remove(&second));
        assert!(!store.contains_term(Literal::from("Alice").as_ref()));
        assert!(!store.contains_term(ex("name").as_ref()));
        assert!(store.contains_term(ex("alice").as_ref()));
        assert!(store.named_graphs().is_empty());
        assert!(store.validate().is_ok());

        assert!(store.remove(&first));
        assert_eq!(store.term_count(), 0);
        assert!(store.validate().is_ok());
    }

    #[test]
    fn shared_resources_survive_partial_removal() {
        let mut store = MemQuadStore::new();
        let first = quad("alice", "knows", ex("bob"), None);
        let second = quad("bob", "knows", ex("carol"), None);
        store.insert(&first);
        store.insert(&second);

        store.remove(&first);
        assert!(store.contains_term(ex("bob").as_ref()));
        assert!(store.contains_term(ex("knows").as_ref()));
        assert!(!store.contains_term(ex("alice").as_ref()));
        assert!(store.validate().is_ok());
    }

    #[test]
    fn pattern_lookup_intersects_indexes() -> Result<(), StorageError> {
        let mut store = MemQuadStore::new();
        store.insert(&quad("alice", "knows", ex("bob"), None));
        store.insert(&quad("alice", "knows", ex("carol"), Some("g")));
        store.insert(&quad("bob", "knows", ex("carol"), None));

        let alice = ex("alice");
        let carol = ex("carol");
        let quads = store.quads_for_pattern(
            None,
            Some(alice.as_ref().into()),
            None,
            Some(carol.as_ref().into()),
        )?;
        assert_eq!(quads, vec![quad("alice", "knows", ex("carol"), Some("g"))]);

        let quads = store.quads_for_pattern(
            Some(GraphNameRef::DefaultGraph),
            None,
            None,
            Some(carol.as_ref().into()),
        )?;
        assert_eq!(quads, vec![quad("bob", "knows", ex("carol"), None)]);
        Ok(())
    }

    #[test]
    fn literal_and_resource_objects_do_not_collide() -> Result<(), StorageError> {
        let mut store = MemQuadStore::new();
        store.insert(&quad("a", "p", ex("o"), None));
        store.insert(&quad("a", "p", Literal::from("<http://example.com/o>"), None));

        let o = ex("o");
        let quads = store.quads_for_pattern(None, None, None, Some(o.as_ref().into()))?;
        assert_eq!(quads.len(), 1);
        assert_eq!(QuadFlavor::of(quads[0].as_ref()), QuadFlavor::Spo);
        Ok(())
    }
}
