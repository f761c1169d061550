use crate::error::StorageError;
use ontoquad_model::{
    Graph, GraphNameRef, NamedNodeRef, Quad, QuadRef, SubjectRef, TermRef, TripleRef,
};
use std::fmt::Debug;

/// A data source that can be queried with quad patterns.
///
/// Each argument restricts the corresponding position of the returned quads. [None] acts as a
/// wildcard. For the `graph_name`, [None] matches every graph (including the default graph) while
/// `Some(GraphNameRef::DefaultGraph)` matches only the default graph.
///
/// Implementations must not return duplicate quads.
pub trait QuadSource: Debug + Send + Sync {
    /// Returns all quads that match the given pattern.
    fn quads_for_pattern(
        &self,
        graph_name: Option<GraphNameRef<'_>>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError>;
}

/// Convenience functions for all [QuadSource]s.
pub trait QuadSourceExt: QuadSource {
    /// Returns all quads of the source.
    fn all_quads(&self) -> Result<Vec<Quad>, StorageError> {
        self.quads_for_pattern(None, None, None, None)
    }

    /// Returns whether the source contains `quad`.
    fn contains_quad(&self, quad: QuadRef<'_>) -> Result<bool, StorageError> {
        let quads = self.quads_for_pattern(
            Some(quad.graph_name),
            Some(quad.subject),
            Some(quad.predicate),
            Some(quad.object),
        )?;
        Ok(!quads.is_empty())
    }
}

impl<T: QuadSource + ?Sized> QuadSourceExt for T {}

/// A graph only has a default graph. Patterns restricted to a named graph match nothing.
impl QuadSource for Graph {
    fn quads_for_pattern(
        &self,
        graph_name: Option<GraphNameRef<'_>>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError> {
        if graph_name.is_some_and(|graph_name| !graph_name.is_default_graph()) {
            return Ok(Vec::new());
        }

        let candidates: Box<dyn Iterator<Item = TripleRef<'_>>> =
            match (subject, predicate, object) {
                (Some(subject), Some(predicate), _) => Box::new(
                    self.objects_for_subject_predicate(subject, predicate)
                        .map(move |object| TripleRef::new(subject, predicate, object)),
                ),
                (Some(subject), None, _) => Box::new(self.triples_for_subject(subject)),
                (None, _, Some(object)) => Box::new(self.triples_for_object(object)),
                (None, Some(predicate), None) => Box::new(self.triples_for_predicate(predicate)),
                (None, None, None) => Box::new(self.iter()),
            };

        Ok(candidates
            .filter(|triple| {
                subject.is_none_or(|subject| triple.subject == subject)
                    && predicate.is_none_or(|predicate| triple.predicate == predicate)
                    && object.is_none_or(|object| triple.object == object)
            })
            .map(|triple| triple.in_graph(GraphNameRef::DefaultGraph).into_owned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoquad_model::{GraphName, Literal, NamedNode, Triple};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn graph() -> Graph {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(ex("alice"), ex("knows"), ex("bob")));
        graph.insert(&Triple::new(ex("alice"), ex("name"), Literal::from("Alice")));
        graph.insert(&Triple::new(ex("bob"), ex("knows"), ex("carol")));
        graph
    }

    #[test]
    fn graph_matches_by_predicate() -> Result<(), StorageError> {
        let graph = graph();
        let knows = ex("knows");
        let quads = graph.quads_for_pattern(None, None, Some(knows.as_ref()), None)?;
        assert_eq!(quads.len(), 2);
        assert!(quads
            .iter()
            .all(|quad| quad.graph_name == GraphName::DefaultGraph));
        Ok(())
    }

    #[test]
    fn graph_matches_by_subject_and_object() -> Result<(), StorageError> {
        let graph = graph();
        let alice = ex("alice");
        let bob = ex("bob");
        let quads = graph.quads_for_pattern(
            None,
            Some(alice.as_ref().into()),
            None,
            Some(bob.as_ref().into()),
        )?;
        assert_eq!(
            quads,
            vec![Quad::new(
                alice,
                ex("knows"),
                bob,
                GraphName::DefaultGraph
            )]
        );
        Ok(())
    }

    #[test]
    fn graph_has_no_named_graphs() -> Result<(), StorageError> {
        let graph = graph();
        let context = ex("g");
        let quads = graph.quads_for_pattern(Some(context.as_ref().into()), None, None, None)?;
        assert!(quads.is_empty());
        assert_eq!(graph.all_quads()?.len(), 3);
        Ok(())
    }

    #[test]
    fn contains_quad_checks_all_positions() -> Result<(), StorageError> {
        let graph = graph();
        let quad = Quad::new(ex("bob"), ex("knows"), ex("carol"), GraphName::DefaultGraph);
        assert!(graph.contains_quad(quad.as_ref())?);
        let quad = Quad::new(ex("carol"), ex("knows"), ex("bob"), GraphName::DefaultGraph);
        assert!(!graph.contains_quad(quad.as_ref())?);
        Ok(())
    }
}
