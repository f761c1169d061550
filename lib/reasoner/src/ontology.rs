use crate::error::ReasonerError;
use crate::report::{Evidence, EvidenceCategory};
use crate::taxonomy::{Taxonomy, TaxonomyEntry};
use ontoquad_model::vocab::{owl, rdf, rdfs};
use ontoquad_model::{
    Graph, Identified, IdentityHash, NamedNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef,
    Triple,
};
use tracing::debug;

/// The classes of an ontology and the relations between them.
#[derive(Clone, Debug, Default)]
pub struct ClassModel {
    pub(crate) declarations: Taxonomy,
    pub(crate) sub_class_of: Taxonomy,
    pub(crate) equivalent_class: Taxonomy,
    pub(crate) disjoint_with: Taxonomy,
}

impl ClassModel {
    pub fn declare_class(&mut self, class: impl Into<Subject>) -> bool {
        self.declarations
            .insert(TaxonomyEntry::new(class, rdf::TYPE, owl::CLASS.into_owned()))
    }

    pub fn add_sub_class_of(
        &mut self,
        class: impl Into<Subject>,
        super_class: impl Into<Term>,
    ) -> bool {
        self.sub_class_of
            .insert(TaxonomyEntry::new(class, rdfs::SUB_CLASS_OF, super_class))
    }

    pub fn add_equivalent_class(
        &mut self,
        class: impl Into<Subject>,
        other: impl Into<Term>,
    ) -> bool {
        self.equivalent_class
            .insert(TaxonomyEntry::new(class, owl::EQUIVALENT_CLASS, other))
    }

    pub fn add_disjoint_with(&mut self, class: impl Into<Subject>, other: impl Into<Term>) -> bool {
        self.disjoint_with
            .insert(TaxonomyEntry::new(class, owl::DISJOINT_WITH, other))
    }

    pub fn declarations(&self) -> &Taxonomy {
        &self.declarations
    }

    pub fn sub_class_of(&self) -> &Taxonomy {
        &self.sub_class_of
    }

    pub fn equivalent_class(&self) -> &Taxonomy {
        &self.equivalent_class
    }

    pub fn disjoint_with(&self) -> &Taxonomy {
        &self.disjoint_with
    }

    fn taxonomies(&self) -> [&Taxonomy; 4] {
        [
            &self.declarations,
            &self.sub_class_of,
            &self.equivalent_class,
            &self.disjoint_with,
        ]
    }
}

/// The properties of an ontology, their hierarchy, and their characteristics.
#[derive(Clone, Debug, Default)]
pub struct PropertyModel {
    pub(crate) declarations: Taxonomy,
    pub(crate) sub_property_of: Taxonomy,
    pub(crate) equivalent_property: Taxonomy,
    pub(crate) inverse_of: Taxonomy,
    pub(crate) domain: Taxonomy,
    pub(crate) range: Taxonomy,
    pub(crate) symmetric: Taxonomy,
    pub(crate) transitive: Taxonomy,
}

impl PropertyModel {
    pub fn declare_property(&mut self, property: NamedNodeRef<'_>) -> bool {
        self.declarations.insert(TaxonomyEntry::new(
            property.into_owned(),
            rdf::TYPE,
            owl::OBJECT_PROPERTY.into_owned(),
        ))
    }

    pub fn declare_symmetric(&mut self, property: NamedNodeRef<'_>) -> bool {
        self.symmetric.insert(TaxonomyEntry::new(
            property.into_owned(),
            rdf::TYPE,
            owl::SYMMETRIC_PROPERTY.into_owned(),
        ))
    }

    pub fn declare_transitive(&mut self, property: NamedNodeRef<'_>) -> bool {
        self.transitive.insert(TaxonomyEntry::new(
            property.into_owned(),
            rdf::TYPE,
            owl::TRANSITIVE_PROPERTY.into_owned(),
        ))
    }

    pub fn add_sub_property_of(
        &mut self,
        property: NamedNodeRef<'_>,
        super_property: NamedNodeRef<'_>,
    ) -> bool {
        self.sub_property_of.insert(TaxonomyEntry::new(
            property.into_owned(),
            rdfs::SUB_PROPERTY_OF,
            super_property.into_owned(),
        ))
    }

    pub fn add_equivalent_property(
        &mut self,
        property: NamedNodeRef<'_>,
        other: NamedNodeRef<'_>,
    ) -> bool {
        self.equivalent_property.insert(TaxonomyEntry::new(
            property.into_owned(),
            owl::EQUIVALENT_PROPERTY,
            other.into_owned(),
        ))
    }

    pub fn add_inverse_of(
        &mut self,
        property: NamedNodeRef<'_>,
        inverse: NamedNodeRef<'_>,
    ) -> bool {
        self.inverse_of.insert(TaxonomyEntry::new(
            property.into_owned(),
            owl::INVERSE_OF,
            inverse.into_owned(),
        ))
    }

    pub fn add_domain(&mut self, property: NamedNodeRef<'_>, class: impl Into<Term>) -> bool {
        self.domain
            .insert(TaxonomyEntry::new(property.into_owned(), rdfs::DOMAIN, class))
    }

    pub fn add_range(&mut self, property: NamedNodeRef<'_>, class: impl Into<Term>) -> bool {
        self.range
            .insert(TaxonomyEntry::new(property.into_owned(), rdfs::RANGE, class))
    }

    pub fn declarations(&self) -> &Taxonomy {
        &self.declarations
    }

    pub fn sub_property_of(&self) -> &Taxonomy {
        &self.sub_property_of
    }

    pub fn equivalent_property(&self) -> &Taxonomy {
        &self.equivalent_property
    }

    pub fn inverse_of(&self) -> &Taxonomy {
        &self.inverse_of
    }

    pub fn domain(&self) -> &Taxonomy {
        &self.domain
    }

    pub fn range(&self) -> &Taxonomy {
        &self.range
    }

    pub fn symmetric(&self) -> &Taxonomy {
        &self.symmetric
    }

    pub fn transitive(&self) -> &Taxonomy {
        &self.transitive
    }

    fn taxonomies(&self) -> [&Taxonomy; 8] {
        [
            &self.declarations,
            &self.sub_property_of,
            &self.equivalent_property,
            &self.inverse_of,
            &self.domain,
            &self.range,
            &self.symmetric,
            &self.transitive,
        ]
    }
}

/// The individuals of an ontology and the facts about them.
#[derive(Clone, Debug, Default)]
pub struct OntologyData {
    pub(crate) class_type: Taxonomy,
    pub(crate) same_as: Taxonomy,
    pub(crate) different_from: Taxonomy,
    pub(crate) assertions: Taxonomy,
}

impl OntologyData {
    pub fn add_class_type(
        &mut self,
        individual: impl Into<Subject>,
        class: impl Into<Term>,
    ) -> bool {
        self.class_type
            .insert(TaxonomyEntry::new(individual, rdf::TYPE, class))
    }

    pub fn add_same_as(&mut self, individual: impl Into<Subject>, other: impl Into<Term>) -> bool {
        self.same_as
            .insert(TaxonomyEntry::new(individual, owl::SAME_AS, other))
    }

    pub fn add_different_from(
        &mut self,
        individual: impl Into<Subject>,
        other: impl Into<Term>,
    ) -> bool {
        self.different_from
            .insert(TaxonomyEntry::new(individual, owl::DIFFERENT_FROM, other))
    }

    pub fn add_assertion(
        &mut self,
        subject: impl Into<Subject>,
        property: impl Into<NamedNode>,
        object: impl Into<Term>,
    ) -> bool {
        self.assertions
            .insert(TaxonomyEntry::new(subject, property, object))
    }

    pub fn class_type(&self) -> &Taxonomy {
        &self.class_type
    }

    pub fn same_as(&self) -> &Taxonomy {
        &self.same_as
    }

    pub fn different_from(&self) -> &Taxonomy {
        &self.different_from
    }

    pub fn assertions(&self) -> &Taxonomy {
        &self.assertions
    }

    fn taxonomies(&self) -> [&Taxonomy; 4] {
        [
            &self.class_type,
            &self.same_as,
            &self.different_from,
            &self.assertions,
        ]
    }
}

/// An ontology consisting of a class model, a property model, and data.
///
/// The identity of an ontology is derived from its name. A
/// [ValidationReport](crate::ValidationReport) and a [ReasoningReport](crate::ReasoningReport)
/// refer to an ontology by this identity.
#[derive(Clone, Debug)]
pub struct Ontology {
    name: NamedNode,
    annotations: Taxonomy,
    pub(crate) class_model: ClassModel,
    pub(crate) property_model: PropertyModel,
    pub(crate) data: OntologyData,
}

impl Ontology {
    pub fn new(name: impl Into<NamedNode>) -> Self {
        Self {
            name: name.into(),
            annotations: Taxonomy::new(),
            class_model: ClassModel::default(),
            property_model: PropertyModel::default(),
            data: OntologyData::default(),
        }
    }

    /// Builds an ontology from the triples of `graph`.
    ///
    /// The graph must declare exactly one `owl:Ontology`. Triples about the ontology itself become
    /// annotations. Every other triple is sorted into the class model, the property model, or the
    /// data based on its predicate.
    pub fn from_graph(graph: &Graph) -> Result<Self, ReasonerError> {
        let mut names = graph
            .subjects_for_predicate_object(rdf::TYPE, owl::ONTOLOGY)
            .filter_map(|subject| match subject {
                SubjectRef::NamedNode(name) => Some(name),
                SubjectRef::BlankNode(_) => None,
            });
        let name = names.next().ok_or(ReasonerError::MissingOntologyDeclaration)?;
        if names.next().is_some() {
            return Err(ReasonerError::AmbiguousOntologyDeclaration);
        }

        let mut ontology = Ontology::new(name);
        for triple in graph {
            let entry = TaxonomyEntry::new(
                triple.subject.into_owned(),
                triple.predicate.into_owned(),
                triple.object.into_owned(),
            );
            if triple.subject == SubjectRef::NamedNode(name) {
                if triple.predicate != rdf::TYPE || triple.object != TermRef::from(owl::ONTOLOGY) {
                    ontology.annotations.insert(entry);
                }
            } else {
                ontology.insert(entry);
            }
        }
        debug!(ontology = %ontology.name, entries = ontology.len(), "Built ontology from graph");
        Ok(ontology)
    }

    /// Exports the ontology into a graph. Inferred entries are only exported if `with_inferred`
    /// is set.
    pub fn to_graph(&self, with_inferred: bool) -> Graph {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(
            self.name.clone(),
            rdf::TYPE,
            owl::ONTOLOGY.into_owned(),
        ));
        for entry in self.annotations.iter().chain(self.entries()) {
            if with_inferred || !entry.is_inferred() {
                graph.insert(&entry.to_triple());
            }
        }
        graph
    }

    pub fn name(&self) -> &NamedNode {
        &self.name
    }

    pub fn annotations(&self) -> &Taxonomy {
        &self.annotations
    }

    pub fn class_model(&self) -> &ClassModel {
        &self.class_model
    }

    pub fn class_model_mut(&mut self) -> &mut ClassModel {
        &mut self.class_model
    }

    pub fn property_model(&self) -> &PropertyModel {
        &self.property_model
    }

    pub fn property_model_mut(&mut self) -> &mut PropertyModel {
        &mut self.property_model
    }

    pub fn data(&self) -> &OntologyData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut OntologyData {
        &mut self.data
    }

    /// Inserts `entry` into the taxonomy that holds relations of its kind. Returns whether the
    /// ontology grew.
    pub fn insert(&mut self, entry: TaxonomyEntry) -> bool {
        let (_, taxonomy) = self.taxonomy_for(&entry);
        taxonomy.insert(entry)
    }

    /// Inserts `entry` as an inferred entry. Returns an [Evidence] with the given provenance if the
    /// ontology grew.
    pub fn infer(&mut self, provenance: &str, entry: TaxonomyEntry) -> Option<Evidence> {
        let entry = entry.mark_inferred();
        let (category, taxonomy) = self.taxonomy_for(&entry);
        let before = taxonomy.len();
        taxonomy.insert(entry.clone());
        (taxonomy.len() > before).then(|| Evidence::new(category, provenance, entry))
    }

    pub fn contains(&self, entry: &TaxonomyEntry) -> bool {
        self.entries().any(|candidate| candidate == entry)
    }

    /// Iterates over the entries of the class model, the property model, and the data.
    pub fn entries(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.class_model
            .taxonomies()
            .into_iter()
            .chain(self.property_model.taxonomies())
            .chain(self.data.taxonomies())
            .flat_map(Taxonomy::iter)
    }

    /// The number of entries of the class model, the property model, and the data.
    pub fn len(&self) -> usize {
        self.class_model
            .taxonomies()
            .into_iter()
            .chain(self.property_model.taxonomies())
            .chain(self.data.taxonomies())
            .map(Taxonomy::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn taxonomy_for(&mut self, entry: &TaxonomyEntry) -> (EvidenceCategory, &mut Taxonomy) {
        let predicate = entry.predicate().as_ref();
        if predicate == rdf::TYPE {
            return self.type_taxonomy_for(entry.object());
        }

        if predicate == rdfs::SUB_CLASS_OF {
            (EvidenceCategory::ClassModel, &mut self.class_model.sub_class_of)
        } else if predicate == owl::EQUIVALENT_CLASS {
            (EvidenceCategory::ClassModel, &mut self.class_model.equivalent_class)
        } else if predicate == owl::DISJOINT_WITH {
            (EvidenceCategory::ClassModel, &mut self.class_model.disjoint_with)
        } else if predicate == rdfs::SUB_PROPERTY_OF {
            (EvidenceCategory::PropertyModel, &mut self.property_model.sub_property_of)
        } else if predicate == owl::EQUIVALENT_PROPERTY {
            (EvidenceCategory::PropertyModel, &mut self.property_model.equivalent_property)
        } else if predicate == owl::INVERSE_OF {
            (EvidenceCategory::PropertyModel, &mut self.property_model.inverse_of)
        } else if predicate == rdfs::DOMAIN {
            (EvidenceCategory::PropertyModel, &mut self.property_model.domain)
        } else if predicate == rdfs::RANGE {
            (EvidenceCategory::PropertyModel, &mut self.property_model.range)
        } else if predicate == owl::SAME_AS {
            (EvidenceCategory::Data, &mut self.data.same_as)
        } else if predicate == owl::DIFFERENT_FROM {
            (EvidenceCategory::Data, &mut self.data.different_from)
        } else {
            (EvidenceCategory::Data, &mut self.data.assertions)
        }
    }

    fn type_taxonomy_for(&mut self, class: &Term) -> (EvidenceCategory, &mut Taxonomy) {
        let Term::NamedNode(class) = class else {
            return (EvidenceCategory::Data, &mut self.data.class_type);
        };
        let class = class.as_ref();
        if class == owl::CLASS || class == rdfs::CLASS {
            (EvidenceCategory::ClassModel, &mut self.class_model.declarations)
        } else if class == owl::OBJECT_PROPERTY
            || class == owl::DATATYPE_PROPERTY
            || class == rdf::PROPERTY
        {
            (EvidenceCategory::PropertyModel, &mut self.property_model.declarations)
        } else if class == owl::SYMMETRIC_PROPERTY {
            (EvidenceCategory::PropertyModel, &mut self.property_model.symmetric)
        } else if class == owl::TRANSITIVE_PROPERTY {
            (EvidenceCategory::PropertyModel, &mut self.property_model.transitive)
        } else {
            (EvidenceCategory::Data, &mut self.data.class_type)
        }
    }
}

impl Identified for Ontology {
    fn identity(&self) -> IdentityHash {
        self.name.identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoquad_model::Literal;

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    #[test]
    fn entries_are_sorted_by_predicate() {
        let mut ontology = Ontology::new(ex("onto"));
        ontology.insert(TaxonomyEntry::new(ex("A"), rdfs::SUB_CLASS_OF, ex("B")));
        let transitive = owl::TRANSITIVE_PROPERTY.into_owned();
        ontology.insert(TaxonomyEntry::new(ex("p"), rdf::TYPE, transitive));
        ontology.insert(TaxonomyEntry::new(ex("a"), rdf::TYPE, ex("A")));
        ontology.insert(TaxonomyEntry::new(ex("a"), ex("p"), Literal::from("x")));

        assert_eq!(ontology.class_model().sub_class_of().len(), 1);
        assert_eq!(ontology.property_model().transitive().len(), 1);
        assert_eq!(ontology.data().class_type().len(), 1);
        assert_eq!(ontology.data().assertions().len(), 1);
        assert_eq!(ontology.len(), 4);
    }

    #[test]
    fn infer_reports_only_new_entries() {
        let mut ontology = Ontology::new(ex("onto"));
        ontology.data_mut().add_same_as(ex("a"), ex("b"));

        let known = TaxonomyEntry::new(ex("a"), owl::SAME_AS, ex("b"));
        assert_eq!(ontology.infer("test", known), None);

        let new = TaxonomyEntry::new(ex("b"), owl::SAME_AS, ex("a"));
        let evidence = ontology.infer("test", new).unwrap();
        assert_eq!(evidence.category(), EvidenceCategory::Data);
        assert!(evidence.entry().is_inferred());
        assert_eq!(ontology.data().same_as().len(), 2);
    }

    #[test]
    fn graph_round_trip_without_inferred_entries() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(ex("onto"), rdf::TYPE, owl::ONTOLOGY.into_owned()));
        graph.insert(&Triple::new(ex("onto"), rdfs::LABEL, Literal::from("Example")));
        graph.insert(&Triple::new(ex("A"), rdf::TYPE, owl::CLASS.into_owned()));
        graph.insert(&Triple::new(ex("A"), rdfs::SUB_CLASS_OF, ex("B")));
        graph.insert(&Triple::new(ex("a"), rdf::TYPE, ex("A")));

        let mut ontology = Ontology::from_graph(&graph).unwrap();
        assert_eq!(ontology.name(), &ex("onto"));
        assert_eq!(ontology.annotations().len(), 1);
        assert_eq!(ontology.class_model().declarations().len(), 1);

        ontology.infer("test", TaxonomyEntry::new(ex("a"), rdf::TYPE, ex("B")));
        assert_eq!(ontology.to_graph(false), graph);
        assert_eq!(ontology.to_graph(true).len(), graph.len() + 1);
    }

    #[test]
    fn graph_without_ontology_is_rejected() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(ex("A"), rdfs::SUB_CLASS_OF, ex("B")));
        assert_eq!(
            Ontology::from_graph(&graph).unwrap_err(),
            ReasonerError::MissingOntologyDeclaration
        );
    }
}
