//! The standard entailment rules.
//!
//! Every rule scans the current state of an ontology and inserts the entries it derives. An
//! [Evidence] is only recorded for entries that were not yet part of the ontology, so applying a
//! rule twice to the same state yields no evidence the second time.

use crate::ontology::Ontology;
use crate::report::{Evidence, EvidenceCategory};
use crate::taxonomy::{Taxonomy, TaxonomyEntry};
use itertools::Itertools;
use ontoquad_model::vocab::{owl, rdf, rdfs};
use ontoquad_model::{term_to_subject, NamedNode, NamedNodeRef, Subject, Term};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{Display, Formatter};

/// The entailment rules shipped with the reasoner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StandardRule {
    EquivalentClassTransitivity,
    SubClassTransitivity,
    DisjointWithEntailment,
    EquivalentPropertyTransitivity,
    SubPropertyTransitivity,
    SameAsTransitivity,
    DifferentFromEntailment,
    ClassTypeEntailment,
    DomainEntailment,
    RangeEntailment,
    InverseOfEntailment,
    SymmetricPropertyEntailment,
    TransitivePropertyEntailment,
    PropertyEntailment,
    SameAsEntailment,
}

impl StandardRule {
    pub const ALL: [StandardRule; 15] = [
        StandardRule::EquivalentClassTransitivity,
        StandardRule::SubClassTransitivity,
        StandardRule::DisjointWithEntailment,
        StandardRule::EquivalentPropertyTransitivity,
        StandardRule::SubPropertyTransitivity,
        StandardRule::SameAsTransitivity,
        StandardRule::DifferentFromEntailment,
        StandardRule::ClassTypeEntailment,
        StandardRule::DomainEntailment,
        StandardRule::RangeEntailment,
        StandardRule::InverseOfEntailment,
        StandardRule::SymmetricPropertyEntailment,
        StandardRule::TransitivePropertyEntailment,
        StandardRule::PropertyEntailment,
        StandardRule::SameAsEntailment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StandardRule::EquivalentClassTransitivity => "EquivalentClassTransitivity",
            StandardRule::SubClassTransitivity => "SubClassTransitivity",
            StandardRule::DisjointWithEntailment => "DisjointWithEntailment",
            StandardRule::EquivalentPropertyTransitivity => "EquivalentPropertyTransitivity",
            StandardRule::SubPropertyTransitivity => "SubPropertyTransitivity",
            StandardRule::SameAsTransitivity => "SameAsTransitivity",
            StandardRule::DifferentFromEntailment => "DifferentFromEntailment",
            StandardRule::ClassTypeEntailment => "ClassTypeEntailment",
            StandardRule::DomainEntailment => "DomainEntailment",
            StandardRule::RangeEntailment => "RangeEntailment",
            StandardRule::InverseOfEntailment => "InverseOfEntailment",
            StandardRule::SymmetricPropertyEntailment => "SymmetricPropertyEntailment",
            StandardRule::TransitivePropertyEntailment => "TransitivePropertyEntailment",
            StandardRule::PropertyEntailment => "PropertyEntailment",
            StandardRule::SameAsEntailment => "SameAsEntailment",
        }
    }

    /// The part of the ontology this rule adds entries to.
    pub fn category(self) -> EvidenceCategory {
        match self {
            StandardRule::EquivalentClassTransitivity
            | StandardRule::SubClassTransitivity
            | StandardRule::DisjointWithEntailment => EvidenceCategory::ClassModel,
            StandardRule::EquivalentPropertyTransitivity
            | StandardRule::SubPropertyTransitivity => EvidenceCategory::PropertyModel,
            _ => EvidenceCategory::Data,
        }
    }

    /// Applies the rule to `ontology` and returns the evidences of all new entries.
    pub fn apply(self, ontology: &mut Ontology) -> Vec<Evidence> {
        let function: fn(&mut Ontology) -> Vec<Evidence> = match self {
            StandardRule::EquivalentClassTransitivity => equivalent_class_transitivity,
            StandardRule::SubClassTransitivity => sub_class_transitivity,
            StandardRule::DisjointWithEntailment => disjoint_with_entailment,
            StandardRule::EquivalentPropertyTransitivity => equivalent_property_transitivity,
            StandardRule::SubPropertyTransitivity => sub_property_transitivity,
            StandardRule::SameAsTransitivity => same_as_transitivity,
            StandardRule::DifferentFromEntailment => different_from_entailment,
            StandardRule::ClassTypeEntailment => class_type_entailment,
            StandardRule::DomainEntailment => domain_entailment,
            StandardRule::RangeEntailment => range_entailment,
            StandardRule::InverseOfEntailment => inverse_of_entailment,
            StandardRule::SymmetricPropertyEntailment => symmetric_property_entailment,
            StandardRule::TransitivePropertyEntailment => transitive_property_entailment,
            StandardRule::PropertyEntailment => property_entailment,
            StandardRule::SameAsEntailment => same_as_entailment,
        };
        function(ontology)
    }
}

impl Display for StandardRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//
// Class model
//

fn equivalent_class_transitivity(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::EquivalentClassTransitivity);
    equivalence_closure(
        &mut ontology.class_model.equivalent_class,
        owl::EQUIVALENT_CLASS,
        &mut inferences,
    );
    inferences.finish()
}

fn sub_class_transitivity(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::SubClassTransitivity);
    let model = &mut ontology.class_model;
    hierarchy_closure(
        &mut model.sub_class_of,
        &model.equivalent_class,
        rdfs::SUB_CLASS_OF,
        &mut inferences,
    );
    inferences.finish()
}

/// A class is disjoint with the equivalent classes and subclasses of the classes it is disjoint
/// with. The same holds for its own equivalent classes and subclasses.
fn disjoint_with_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::DisjointWithEntailment);
    let model = &mut ontology.class_model;
    let hierarchy = Hierarchy::new(&model.sub_class_of, &model.equivalent_class);

    for (class, other) in pairs(&model.disjoint_with) {
        let left = hierarchy.self_equivalents_and_subs(&class);
        let right = hierarchy.self_equivalents_and_subs(&other);
        for lhs in &left {
            for rhs in &right {
                inferences.add_symmetric(
                    &mut model.disjoint_with,
                    lhs,
                    owl::DISJOINT_WITH,
                    rhs,
                );
            }
        }
    }
    inferences.finish()
}

//
// Property model
//

fn equivalent_property_transitivity(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::EquivalentPropertyTransitivity);
    equivalence_closure(
        &mut ontology.property_model.equivalent_property,
        owl::EQUIVALENT_PROPERTY,
        &mut inferences,
    );
    inferences.finish()
}

fn sub_property_transitivity(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::SubPropertyTransitivity);
    let model = &mut ontology.property_model;
    hierarchy_closure(
        &mut model.sub_property_of,
        &model.equivalent_property,
        rdfs::SUB_PROPERTY_OF,
        &mut inferences,
    );
    inferences.finish()
}

//
// Data
//

fn same_as_transitivity(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::SameAsTransitivity);
    equivalence_closure(&mut ontology.data.same_as, owl::SAME_AS, &mut inferences);
    inferences.finish()
}

/// Individuals that are different from each other are also different from their aliases.
fn different_from_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::DifferentFromEntailment);
    let data = &mut ontology.data;
    let aliases = Edges::symmetric(&data.same_as);

    for (individual, other) in pairs(&data.different_from) {
        let left = with_start(&individual, reachable(&[&aliases], [&individual]));
        let right = with_start(&other, reachable(&[&aliases], [&other]));
        for lhs in &left {
            for rhs in &right {
                inferences.add_symmetric(
                    &mut data.different_from,
                    lhs,
                    owl::DIFFERENT_FROM,
                    rhs,
                );
            }
        }
    }
    inferences.finish()
}

/// An individual of a class is an individual of the equivalent classes and superclasses.
fn class_type_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::ClassTypeEntailment);
    let hierarchy = Hierarchy::new(
        &ontology.class_model.sub_class_of,
        &ontology.class_model.equivalent_class,
    );

    let class_type = &mut ontology.data.class_type;
    for (individual, class) in pairs(class_type) {
        let mut classes = hierarchy.equivalents(&class);
        classes.extend(hierarchy.supers(&class));
        for class in classes {
            inferences.add(class_type, &individual, rdf::TYPE, class);
        }
    }
    inferences.finish()
}

fn domain_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::DomainEntailment);
    let restrictions = PropertyRestrictions::new(ontology, &ontology.property_model.domain);

    for entry in &ontology.data.assertions {
        let subject = Term::from(entry.subject().clone());
        for class in restrictions.classes_of(entry.predicate()) {
            inferences.add(&mut ontology.data.class_type, &subject, rdf::TYPE, class.clone());
        }
    }
    inferences.finish()
}

fn range_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::RangeEntailment);
    let restrictions = PropertyRestrictions::new(ontology, &ontology.property_model.range);

    for entry in &ontology.data.assertions {
        if matches!(entry.object(), Term::Literal(_)) {
            continue;
        }
        for class in restrictions.classes_of(entry.predicate()) {
            inferences.add(
                &mut ontology.data.class_type,
                entry.object(),
                rdf::TYPE,
                class.clone(),
            );
        }
    }
    inferences.finish()
}

//
// Fixpoint rules on the assertions
//

fn inverse_of_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::InverseOfEntailment);
    let mut inverses: FxHashMap<NamedNode, Vec<NamedNode>> = FxHashMap::default();
    for entry in &ontology.property_model.inverse_of {
        let (Subject::NamedNode(property), Term::NamedNode(inverse)) =
            (entry.subject(), entry.object())
        else {
            continue;
        };
        inverses
            .entry(property.clone())
            .or_default()
            .push(inverse.clone());
        inverses
            .entry(inverse.clone())
            .or_default()
            .push(property.clone());
    }

    let assertions = &mut ontology.data.assertions;
    for entry in snapshot(assertions) {
        let Some(inverses) = inverses.get(entry.predicate()) else {
            continue;
        };
        let subject = Term::from(entry.subject().clone());
        for inverse in inverses {
            inferences.add(assertions, entry.object(), inverse.as_ref(), subject.clone());
        }
    }
    inferences.finish()
}

fn symmetric_property_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::SymmetricPropertyEntailment);
    let symmetric = named_subjects(&ontology.property_model.symmetric);

    let assertions = &mut ontology.data.assertions;
    for entry in snapshot(assertions) {
        if symmetric.contains(entry.predicate()) {
            let subject = Term::from(entry.subject().clone());
            inferences.add(assertions, entry.object(), entry.predicate().as_ref(), subject);
        }
    }
    inferences.finish()
}

/// Computes the closure of every transitive property. A cycle relates each of its members to
/// itself.
fn transitive_property_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::TransitivePropertyEntailment);
    let transitive = named_subjects(&ontology.property_model.transitive);

    let assertions = &mut ontology.data.assertions;
    for property in &transitive {
        let mut edges = Edges::default();
        for entry in assertions.iter().filter(|entry| entry.predicate() == property) {
            edges.add(Term::from(entry.subject().clone()), entry.object().clone());
        }
        for node in edges.nodes() {
            let successors = edges.successors(&node);
            for reached in reachable(&[&edges], successors) {
                inferences.add(assertions, &node, property.as_ref(), reached);
            }
        }
    }
    inferences.finish()
}

/// Assertions of a property hold for its equivalent properties and superproperties.
fn property_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::PropertyEntailment);
    let hierarchy = Hierarchy::new(
        &ontology.property_model.sub_property_of,
        &ontology.property_model.equivalent_property,
    );

    let assertions = &mut ontology.data.assertions;
    for entry in snapshot(assertions) {
        let property = Term::from(entry.predicate().clone());
        let mut related = hierarchy.equivalents(&property);
        related.extend(hierarchy.supers(&property));
        let subject = Term::from(entry.subject().clone());
        for related in related {
            if let Term::NamedNode(related) = related {
                inferences.add(assertions, &subject, related.as_ref(), entry.object().clone());
            }
        }
    }
    inferences.finish()
}

/// Assertions about an individual hold for all of its aliases.
fn same_as_entailment(ontology: &mut Ontology) -> Vec<Evidence> {
    let mut inferences = Inferences::new(StandardRule::SameAsEntailment);
    let aliases = Edges::symmetric(&ontology.data.same_as);

    let assertions = &mut ontology.data.assertions;
    for entry in snapshot(assertions) {
        let subject = Term::from(entry.subject().clone());
        let subjects = with_start(&subject, reachable(&[&aliases], [&subject]));
        let objects = with_start(entry.object(), reachable(&[&aliases], [entry.object()]));
        for alias in &subjects {
            for object in &objects {
                inferences.add(assertions, alias, entry.predicate().as_ref(), object.clone());
            }
        }
    }
    inferences.finish()
}

//
// Helpers
//

/// Collects the evidences of a single rule application.
struct Inferences {
    rule: StandardRule,
    evidences: Vec<Evidence>,
}

impl Inferences {
    fn new(rule: StandardRule) -> Self {
        Self {
            rule,
            evidences: Vec::new(),
        }
    }

    /// Inserts `subject predicate object` into `taxonomy`. An evidence is only recorded if the
    /// taxonomy grew. Literal subjects cannot form an entry and are skipped.
    fn add(
        &mut self,
        taxonomy: &mut Taxonomy,
        subject: &Term,
        predicate: NamedNodeRef<'_>,
        object: Term,
    ) {
        let Some(subject) = term_to_subject(subject.clone()) else {
            return;
        };
        let entry = TaxonomyEntry::new(subject, predicate, object).mark_inferred();
        let before = taxonomy.len();
        taxonomy.insert(entry.clone());
        if taxonomy.len() > before {
            self.evidences
                .push(Evidence::new(self.rule.category(), self.rule.name(), entry));
        }
    }

    /// Inserts the relation in both directions. Reflexive relations are skipped.
    fn add_symmetric(
        &mut self,
        taxonomy: &mut Taxonomy,
        lhs: &Term,
        predicate: NamedNodeRef<'_>,
        rhs: &Term,
    ) {
        if lhs == rhs {
            return;
        }
        self.add(taxonomy, lhs, predicate, rhs.clone());
        self.add(taxonomy, rhs, predicate, lhs.clone());
    }

    fn finish(self) -> Vec<Evidence> {
        self.evidences
    }
}

/// Relates every member of an equivalence class with every other member.
fn equivalence_closure(
    taxonomy: &mut Taxonomy,
    predicate: NamedNodeRef<'_>,
    inferences: &mut Inferences,
) {
    let edges = Edges::symmetric(taxonomy);
    for node in edges.nodes() {
        for other in reachable(&[&edges], [&node]) {
            inferences.add_symmetric(taxonomy, &node, predicate, &other);
        }
    }
}

/// Relates every node with all of its superclasses (or superproperties), including those reached
/// through equivalences.
fn hierarchy_closure(
    taxonomy: &mut Taxonomy,
    equivalences: &Taxonomy,
    predicate: NamedNodeRef<'_>,
    inferences: &mut Inferences,
) {
    let hierarchy = Hierarchy::new(taxonomy, equivalences);
    for node in hierarchy.up.nodes() {
        for reached in hierarchy.supers(&node) {
            if reached != node {
                inferences.add(taxonomy, &node, predicate, reached);
            }
        }
    }
}

/// The `(subject, object)` pairs of a taxonomy, copied so that the taxonomy can be extended
/// while iterating.
fn pairs(taxonomy: &Taxonomy) -> Vec<(Term, Term)> {
    taxonomy
        .iter()
        .map(|entry| (Term::from(entry.subject().clone()), entry.object().clone()))
        .collect()
}

fn snapshot(taxonomy: &Taxonomy) -> Vec<TaxonomyEntry> {
    taxonomy.iter().cloned().collect()
}

fn named_subjects(taxonomy: &Taxonomy) -> Vec<NamedNode> {
    taxonomy
        .iter()
        .filter_map(|entry| match entry.subject() {
            Subject::NamedNode(node) => Some(node.clone()),
            Subject::BlankNode(_) => None,
        })
        .unique()
        .collect()
}

fn with_start(start: &Term, mut reached: Vec<Term>) -> Vec<Term> {
    if !reached.contains(start) {
        reached.insert(0, start.clone());
    }
    reached
}

/// A directed graph over terms. Nodes and successors keep their insertion order.
#[derive(Default)]
struct Edges {
    nodes: Vec<Term>,
    successors: FxHashMap<Term, Vec<Term>>,
}

impl Edges {
    fn forward(taxonomy: &Taxonomy) -> Self {
        let mut edges = Self::default();
        for (subject, object) in pairs(taxonomy) {
            edges.add(subject, object);
        }
        edges
    }

    fn backward(taxonomy: &Taxonomy) -> Self {
        let mut edges = Self::default();
        for (subject, object) in pairs(taxonomy) {
            edges.add(object, subject);
        }
        edges
    }

    fn symmetric(taxonomy: &Taxonomy) -> Self {
        let mut edges = Self::default();
        for (subject, object) in pairs(taxonomy) {
            edges.add(subject.clone(), object.clone());
            edges.add(object, subject);
        }
        edges
    }

    fn add(&mut self, from: Term, to: Term) {
        if !self.successors.contains_key(&from) {
            self.nodes.push(from.clone());
        }
        let successors = self.successors.entry(from).or_default();
        if !successors.contains(&to) {
            successors.push(to);
        }
    }

    fn nodes(&self) -> Vec<Term> {
        self.nodes.clone()
    }

    fn successors(&self, node: &Term) -> &[Term] {
        self.successors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Returns the nodes reachable from `starts` in the union of `graphs`. The start nodes are only
/// part of the result if they can be reached through an edge.
fn reachable<'a>(graphs: &[&Edges], starts: impl IntoIterator<Item = &'a Term>) -> Vec<Term> {
    let mut visited = FxHashSet::default();
    let mut result = Vec::new();
    let mut stack = Vec::new();
    for start in starts {
        for graph in graphs {
            stack.extend(graph.successors(start).iter().rev());
        }
    }

    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        result.push(node.clone());
        for graph in graphs {
            stack.extend(graph.successors(node).iter().rev());
        }
    }
    result
}

/// A hierarchy of classes or properties with equivalences.
struct Hierarchy {
    up: Edges,
    down: Edges,
    equivalent: Edges,
}

impl Hierarchy {
    fn new(sub: &Taxonomy, equivalent: &Taxonomy) -> Self {
        Self {
            up: Edges::forward(sub),
            down: Edges::backward(sub),
            equivalent: Edges::symmetric(equivalent),
        }
    }

    fn equivalents(&self, node: &Term) -> Vec<Term> {
        reachable(&[&self.equivalent], [node])
            .into_iter()
            .filter(|other| other != node)
            .collect()
    }

    /// The nodes reached by at least one step up, possibly mixed with equivalences.
    fn supers(&self, node: &Term) -> Vec<Term> {
        self.directed(&self.up, node)
    }

    fn subs(&self, node: &Term) -> Vec<Term> {
        self.directed(&self.down, node)
    }

    fn self_equivalents_and_subs(&self, node: &Term) -> Vec<Term> {
        let mut result = with_start(node, self.equivalents(node));
        for sub in self.subs(node) {
            if !result.contains(&sub) {
                result.push(sub);
            }
        }
        result
    }

    fn directed(&self, direction: &Edges, node: &Term) -> Vec<Term> {
        let starts = with_start(node, self.equivalents(node));
        let first_steps = starts
            .iter()
            .flat_map(|start| direction.successors(start))
            .cloned()
            .collect::<Vec<_>>();
        let mut result = first_steps.clone();
        for reached in reachable(&[direction, &self.equivalent], &first_steps) {
            if !result.contains(&reached) {
                result.push(reached);
            }
        }
        result
    }
}

/// Maps properties to the classes of their domain or range, taking the property hierarchy into
/// account.
struct PropertyRestrictions {
    hierarchy: Hierarchy,
    classes: FxHashMap<Term, Vec<Term>>,
}

impl PropertyRestrictions {
    fn new(ontology: &Ontology, restrictions: &Taxonomy) -> Self {
        let mut classes: FxHashMap<Term, Vec<Term>> = FxHashMap::default();
        for (property, class) in pairs(restrictions) {
            classes.entry(property).or_default().push(class);
        }
        Self {
            hierarchy: Hierarchy::new(
                &ontology.property_model.sub_property_of,
                &ontology.property_model.equivalent_property,
            ),
            classes,
        }
    }

    fn classes_of(&self, property: &NamedNode) -> Vec<&Term> {
        let property = Term::from(property.clone());
        let mut properties = with_start(&property, self.hierarchy.equivalents(&property));
        properties.extend(self.hierarchy.supers(&property));
        properties
            .iter()
            .filter_map(|property| self.classes.get(property))
            .flatten()
            .collect()
    }
}
