use crate::{ex, reason};
use ontoquad_model::vocab::{owl, rdf, rdfs};
use ontoquad_model::{Graph, Literal, Triple};
use ontoquad_reasoner::{
    EvidenceCategory, Ontology, Reasoner, ReasonerError, ReasonerOptions, ReasonerRuleset,
    TaxonomyEntry, ValidationReport,
};

fn graph() -> Graph {
    let mut graph = Graph::new();
    graph.insert(&Triple::new(ex("zoo"), rdf::TYPE, owl::ONTOLOGY.into_owned()));
    graph.insert(&Triple::new(ex("zoo"), rdfs::COMMENT, Literal::from("A tiny zoo")));
    graph.insert(&Triple::new(ex("Lion"), rdfs::SUB_CLASS_OF, ex("Cat")));
    graph.insert(&Triple::new(ex("Cat"), rdfs::SUB_CLASS_OF, ex("Animal")));
    graph.insert(&Triple::new(ex("leo"), rdf::TYPE, ex("Lion")));
    graph
}

#[test]
fn test_reasoning_over_graph() {
    let mut ontology = Ontology::from_graph(&graph()).unwrap();
    let report = reason(&ontology, ReasonerOptions::default());

    assert_eq!(report.evidences_of(EvidenceCategory::ClassModel).len(), 1);
    assert_eq!(report.evidences_of(EvidenceCategory::Data).len(), 2);

    report.join_evidences(&mut ontology).unwrap();
    assert_eq!(ontology.to_graph(false), graph());

    let inferred = ontology.to_graph(true);
    assert_eq!(inferred.len(), graph().len() + 3);
    assert!(inferred.contains(&Triple::new(ex("leo"), rdf::TYPE, ex("Animal"))));
}

#[test]
fn test_validation_issues_do_not_stop_reasoning() {
    let mut ontology = Ontology::from_graph(&graph()).unwrap();
    ontology.class_model_mut().add_disjoint_with(ex("Lion"), ex("Cat"));

    let validation = ontology.validate();
    assert!(!validation.is_valid());

    let report = Reasoner::new(ReasonerRuleset::with_all_standard_rules())
        .apply(&ontology, &validation)
        .unwrap();
    assert!(!report.is_empty());
}

#[test]
fn test_validation_report_must_match_ontology() {
    let ontology = Ontology::from_graph(&graph()).unwrap();
    let other = Ontology::new(ex("other"));

    let result = Reasoner::default().apply(&ontology, &ValidationReport::new(&other));
    assert!(matches!(
        result,
        Err(ReasonerError::ValidationReportMismatch { .. })
    ));
}

#[test]
fn test_equivalent_properties_are_closed_symmetrically() {
    let mut ontology = Ontology::new(ex("properties"));
    let (p1, p2, p3) = (ex("p1"), ex("p2"), ex("p3"));
    let model = ontology.property_model_mut();
    model.add_equivalent_property(p1.as_ref(), p2.as_ref());
    model.add_equivalent_property(p2.as_ref(), p3.as_ref());

    let report = reason(&ontology, ReasonerOptions::default());
    assert_eq!(report.evidences_of(EvidenceCategory::PropertyModel).len(), 4);
    report.join_evidences(&mut ontology).unwrap();

    for (lhs, rhs) in [(&p2, &p1), (&p3, &p2), (&p1, &p3), (&p3, &p1)] {
        let entry = TaxonomyEntry::new(lhs.clone(), owl::EQUIVALENT_PROPERTY, rhs.clone());
        assert!(ontology.contains(&entry), "missing {lhs} equivalentProperty {rhs}");
    }
    let reflexive = TaxonomyEntry::new(p1.clone(), owl::EQUIVALENT_PROPERTY, p1);
    assert!(!ontology.contains(&reflexive));
}

#[test]
fn test_different_from_is_closed_symmetrically_over_aliases() {
    let mut ontology = Ontology::new(ex("people"));
    let (alice, bob, robert) = (ex("alice"), ex("bob"), ex("robert"));
    let data = ontology.data_mut();
    data.add_different_from(alice.clone(), bob.clone());
    data.add_same_as(bob.clone(), robert.clone());

    let report = reason(&ontology, ReasonerOptions::default());
    report.join_evidences(&mut ontology).unwrap();

    for (lhs, rhs) in [(&bob, &alice), (&alice, &robert), (&robert, &alice)] {
        let entry = TaxonomyEntry::new(lhs.clone(), owl::DIFFERENT_FROM, rhs.clone());
        assert!(ontology.contains(&entry), "missing {lhs} differentFrom {rhs}");
    }
    let unrelated = TaxonomyEntry::new(bob, owl::DIFFERENT_FROM, robert);
    assert!(!ontology.contains(&unrelated));
}
