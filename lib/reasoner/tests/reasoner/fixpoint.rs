use crate::{ex, reason, sorted_evidences};
use insta::assert_snapshot;
use ontoquad_model::vocab::{owl, rdf};
use ontoquad_model::Term;
use ontoquad_reasoner::{
    CustomRule, Evidence, Ontology, Reasoner, ReasonerOptions, ReasonerRuleset, TaxonomyEntry,
    MAX_FIXPOINT_PASSES,
};
use std::sync::Arc;

fn family() -> Ontology {
    let mut ontology = Ontology::new(ex("family"));
    let classes = ontology.class_model_mut();
    classes.add_sub_class_of(ex("Mother"), ex("Woman"));
    classes.add_sub_class_of(ex("Woman"), ex("Person"));

    let properties = ontology.property_model_mut();
    properties.add_sub_property_of(ex("hasMother").as_ref(), ex("hasParent").as_ref());
    properties.add_inverse_of(ex("hasParent").as_ref(), ex("hasChild").as_ref());
    properties.add_domain(ex("hasParent").as_ref(), ex("Person"));
    properties.declare_symmetric(ex("hasSibling").as_ref());

    let data = ontology.data_mut();
    data.add_assertion(ex("alice"), ex("hasMother"), ex("carol"));
    data.add_assertion(ex("alice"), ex("hasSibling"), ex("bob"));
    ontology
}

fn cycle() -> Ontology {
    let mut ontology = Ontology::new(ex("cycle"));
    ontology
        .property_model_mut()
        .declare_transitive(ex("partOf").as_ref());
    let data = ontology.data_mut();
    data.add_assertion(ex("a"), ex("partOf"), ex("b"));
    data.add_assertion(ex("b"), ex("partOf"), ex("c"));
    data.add_assertion(ex("c"), ex("partOf"), ex("a"));
    ontology
}

#[test]
fn test_reasoning_report() {
    let report = reason(&family(), ReasonerOptions::default());

    assert_eq!(report.fixpoint_passes(), 3);
    assert_snapshot!(sorted_evidences(&report), @r"
    [ClassModel] SubClassTransitivity: <http://example.com/Mother> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://example.com/Person>
    [Data] DomainEntailment: <http://example.com/alice> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.com/Person>
    [Data] InverseOfEntailment: <http://example.com/carol> <http://example.com/hasChild> <http://example.com/alice>
    [Data] PropertyEntailment: <http://example.com/alice> <http://example.com/hasParent> <http://example.com/carol>
    [Data] SymmetricPropertyEntailment: <http://example.com/bob> <http://example.com/hasSibling> <http://example.com/alice>
    ");
}

#[test]
fn test_second_run_has_no_evidences() {
    let mut ontology = family();
    let report = reason(&ontology, ReasonerOptions::default());
    assert_eq!(report.join_evidences(&mut ontology).unwrap(), report.len());

    let report = reason(&ontology, ReasonerOptions::default());
    assert!(report.is_empty());
}

#[test]
fn test_transitive_cycle_terminates() {
    let ontology = cycle();
    let report = reason(&ontology, ReasonerOptions::default());

    assert_eq!(report.fixpoint_passes(), 2);
    assert_eq!(report.len(), 6);
}

#[test]
fn test_transitive_cycle_terminates_with_recursion_limit() {
    let ontology = cycle();
    let report = reason(
        &ontology,
        ReasonerOptions::default().with_recursion_limit(true),
    );

    assert!(report.fixpoint_passes() <= MAX_FIXPOINT_PASSES);
    assert_eq!(report.len(), 6);
}

#[test]
fn test_same_as_relations_are_symmetric() {
    let mut ontology = Ontology::new(ex("aliases"));
    let data = ontology.data_mut();
    data.add_same_as(ex("alice"), ex("alicia"));
    data.add_assertion(ex("alice"), ex("knows"), ex("bob"));

    let report = reason(&ontology, ReasonerOptions::default());
    report.join_evidences(&mut ontology).unwrap();

    assert!(ontology.contains(&TaxonomyEntry::new(ex("alicia"), owl::SAME_AS, ex("alice"))));
    assert!(ontology.contains(&TaxonomyEntry::new(ex("alicia"), ex("knows"), ex("bob"))));
    assert_eq!(report.fixpoint_passes(), 2);
}

#[test]
fn test_user_rules_run_after_standard_rules() {
    let mut ontology = Ontology::new(ex("agents"));
    ontology
        .class_model_mut()
        .add_sub_class_of(ex("Student"), ex("Person"));
    ontology.data_mut().add_class_type(ex("bob"), ex("Student"));

    let rule = CustomRule::new("PersonsAreAgents", |name: &str, ontology: &mut Ontology| {
        let persons = ontology
            .data()
            .class_type()
            .iter()
            .filter(|entry| *entry.object() == Term::from(ex("Person")))
            .map(|entry| entry.subject().clone())
            .collect::<Vec<_>>();
        persons
            .into_iter()
            .filter_map(|person| {
                ontology.infer(name, TaxonomyEntry::new(person, rdf::TYPE, ex("Agent")))
            })
            .collect::<Vec<Evidence>>()
    });
    let ruleset = ReasonerRuleset::with_all_standard_rules().with_rule(Arc::new(rule));
    let reasoner = Reasoner::new(ruleset);
    let report = reasoner.apply(&ontology, &ontology.validate()).unwrap();

    let provenances = report
        .evidences()
        .iter()
        .map(|evidence| evidence.provenance().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(provenances, ["ClassTypeEntailment", "PersonsAreAgents"]);
}
