use crate::ontology::Ontology;
use crate::taxonomy::{Taxonomy, TaxonomyEntry};
use itertools::Itertools;
use ontoquad_model::vocab::owl;
use ontoquad_model::{
    term_to_subject, Identified, IdentityHash, NamedNodeRef, Subject, Term, TermRef,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// The findings of validating an ontology.
///
/// A report is bound to the ontology it was created for. The reasoner refuses to run with a report
/// of another ontology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    ontology: IdentityHash,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl ValidationReport {
    /// Creates an empty report for `ontology`.
    pub fn new(ontology: &Ontology) -> Self {
        Self::for_identity(ontology.identity())
    }

    pub fn for_identity(ontology: IdentityHash) -> Self {
        Self {
            ontology,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn ontology(&self) -> IdentityHash {
        self.ontology
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_issues(&self) -> bool {
        !self.warnings.is_empty() || !self.errors.is_empty()
    }
}

impl Ontology {
    /// Checks the asserted and inferred entries of the ontology for contradictions.
    ///
    /// Errors are reported for classes that are subclasses of classes they are disjoint with, for
    /// individuals typed with disjoint classes, and for individuals that are both the same as and
    /// different from another individual. Classes that are used for typing but never mentioned by
    /// the class model produce a warning.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new(self);
        let class_model = self.class_model();
        let data = self.data();

        let disjoint = class_model.disjoint_with();
        for entry in class_model.sub_class_of() {
            if is_related(disjoint, owl::DISJOINT_WITH, entry.subject(), entry.object()) {
                report.add_error(format!(
                    "Class {} is a subclass of the disjoint class {}",
                    entry.subject(),
                    entry.object()
                ));
            }
        }

        let mut types: FxHashMap<&Subject, Vec<&Term>> = FxHashMap::default();
        for entry in data.class_type() {
            types.entry(entry.subject()).or_default().push(entry.object());
        }
        let individuals = data
            .class_type()
            .iter()
            .map(TaxonomyEntry::subject)
            .unique()
            .collect::<Vec<_>>();
        for entry in disjoint {
            let class = Term::from(entry.subject().clone());
            for individual in &individuals {
                let classes = &types[individual];
                if classes.contains(&&class) && classes.contains(&entry.object()) {
                    report.add_error(format!(
                        "Individual {individual} belongs to the disjoint classes {} and {}",
                        entry.subject(),
                        entry.object()
                    ));
                }
            }
        }

        for entry in data.different_from() {
            if is_related(data.same_as(), owl::SAME_AS, entry.subject(), entry.object()) {
                report.add_error(format!(
                    "Individual {} is both the same as and different from {}",
                    entry.subject(),
                    entry.object()
                ));
            }
        }

        let known_classes = class_model
            .declarations()
            .iter()
            .map(|entry| Term::from(entry.subject().clone()))
            .chain(
                [
                    class_model.sub_class_of(),
                    class_model.equivalent_class(),
                    disjoint,
                ]
                .into_iter()
                .flat_map(Taxonomy::iter)
                .flat_map(|entry| [Term::from(entry.subject().clone()), entry.object().clone()]),
            )
            .collect::<FxHashSet<_>>();
        let mut reported = FxHashSet::default();
        for entry in data.class_type() {
            let class = entry.object();
            if class.as_ref() != TermRef::from(owl::THING)
                && !known_classes.contains(class)
                && reported.insert(class)
            {
                report.add_warning(format!("Class {class} is not part of the class model"));
            }
        }

        report
    }
}

/// Whether `taxonomy` relates `subject` and `object` in either direction.
fn is_related(
    taxonomy: &Taxonomy,
    predicate: NamedNodeRef<'_>,
    subject: &Subject,
    object: &Term,
) -> bool {
    if taxonomy.contains(&TaxonomyEntry::new(subject.clone(), predicate, object.clone())) {
        return true;
    }
    term_to_subject(object.clone()).is_some_and(|object| {
        taxonomy.contains(&TaxonomyEntry::new(
            object,
            predicate,
            Term::from(subject.clone()),
        ))
    })
}
