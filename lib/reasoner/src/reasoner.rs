use crate::error::ReasonerError;
use crate::ontology::Ontology;
use crate::report::ReasoningReport;
use crate::rules::StandardRule;
use crate::ruleset::ReasonerRuleset;
use crate::validation::ValidationReport;
use ontoquad_model::Identified;
use tracing::{debug, trace, warn};

/// The maximum number of passes of the fixpoint stage if the recursion limit is enabled.
pub const MAX_FIXPOINT_PASSES: usize = 3;

const CLASS_MODEL_STAGE: [StandardRule; 3] = [
    StandardRule::EquivalentClassTransitivity,
    StandardRule::SubClassTransitivity,
    StandardRule::DisjointWithEntailment,
];

const PROPERTY_MODEL_STAGE: [StandardRule; 2] = [
    StandardRule::EquivalentPropertyTransitivity,
    StandardRule::SubPropertyTransitivity,
];

const DATA_STAGE: [StandardRule; 5] = [
    StandardRule::SameAsTransitivity,
    StandardRule::DifferentFromEntailment,
    StandardRule::ClassTypeEntailment,
    StandardRule::DomainEntailment,
    StandardRule::RangeEntailment,
];

const FIXPOINT_STAGE: [StandardRule; 5] = [
    StandardRule::InverseOfEntailment,
    StandardRule::SymmetricPropertyEntailment,
    StandardRule::TransitivePropertyEntailment,
    StandardRule::PropertyEntailment,
    StandardRule::SameAsEntailment,
];

/// Options for a [Reasoner].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReasonerOptions {
    /// Stops the fixpoint stage after [MAX_FIXPOINT_PASSES] passes, even if the last pass still
    /// produced new entries.
    pub enable_recursion_limit: bool,
}

impl ReasonerOptions {
    #[must_use]
    pub fn with_recursion_limit(mut self, enable_recursion_limit: bool) -> Self {
        self.enable_recursion_limit = enable_recursion_limit;
        self
    }
}

/// A forward-chaining reasoner.
///
/// The enabled standard rules run in five stages:
/// 1. class model closure,
/// 2. property model closure,
/// 3. data closure,
/// 4. the assertion rules, repeated until a pass adds nothing new,
/// 5. the user rules, once each.
///
/// The reasoner never modifies the given ontology. It works on a copy, and the inferred entries
/// are returned as a [ReasoningReport]. Use [ReasoningReport::join_evidences] to add them to an
/// ontology.
#[derive(Debug, Default)]
pub struct Reasoner {
    ruleset: ReasonerRuleset,
    options: ReasonerOptions,
}

impl Reasoner {
    pub fn new(ruleset: ReasonerRuleset) -> Self {
        Self {
            ruleset,
            options: ReasonerOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ReasonerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn ruleset(&self) -> &ReasonerRuleset {
        &self.ruleset
    }

    pub fn options(&self) -> &ReasonerOptions {
        &self.options
    }

    /// Applies the rules to `ontology`.
    ///
    /// Fails if `validation` was not created for `ontology`. Warnings and errors of the validation
    /// report are logged, but do not prevent reasoning.
    pub fn apply(
        &self,
        ontology: &Ontology,
        validation: &ValidationReport,
    ) -> Result<ReasoningReport, ReasonerError> {
        if validation.ontology() != ontology.identity() {
            return Err(ReasonerError::ValidationReportMismatch {
                ontology: ontology.identity(),
                report: validation.ontology(),
            });
        }
        for warning in validation.warnings() {
            warn!(
                ontology = %ontology.name(),
                %warning,
                "Reasoning over ontology with validation warning"
            );
        }
        for error in validation.errors() {
            warn!(
                ontology = %ontology.name(),
                %error,
                "Reasoning over ontology with validation error"
            );
        }

        let mut working = ontology.clone();
        let mut report = ReasoningReport::new(ontology.identity());
        let enabled = self.ruleset.standard_rules();
        debug!(
            ontology = %ontology.name(),
            standard_rules = enabled.len(),
            "Starting reasoning"
        );

        for (stage, rules) in [
            ("class model", CLASS_MODEL_STAGE.as_slice()),
            ("property model", PROPERTY_MODEL_STAGE.as_slice()),
            ("data", DATA_STAGE.as_slice()),
        ] {
            let added = run_stage(rules, &enabled, &mut working, &report);
            debug!(stage, added, "Finished reasoning stage");
        }

        let passes = self.run_fixpoint(&enabled, &mut working, &report);
        report.set_fixpoint_passes(passes);

        for rule in self.ruleset.rules() {
            let evidences = rule.apply(&mut working);
            trace!(rule = rule.name(), added = evidences.len(), "Applied user rule");
            report.add_evidences(evidences);
        }

        debug!(
            ontology = %ontology.name(),
            evidences = report.len(),
            passes,
            "Finished reasoning"
        );
        Ok(report)
    }

    /// Repeats the fixpoint stage until a pass adds nothing or the recursion limit is reached.
    /// Returns the number of passes.
    fn run_fixpoint(
        &self,
        enabled: &[StandardRule],
        working: &mut Ontology,
        report: &ReasoningReport,
    ) -> usize {
        if !FIXPOINT_STAGE.iter().any(|rule| enabled.contains(rule)) {
            return 0;
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let added = run_stage(&FIXPOINT_STAGE, enabled, working, report);
            debug!(pass = passes, added, "Finished fixpoint pass");

            if added == 0 {
                break;
            }
            if self.options.enable_recursion_limit && passes >= MAX_FIXPOINT_PASSES {
                debug!(passes, "Stopping fixpoint stage at recursion limit");
                break;
            }
        }
        passes
    }
}

/// Applies the enabled rules of `stage` in order and returns the number of new entries.
fn run_stage(
    stage: &[StandardRule],
    enabled: &[StandardRule],
    working: &mut Ontology,
    report: &ReasoningReport,
) -> usize {
    let mut added = 0;
    for rule in stage.iter().filter(|rule| enabled.contains(rule)) {
        let evidences = rule.apply(working);
        trace!(%rule, added = evidences.len(), "Applied standard rule");
        added += evidences.len();
        report.add_evidences(evidences);
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoquad_model::{IdentityHash, NamedNode};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    /// Every pass of the fixpoint stage can only take one step along the chain, as the inverse
    /// rule runs before the property rule.
    fn chain(length: usize) -> Ontology {
        let mut ontology = Ontology::new(ex("chain"));
        let properties = ontology.property_model_mut();
        for i in (1..length).step_by(2) {
            let property = ex(&format!("p{i}"));
            let super_property = ex(&format!("p{}", i + 1));
            let inverse = ex(&format!("p{}", i + 2));
            properties.add_sub_property_of(property.as_ref(), super_property.as_ref());
            properties.add_inverse_of(super_property.as_ref(), inverse.as_ref());
        }
        ontology.data_mut().add_assertion(ex("a"), ex("p1"), ex("b"));
        ontology
    }

    #[test]
    fn foreign_validation_report_is_rejected() {
        let ontology = Ontology::new(ex("onto"));
        let validation = ValidationReport::for_identity(IdentityHash::new("other"));
        let result = Reasoner::default().apply(&ontology, &validation);
        assert!(matches!(
            result,
            Err(ReasonerError::ValidationReportMismatch { .. })
        ));
    }

    #[test]
    fn ontology_is_not_modified() {
        let mut ontology = Ontology::new(ex("onto"));
        ontology.class_model_mut().add_sub_class_of(ex("A"), ex("B"));
        ontology.data_mut().add_class_type(ex("a"), ex("A"));

        let reasoner = Reasoner::new(ReasonerRuleset::with_all_standard_rules());
        let report = reasoner
            .apply(&ontology, &ValidationReport::new(&ontology))
            .unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(ontology.len(), 2);

        assert_eq!(report.join_evidences(&mut ontology), Ok(1));
        assert_eq!(ontology.len(), 3);
    }

    #[test]
    fn fixpoint_stops_when_nothing_is_added() {
        let ontology = chain(8);
        let reasoner = Reasoner::new(ReasonerRuleset::with_all_standard_rules());
        let report = reasoner
            .apply(&ontology, &ValidationReport::new(&ontology))
            .unwrap();

        // p2 | p3, p4 | p5, p6 | p7, p8 | p9 | nothing
        assert_eq!(report.fixpoint_passes(), 6);
        let last = report.evidences().pop().unwrap();
        assert_eq!(last.entry().predicate(), &ex("p9"));
    }

    #[test]
    fn recursion_limit_caps_fixpoint() {
        let ontology = chain(8);
        let reasoner = Reasoner::new(ReasonerRuleset::with_all_standard_rules())
            .with_options(ReasonerOptions::default().with_recursion_limit(true));
        let report = reasoner
            .apply(&ontology, &ValidationReport::new(&ontology))
            .unwrap();

        assert_eq!(report.fixpoint_passes(), MAX_FIXPOINT_PASSES);
        let last = report.evidences().pop().unwrap();
        assert_eq!(last.entry().predicate(), &ex("p6"));
    }

    #[test]
    fn disabled_fixpoint_rules_skip_the_stage() {
        let mut ontology = chain(4);
        let properties = ontology.property_model_mut();
        properties.add_sub_property_of(ex("p2").as_ref(), ex("p3").as_ref());
        let reasoner = Reasoner::new(
            ReasonerRuleset::new().with_standard_rule(StandardRule::SubPropertyTransitivity),
        );
        let report = reasoner
            .apply(&ontology, &ValidationReport::new(&ontology))
            .unwrap();
        assert_eq!(report.fixpoint_passes(), 0);
        assert_eq!(report.len(), 3);
    }
}
