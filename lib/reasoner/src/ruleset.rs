use crate::ontology::Ontology;
use crate::report::{lock, Evidence};
use crate::rules::StandardRule;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

/// A rule that is provided by the user of the reasoner.
///
/// User rules run once, after the standard rules reached their fixpoint. Like the standard rules,
/// a rule should only return evidences for entries that it actually added to the ontology.
/// [Ontology::infer] takes care of this.
pub trait ReasoningRule: Debug + Send + Sync {
    /// The name of the rule. It is used as the provenance of the evidences.
    fn name(&self) -> &str;

    /// Applies the rule to `ontology` and returns the evidences of all new entries.
    fn apply(&self, ontology: &mut Ontology) -> Vec<Evidence>;
}

/// A [ReasoningRule] backed by a function.
pub struct CustomRule<F> {
    name: String,
    function: F,
}

impl<F> CustomRule<F>
where
    F: Fn(&str, &mut Ontology) -> Vec<Evidence> + Send + Sync,
{
    /// Creates a new rule. The function receives the name of the rule and the ontology.
    pub fn new(name: impl Into<String>, function: F) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }
}

impl<F> Debug for CustomRule<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> ReasoningRule for CustomRule<F>
where
    F: Fn(&str, &mut Ontology) -> Vec<Evidence> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ontology: &mut Ontology) -> Vec<Evidence> {
        (self.function)(&self.name, ontology)
    }
}

/// The rules a reasoner applies.
///
/// Standard rules are enabled individually and always run in their fixed stage order, no matter
/// in which order they were enabled. User rules run in registration order. Rules can be added and
/// removed through a shared reference.
#[derive(Debug, Default)]
pub struct ReasonerRuleset {
    standard_rules: Mutex<Vec<StandardRule>>,
    rules: Mutex<Vec<Arc<dyn ReasoningRule>>>,
}

impl ReasonerRuleset {
    /// Creates a ruleset without any rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ruleset with all standard rules enabled.
    pub fn with_all_standard_rules() -> Self {
        let ruleset = Self::new();
        ruleset.add_all_standard_rules();
        ruleset
    }

    #[must_use]
    pub fn with_standard_rule(self, rule: StandardRule) -> Self {
        self.add_standard_rule(rule);
        self
    }

    #[must_use]
    pub fn with_rule(self, rule: Arc<dyn ReasoningRule>) -> Self {
        self.add_rule(rule);
        self
    }

    /// Enables `rule`. Returns whether the rule was not yet enabled.
    pub fn add_standard_rule(&self, rule: StandardRule) -> bool {
        let mut rules = lock(&self.standard_rules);
        if rules.contains(&rule) {
            return false;
        }
        rules.push(rule);
        true
    }

    pub fn add_all_standard_rules(&self) {
        for rule in StandardRule::ALL {
            self.add_standard_rule(rule);
        }
    }

    /// Disables `rule`. Returns whether the rule was enabled.
    pub fn remove_standard_rule(&self, rule: StandardRule) -> bool {
        let mut rules = lock(&self.standard_rules);
        let before = rules.len();
        rules.retain(|enabled| *enabled != rule);
        rules.len() < before
    }

    pub fn has_standard_rule(&self, rule: StandardRule) -> bool {
        lock(&self.standard_rules).contains(&rule)
    }

    /// Returns the enabled standard rules.
    pub fn standard_rules(&self) -> Vec<StandardRule> {
        lock(&self.standard_rules).clone()
    }

    /// Registers a user rule.
    pub fn add_rule(&self, rule: Arc<dyn ReasoningRule>) {
        lock(&self.rules).push(rule);
    }

    /// Removes all user rules called `name`. Returns whether a rule was removed.
    pub fn remove_rule(&self, name: &str) -> bool {
        let mut rules = lock(&self.rules);
        let before = rules.len();
        rules.retain(|rule| rule.name() != name);
        rules.len() < before
    }

    /// Returns the user rules in registration order.
    pub fn rules(&self) -> Vec<Arc<dyn ReasoningRule>> {
        lock(&self.rules).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> Arc<dyn ReasoningRule> {
        Arc::new(CustomRule::new(name, |_: &str, _: &mut Ontology| Vec::new()))
    }

    #[test]
    fn standard_rules_are_enabled_once() {
        let ruleset = ReasonerRuleset::new().with_standard_rule(StandardRule::SameAsEntailment);
        assert!(!ruleset.add_standard_rule(StandardRule::SameAsEntailment));
        assert!(ruleset.add_standard_rule(StandardRule::SubClassTransitivity));
        assert_eq!(ruleset.standard_rules().len(), 2);

        assert!(ruleset.remove_standard_rule(StandardRule::SameAsEntailment));
        assert!(!ruleset.has_standard_rule(StandardRule::SameAsEntailment));
        assert!(!ruleset.remove_standard_rule(StandardRule::SameAsEntailment));
    }

    #[test]
    fn all_standard_rules() {
        let ruleset = ReasonerRuleset::with_all_standard_rules();
        assert_eq!(ruleset.standard_rules(), StandardRule::ALL);
    }

    #[test]
    fn user_rules_keep_registration_order() {
        let ruleset = ReasonerRuleset::new()
            .with_rule(noop("second"))
            .with_rule(noop("first"))
            .with_rule(noop("second"));
        let names = ruleset
            .rules()
            .iter()
            .map(|rule| rule.name().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, ["second", "first", "second"]);

        assert!(ruleset.remove_rule("second"));
        assert_eq!(ruleset.rules().len(), 1);
    }
}
