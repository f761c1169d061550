use crate::engine::QueryOptions;
use crate::error::QueryError;
use crate::join::{inner_join, union};
use crate::matcher::match_pattern;
use crate::table::SolutionTable;
use ontoquad_common::QuadSource;
use ontoquad_model::{NamedNode, Pattern, PatternError, PatternMember, Variable};

/// The prefix of the intermediate variables of an expanded property path.
const SYNTHETIC_VARIABLE_PREFIX: &str = "__PP";

/// A predicate that may be traversed in reverse direction (`^predicate`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathAlternative {
    predicate: NamedNode,
    inverse: bool,
}

impl PathAlternative {
    pub fn new(predicate: NamedNode) -> Self {
        Self {
            predicate,
            inverse: false,
        }
    }

    pub fn inverse(predicate: NamedNode) -> Self {
        Self {
            predicate,
            inverse: true,
        }
    }

    pub fn predicate(&self) -> &NamedNode {
        &self.predicate
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }
}

/// A single step of a property path: one or more alternative predicates (`p1 | ^p2`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathStep {
    alternatives: Vec<PathAlternative>,
}

impl PathStep {
    pub fn alternatives(&self) -> &[PathAlternative] {
        &self.alternatives
    }
}

/// The patterns of an expanded [PropertyPath].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathExpansion {
    steps: Vec<Vec<Pattern>>,
    synthetic_variables: Vec<Variable>,
}

impl PathExpansion {
    /// One list of alternative patterns per step. A step without patterns matches nothing.
    pub fn steps(&self) -> &[Vec<Pattern>] {
        &self.steps
    }

    /// The variables introduced to connect consecutive steps.
    pub fn synthetic_variables(&self) -> &[Variable] {
        &self.synthetic_variables
    }
}

/// A sequence of steps from `start` to `end` (`start p1/^p2/(p3|p4) end`).
///
/// A path is evaluated by expanding it into patterns. Consecutive steps are connected with
/// synthetic variables that are dropped from the result. The alternatives of a step are unioned,
/// the steps are joined. A path without steps matches nothing and is skipped by its group.
///
/// An inverse step cannot reach a literal end, as literals never occur as subjects. Such
/// alternatives match nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    start: PatternMember,
    end: PatternMember,
    context: Option<PatternMember>,
    steps: Vec<PathStep>,
    is_optional: bool,
    join_as_union: bool,
}

impl PropertyPath {
    /// Creates a path without steps. The start must not be a literal.
    pub fn new(
        start: impl Into<PatternMember>,
        end: impl Into<PatternMember>,
    ) -> Result<Self, PatternError> {
        let start = start.into();
        if matches!(start, PatternMember::Literal(_)) {
            return Err(PatternError::InvalidPathStart(start));
        }
        Ok(Self {
            start,
            end: end.into(),
            context: None,
            steps: Vec::new(),
            is_optional: false,
            join_as_union: false,
        })
    }

    #[must_use]
    pub fn then(self, predicate: NamedNode) -> Self {
        self.then_any([PathAlternative::new(predicate)])
    }

    #[must_use]
    pub fn then_inverse(self, predicate: NamedNode) -> Self {
        self.then_any([PathAlternative::inverse(predicate)])
    }

    /// Appends a step that matches any of `alternatives`.
    #[must_use]
    pub fn then_any(mut self, alternatives: impl IntoIterator<Item = PathAlternative>) -> Self {
        self.steps.push(PathStep {
            alternatives: alternatives.into_iter().collect(),
        });
        self
    }

    /// Restricts the path to a context. The context must be an IRI or a variable.
    pub fn in_context(mut self, context: impl Into<PatternMember>) -> Result<Self, PatternError> {
        let context = context.into();
        if !matches!(
            context,
            PatternMember::NamedNode(_) | PatternMember::Variable(_)
        ) {
            return Err(PatternError::InvalidContext(context));
        }
        self.context = Some(context);
        Ok(self)
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    #[must_use]
    pub fn union_with_next(mut self) -> Self {
        self.join_as_union = true;
        self
    }

    pub fn start(&self) -> &PatternMember {
        &self.start
    }

    pub fn end(&self) -> &PatternMember {
        &self.end
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn join_as_union(&self) -> bool {
        self.join_as_union
    }

    /// Returns the variables that appear in the result of this path.
    pub fn variables(&self) -> Vec<Variable> {
        let mut variables = Vec::new();
        for member in self.context.iter().chain([&self.start, &self.end]) {
            if let Some(variable) = member.as_variable() {
                if !variables.contains(variable) {
                    variables.push(variable.clone());
                }
            }
        }
        variables
    }

    /// Expands the path into one list of alternative patterns per step.
    ///
    /// `counter` numbers the synthetic variables. It is shared by all paths of a group such that
    /// the synthetic variables of different paths never clash. Names taken by the variables of
    /// this path are skipped.
    pub fn expand(&self, counter: &mut usize) -> Result<PathExpansion, PatternError> {
        let taken = self.variables();
        let mut steps = Vec::with_capacity(self.steps.len());
        let mut synthetic_variables = Vec::new();
        let mut from = self.start.clone();
        for (index, step) in self.steps.iter().enumerate() {
            let to = if index + 1 == self.steps.len() {
                self.end.clone()
            } else {
                let variable = loop {
                    let candidate =
                        Variable::new_unchecked(format!("{SYNTHETIC_VARIABLE_PREFIX}{counter}"));
                    *counter += 1;
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                };
                synthetic_variables.push(variable.clone());
                PatternMember::Variable(variable)
            };
            let patterns = step
                .alternatives
                .iter()
                .filter_map(|alternative| self.step_pattern(&from, alternative, &to).transpose())
                .collect::<Result<Vec<_>, _>>()?;
            steps.push(patterns);
            from = to;
        }
        Ok(PathExpansion {
            steps,
            synthetic_variables,
        })
    }

    /// Matches the path against `source`.
    pub(crate) fn evaluate(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
        counter: &mut usize,
    ) -> Result<SolutionTable, QueryError> {
        let expansion = self.expand(counter)?;
        let mut result = SolutionTable::identity();
        for alternatives in expansion.steps() {
            let mut step = None;
            for pattern in alternatives {
                let table = match_pattern(pattern, source, options)?;
                step = Some(match step {
                    Some(previous) => union(previous, table),
                    None => table,
                });
            }
            let step = step.unwrap_or_else(SolutionTable::empty);
            result = inner_join(&result, &step);
        }
        let synthetic = expansion.synthetic_variables();
        let mut result = result.drop_columns(|variable| synthetic.contains(variable));
        result.distinct();
        Ok(result)
    }

    /// Returns [None] if the alternative would need a literal subject.
    fn step_pattern(
        &self,
        from: &PatternMember,
        alternative: &PathAlternative,
        to: &PatternMember,
    ) -> Result<Option<Pattern>, PatternError> {
        let (subject, object) = if alternative.inverse {
            (to.clone(), from.clone())
        } else {
            (from.clone(), to.clone())
        };
        if matches!(subject, PatternMember::Literal(_)) {
            return Ok(None);
        }
        let predicate = alternative.predicate.clone();
        let pattern = match &self.context {
            Some(context) => Pattern::new_in_context(context.clone(), subject, predicate, object)?,
            None => Pattern::new(subject, predicate, object)?,
        };
        Ok(Some(pattern))
    }
}
