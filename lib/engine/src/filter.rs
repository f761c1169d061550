use crate::engine::QueryOptions;
use crate::error::QueryError;
use crate::expression::{
    is_numeric, lang_matches, terms_equal, ComparisonOperator, Expression, RegexMatcher,
};
use crate::group::PatternGroup;
use crate::table::{SolutionRow, SolutionTable};
use ontoquad_common::QuadSource;
use ontoquad_model::{is_true_literal, NamedNode, PatternMember, Term, TermRef, Variable};
use std::sync::{Arc, PoisonError, RwLock};

/// A filter that decides whether a row of a [SolutionTable] is kept.
///
/// Filters are evaluated with [Filter::apply]. A row whose evaluation fails (e.g., comparing an
/// IRI with a literal) is discarded. Filters that refer to a variable that is not a column of
/// the table keep all rows. Negation is applied to the final outcome, such that
/// `apply(row, true) == !apply(row, false)`.
#[derive(Clone, Debug)]
pub enum Filter {
    Comparison {
        operator: ComparisonOperator,
        left: PatternMember,
        right: PatternMember,
    },
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    Regex {
        variable: Variable,
        matcher: RegexMatcher,
    },
    LangMatches {
        variable: Variable,
        range: String,
    },
    Datatype {
        variable: Variable,
        datatype: NamedNode,
    },
    IsBlank(Variable),
    IsLiteral(Variable),
    IsUri(Variable),
    IsNumeric(Variable),
    Bound(Variable),
    SameTerm {
        variable: Variable,
        term: PatternMember,
    },
    In {
        variable: Variable,
        terms: Vec<Term>,
    },
    /// Keeps the rows for which the expression evaluates to `true`.
    Expression(Expression),
    Exists(ExistsFilter),
    NotExists(ExistsFilter),
    /// Keeps the rows that are compatible with at least one row of the table.
    Values(Arc<SolutionTable>),
}

impl Filter {
    pub fn comparison(
        operator: ComparisonOperator,
        left: impl Into<PatternMember>,
        right: impl Into<PatternMember>,
    ) -> Self {
        Self::Comparison {
            operator,
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Or(Box::new(lhs), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn regex(variable: Variable, pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::Regex {
            variable,
            matcher: RegexMatcher::new(pattern, flags),
        }
    }

    pub fn exists(group: PatternGroup) -> Self {
        Self::Exists(ExistsFilter::new(group))
    }

    pub fn not_exists(group: PatternGroup) -> Self {
        Self::NotExists(ExistsFilter::new(group))
    }

    /// Evaluates the sub-patterns of `EXISTS` filters against `source` and caches the results.
    ///
    /// Must be called before [Filter::apply]. An unprepared `EXISTS` filter never finds a match.
    /// Preparing the filter again replaces the cached solutions.
    pub fn prepare(&self, source: &dyn QuadSource, options: &QueryOptions) -> Result<(), QueryError> {
        match self {
            Self::And(lhs, rhs) | Self::Or(lhs, rhs) => {
                lhs.prepare(source, options)?;
                rhs.prepare(source, options)
            }
            Self::Not(inner) => inner.prepare(source, options),
            Self::Exists(exists) | Self::NotExists(exists) => exists.prepare(source, options),
            _ => Ok(()),
        }
    }

    /// Decides whether `row` is kept. If `negate` is set, the outcome is inverted.
    pub fn apply(&self, row: &SolutionRow<'_>, negate: bool) -> bool {
        self.evaluate(row) != negate
    }

    fn evaluate(&self, row: &SolutionRow<'_>) -> bool {
        match self {
            Self::Comparison {
                operator,
                left,
                right,
            } => {
                let (Some(left), Some(right)) = (resolve(row, left), resolve(row, right)) else {
                    return true;
                };
                match (left, right) {
                    (Some(left), Some(right)) => operator.evaluate(left, right).unwrap_or(false),
                    _ => false,
                }
            }
            Self::And(lhs, rhs) => lhs.apply(row, false) && rhs.apply(row, false),
            Self::Or(lhs, rhs) => lhs.apply(row, false) || rhs.apply(row, false),
            Self::Not(inner) => !inner.apply(row, false),
            Self::Regex { variable, matcher } => test_bound(row, variable, |term| match term {
                TermRef::Literal(literal) => matcher.is_match(literal.value()).unwrap_or(false),
                TermRef::NamedNode(node) => matcher.is_match(node.as_str()).unwrap_or(false),
                TermRef::BlankNode(_) => false,
            }),
            Self::LangMatches { variable, range } => test_bound(row, variable, |term| match term {
                TermRef::Literal(literal) => literal
                    .language()
                    .is_some_and(|language| lang_matches(language, range)),
                _ => false,
            }),
            Self::Datatype { variable, datatype } => test_bound(row, variable, |term| match term {
                TermRef::Literal(literal) => literal.datatype() == datatype.as_ref(),
                _ => false,
            }),
            Self::IsBlank(variable) => {
                test_bound(row, variable, |term| matches!(term, TermRef::BlankNode(_)))
            }
            Self::IsLiteral(variable) => {
                test_bound(row, variable, |term| matches!(term, TermRef::Literal(_)))
            }
            Self::IsUri(variable) => {
                test_bound(row, variable, |term| matches!(term, TermRef::NamedNode(_)))
            }
            Self::IsNumeric(variable) => test_bound(row, variable, is_numeric),
            Self::Bound(variable) => row.get(variable).is_none_or(|value| value.is_some()),
            Self::SameTerm { variable, term } => {
                let Some(other) = resolve(row, term) else {
                    return true;
                };
                test_bound(row, variable, |value| other.is_some_and(|other| value == other))
            }
            Self::In { variable, terms } => test_bound(row, variable, |value| {
                terms.iter().any(|term| terms_equal(value, term.as_ref()))
            }),
            Self::Expression(expression) => expression
                .evaluate(row)
                .is_ok_and(|result| is_true_literal(result.as_ref())),
            Self::Exists(exists) => exists.matches(row),
            Self::NotExists(exists) => !exists.matches(row),
            Self::Values(table) => has_compatible_row(table, row),
        }
    }
}

/// Resolves `member` in `row`.
///
/// Returns [None] if the member is a variable that is not a column of the row and `Some(None)`
/// if the variable is unbound.
fn resolve<'a>(row: &SolutionRow<'a>, member: &'a PatternMember) -> Option<Option<TermRef<'a>>> {
    match member {
        PatternMember::Variable(variable) => row.get(variable).map(|term| term.map(Term::as_ref)),
        _ => Some(member.as_term()),
    }
}

/// Absent columns keep the row, unbound cells discard it.
fn test_bound(
    row: &SolutionRow<'_>,
    variable: &Variable,
    test: impl FnOnce(TermRef<'_>) -> bool,
) -> bool {
    match row.get(variable) {
        None => true,
        Some(None) => false,
        Some(Some(term)) => test(term.as_ref()),
    }
}

pub(crate) fn has_compatible_row(table: &SolutionTable, row: &SolutionRow<'_>) -> bool {
    table
        .rows()
        .any(|candidate| candidate.is_compatible_with(row))
}

/// The pattern of an `EXISTS` or `NOT EXISTS` filter.
///
/// The group is evaluated once against the whole store when the filter is prepared, not once per
/// outer binding. The variables of the outer solution are not substituted into the group. The
/// resulting table is cached, and a row passes if the cached table holds a compatible row.
#[derive(Debug)]
pub struct ExistsFilter {
    group: Box<PatternGroup>,
    cache: RwLock<Option<Arc<SolutionTable>>>,
}

impl ExistsFilter {
    pub fn new(group: PatternGroup) -> Self {
        Self {
            group: Box::new(group),
            cache: RwLock::new(None),
        }
    }

    pub fn group(&self) -> &PatternGroup {
        &self.group
    }

    /// Returns the cached solutions of the pattern, if the filter has been prepared.
    pub fn solutions(&self) -> Option<Arc<SolutionTable>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn prepare(&self, source: &dyn QuadSource, options: &QueryOptions) -> Result<(), QueryError> {
        let table = self.group.evaluate(source, options)?;
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(table));
        Ok(())
    }

    fn matches(&self, row: &SolutionRow<'_>) -> bool {
        self.solutions()
            .is_some_and(|table| has_compatible_row(&table, row))
    }
}

impl Clone for ExistsFilter {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
            cache: RwLock::new(self.solutions()),
        }
    }
}
