use crate::table::SolutionRow;
use ontoquad_model::vocab::xsd;
use ontoquad_model::{
    boolean_literal, compare_terms, effective_boolean_value, is_plain_literal, Literal,
    NamedNode, Numeric, Term, TermRef, ThinError, ThinResult, Variable,
};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};

/// The comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOperator {
    /// Returns whether `ordering` satisfies this operator.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering.is_eq(),
            Self::NotEqual => ordering.is_ne(),
            Self::Less => ordering.is_lt(),
            Self::LessOrEqual => ordering.is_le(),
            Self::Greater => ordering.is_gt(),
            Self::GreaterOrEqual => ordering.is_ge(),
        }
    }

    /// Compares `lhs` and `rhs`. Incomparable terms never satisfy any operator.
    pub fn evaluate(self, lhs: TermRef<'_>, rhs: TermRef<'_>) -> ThinResult<bool> {
        compare_terms(lhs, rhs).map(|ordering| self.accepts(ordering))
    }
}

/// A user-defined expression.
///
/// Custom expressions are evaluated like built-in expressions: an error leaves the target of a
/// `BIND` unbound and discards the row in a filter.
pub trait CustomExpression: Debug + Send + Sync {
    /// A name used for debugging.
    fn name(&self) -> &str;

    /// Evaluates the expression on `row`.
    fn evaluate(&self, row: &SolutionRow<'_>) -> ThinResult<Term>;
}

/// A lazily compiled regular expression with SPARQL flags.
///
/// The expression is compiled on first use. An invalid expression never matches.
#[derive(Clone, Debug)]
pub struct RegexMatcher {
    pattern: String,
    flags: String,
    compiled: OnceLock<Option<Regex>>,
}

impl RegexMatcher {
    /// Creates a new matcher. Supported flags are `i`, `s`, `m`, `x`, and `q`.
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: flags.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Tests `text` against the expression. Fails if the expression or its flags are invalid.
    pub fn is_match(&self, text: &str) -> ThinResult<bool> {
        self.compiled
            .get_or_init(|| compile_regex(&self.pattern, &self.flags))
            .as_ref()
            .map(|regex| regex.is_match(text))
            .ok_or(ThinError {})
    }
}

fn compile_regex(pattern: &str, flags: &str) -> Option<Regex> {
    let mut escaped = None;
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'q' => escaped = Some(regex::escape(pattern)),
            _ => return None,
        }
    }
    if let Some(escaped) = escaped {
        let mut literal = RegexBuilder::new(&escaped);
        literal.case_insensitive(flags.contains('i'));
        return literal.build().ok();
    }
    builder.build().ok()
}

/// Checks whether the language tag `tag` matches the language range `range`.
///
/// `*` matches any non-empty tag. Otherwise, the tag must be equal to the range or start with
/// the range followed by `-` (case-insensitive).
pub fn lang_matches(tag: &str, range: &str) -> bool {
    if range == "*" {
        return !tag.is_empty();
    }
    let tag = tag.to_ascii_lowercase();
    let range = range.to_ascii_lowercase();
    tag == range
        || tag
            .strip_prefix(&range)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// An expression that is evaluated on a single row.
///
/// Evaluation failures (unbound variables, type errors, ...) are reported as [ThinError].
#[derive(Clone, Debug)]
pub enum Expression {
    Variable(Variable),
    Constant(Term),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Bound(Variable),
    Comparison(ComparisonOperator, Box<Expression>, Box<Expression>),
    In(Box<Expression>, Vec<Expression>),
    IsBlank(Box<Expression>),
    IsLiteral(Box<Expression>),
    IsNumeric(Box<Expression>),
    IsUri(Box<Expression>),
    /// Tests the language tag of a literal (or the lexical form of a simple literal holding a
    /// tag) against a language range.
    LangMatches(Box<Expression>, String),
    Regex(Box<Expression>, RegexMatcher),
    SameTerm(Box<Expression>, Box<Expression>),
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Str(Box<Expression>),
    Lang(Box<Expression>),
    Datatype(Box<Expression>),
    Concat(Vec<Expression>),
    Custom(Arc<dyn CustomExpression>),
}

impl Expression {
    pub fn variable(variable: Variable) -> Self {
        Self::Variable(variable)
    }

    pub fn constant(term: impl Into<Term>) -> Self {
        Self::Constant(term.into())
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

    pub fn comparison(operator: ComparisonOperator, lhs: Self, rhs: Self) -> Self {
        Self::Comparison(operator, Box::new(lhs), Box::new(rhs))
    }

    pub fn regex(inner: Self, pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::Regex(Box::new(inner), RegexMatcher::new(pattern, flags))
    }

    pub fn custom(expression: impl CustomExpression + 'static) -> Self {
        Self::Custom(Arc::new(expression))
    }

    /// Evaluates the expression on `row`.
    pub fn evaluate(&self, row: &SolutionRow<'_>) -> ThinResult<Term> {
        match self {
            Self::Variable(variable) => row.value(variable).cloned().ok_or(ThinError {}),
            Self::Constant(term) => Ok(term.clone()),
            Self::And(lhs, rhs) => {
                match (lhs.evaluate_ebv(row), rhs.evaluate_ebv(row)) {
                    (Ok(false), _) | (_, Ok(false)) => Ok(boolean_term(false)),
                    (Ok(true), Ok(true)) => Ok(boolean_term(true)),
                    _ => ThinError::expected(),
                }
            }
            Self::Or(lhs, rhs) => match (lhs.evaluate_ebv(row), rhs.evaluate_ebv(row)) {
                (Ok(true), _) | (_, Ok(true)) => Ok(boolean_term(true)),
                (Ok(false), Ok(false)) => Ok(boolean_term(false)),
                _ => ThinError::expected(),
            },
            Self::Not(inner) => Ok(boolean_term(!inner.evaluate_ebv(row)?)),
            Self::Bound(variable) => Ok(boolean_term(row.value(variable).is_some())),
            Self::Comparison(operator, lhs, rhs) => {
                let lhs = lhs.evaluate(row)?;
                let rhs = rhs.evaluate(row)?;
                Ok(boolean_term(operator.evaluate(lhs.as_ref(), rhs.as_ref())?))
            }
            Self::In(needle, haystack) => {
                let needle = needle.evaluate(row)?;
                let found = haystack
                    .iter()
                    .filter_map(|candidate| candidate.evaluate(row).ok())
                    .any(|candidate| terms_equal(needle.as_ref(), candidate.as_ref()));
                Ok(boolean_term(found))
            }
            Self::IsBlank(inner) => Ok(boolean_term(matches!(
                inner.evaluate(row)?,
                Term::BlankNode(_)
            ))),
            Self::IsLiteral(inner) => Ok(boolean_term(matches!(
                inner.evaluate(row)?,
                Term::Literal(_)
            ))),
            Self::IsNumeric(inner) => Ok(boolean_term(is_numeric(
                inner.evaluate(row)?.as_ref(),
            ))),
            Self::IsUri(inner) => Ok(boolean_term(matches!(
                inner.evaluate(row)?,
                Term::NamedNode(_)
            ))),
            Self::LangMatches(inner, range) => {
                let Term::Literal(literal) = inner.evaluate(row)? else {
                    return ThinError::expected();
                };
                let tag = literal.language().unwrap_or(literal.value());
                Ok(boolean_term(lang_matches(tag, range)))
            }
            Self::Regex(inner, matcher) => {
                let Term::Literal(literal) = inner.evaluate(row)? else {
                    return ThinError::expected();
                };
                if !is_plain_literal(literal.as_ref()) {
                    return ThinError::expected();
                }
                Ok(boolean_term(matcher.is_match(literal.value())?))
            }
            Self::SameTerm(lhs, rhs) => Ok(boolean_term(lhs.evaluate(row)? == rhs.evaluate(row)?)),
            Self::Add(lhs, rhs) => arithmetic(row, lhs, rhs, Numeric::checked_add),
            Self::Subtract(lhs, rhs) => arithmetic(row, lhs, rhs, Numeric::checked_sub),
            Self::Multiply(lhs, rhs) => arithmetic(row, lhs, rhs, Numeric::checked_mul),
            Self::Divide(lhs, rhs) => arithmetic(row, lhs, rhs, Numeric::checked_div),
            Self::Str(inner) => match inner.evaluate(row)? {
                Term::NamedNode(node) => Ok(Literal::new_simple_literal(node.as_str()).into()),
                Term::Literal(literal) => Ok(Literal::new_simple_literal(literal.value()).into()),
                Term::BlankNode(_) => ThinError::expected(),
            },
            Self::Lang(inner) => match inner.evaluate(row)? {
                Term::Literal(literal) => {
                    Ok(Literal::new_simple_literal(literal.language().unwrap_or_default()).into())
                }
                _ => ThinError::expected(),
            },
            Self::Datatype(inner) => match inner.evaluate(row)? {
                Term::Literal(literal) => Ok(literal.datatype().into_owned().into()),
                _ => ThinError::expected(),
            },
            Self::Concat(parts) => {
                let mut value = String::new();
                for part in parts {
                    let Term::Literal(literal) = part.evaluate(row)? else {
                        return ThinError::expected();
                    };
                    if !is_plain_literal(literal.as_ref()) {
                        return ThinError::expected();
                    }
                    value.push_str(literal.value());
                }
                Ok(Literal::new_simple_literal(value).into())
            }
            Self::Custom(expression) => expression.evaluate(row),
        }
    }

    /// Evaluates the expression and computes the effective boolean value of the result.
    pub fn evaluate_ebv(&self, row: &SolutionRow<'_>) -> ThinResult<bool> {
        effective_boolean_value(self.evaluate(row)?.as_ref())
    }

    /// Collects the variables that this expression refers to.
    pub fn collect_variables(&self, variables: &mut Vec<Variable>) {
        match self {
            Self::Variable(variable) | Self::Bound(variable) => {
                if !variables.contains(variable) {
                    variables.push(variable.clone());
                }
            }
            Self::Constant(_) | Self::Custom(_) => {}
            Self::Not(inner)
            | Self::IsBlank(inner)
            | Self::IsLiteral(inner)
            | Self::IsNumeric(inner)
            | Self::IsUri(inner)
            | Self::LangMatches(inner, _)
            | Self::Regex(inner, _)
            | Self::Str(inner)
            | Self::Lang(inner)
            | Self::Datatype(inner) => inner.collect_variables(variables),
            Self::And(lhs, rhs)
            | Self::Or(lhs, rhs)
            | Self::Comparison(_, lhs, rhs)
            | Self::SameTerm(lhs, rhs)
            | Self::Add(lhs, rhs)
            | Self::Subtract(lhs, rhs)
            | Self::Multiply(lhs, rhs)
            | Self::Divide(lhs, rhs) => {
                lhs.collect_variables(variables);
                rhs.collect_variables(variables);
            }
            Self::In(needle, haystack) => {
                needle.collect_variables(variables);
                for candidate in haystack {
                    candidate.collect_variables(variables);
                }
            }
            Self::Concat(parts) => {
                for part in parts {
                    part.collect_variables(variables);
                }
            }
        }
    }
}

impl From<Variable> for Expression {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}

impl From<Term> for Expression {
    fn from(value: Term) -> Self {
        Self::Constant(value)
    }
}

impl From<NamedNode> for Expression {
    fn from(value: NamedNode) -> Self {
        Self::Constant(value.into())
    }
}

impl From<Literal> for Expression {
    fn from(value: Literal) -> Self {
        Self::Constant(value.into())
    }
}

/// Two terms are equal if they are the same term or if they compare as equal values.
pub(crate) fn terms_equal(lhs: TermRef<'_>, rhs: TermRef<'_>) -> bool {
    lhs == rhs || compare_terms(lhs, rhs).is_ok_and(Ordering::is_eq)
}

pub(crate) fn is_numeric(term: TermRef<'_>) -> bool {
    match term {
        TermRef::Literal(literal) => Numeric::from_literal(literal).is_ok(),
        TermRef::NamedNode(_) | TermRef::BlankNode(_) => false,
    }
}

fn boolean_term(value: bool) -> Term {
    boolean_literal(value).into()
}

fn arithmetic(
    row: &SolutionRow<'_>,
    lhs: &Expression,
    rhs: &Expression,
    operation: impl FnOnce(Numeric, Numeric) -> ThinResult<Numeric>,
) -> ThinResult<Term> {
    let lhs = numeric_value(lhs.evaluate(row)?)?;
    let rhs = numeric_value(rhs.evaluate(row)?)?;
    Ok(operation(lhs, rhs)?.into_literal().into())
}

fn numeric_value(term: Term) -> ThinResult<Numeric> {
    match term {
        Term::Literal(literal) => Numeric::from_literal(literal.as_ref()),
        Term::NamedNode(_) | Term::BlankNode(_) => ThinError::expected(),
    }
}
