use crate::expression::ComparisonOperator;
use crate::table::SolutionRow;
use ontoquad_model::{order_terms, Literal, Numeric, Term, TermRef, Variable};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;

/// The aggregate functions of a `GROUP BY`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    /// Sums the numeric values as doubles. Non-numeric values are skipped.
    Sum,
    /// Averages the numeric values as doubles. Non-numeric values are skipped.
    Avg,
    Min,
    Max,
    GroupConcat { separator: String },
    Sample,
}

/// Filters partitions based on the value of an aggregate (`HAVING`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Having {
    operator: ComparisonOperator,
    value: Term,
}

impl Having {
    pub fn new(operator: ComparisonOperator, value: impl Into<Term>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }

    /// Unbound and incomparable aggregates never pass.
    pub fn accepts(&self, aggregate: Option<&Term>) -> bool {
        aggregate.is_some_and(|aggregate| {
            self.operator
                .evaluate(aggregate.as_ref(), self.value.as_ref())
                .unwrap_or(false)
        })
    }
}

/// Computes an [AggregateFunction] over a partition and binds the result to `output`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aggregator {
    function: AggregateFunction,
    variable: Option<Variable>,
    output: Variable,
    distinct: bool,
    having: Option<Having>,
}

impl Aggregator {
    /// Creates an aggregator over the values of `variable`.
    pub fn new(function: AggregateFunction, variable: Variable, output: Variable) -> Self {
        Self {
            function,
            variable: Some(variable),
            output,
            distinct: false,
            having: None,
        }
    }

    /// Creates an aggregator that counts the rows of a partition (`COUNT(*)`).
    pub fn count_rows(output: Variable) -> Self {
        Self {
            function: AggregateFunction::Count,
            variable: None,
            output,
            distinct: false,
            having: None,
        }
    }

    /// Only aggregates distinct values.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn having(mut self, having: Having) -> Self {
        self.having = Some(having);
        self
    }

    pub fn function(&self) -> &AggregateFunction {
        &self.function
    }

    pub fn variable(&self) -> Option<&Variable> {
        self.variable.as_ref()
    }

    pub fn output(&self) -> &Variable {
        &self.output
    }

    /// Computes the aggregate over `rows`. Returns [None] if the aggregate is undefined, e.g.,
    /// the minimum of no values.
    pub fn evaluate(&self, rows: &[SolutionRow<'_>]) -> Option<Term> {
        let Some(variable) = &self.variable else {
            let count = if self.distinct {
                rows.iter().map(SolutionRow::values).collect::<FxHashSet<_>>().len()
            } else {
                rows.len()
            };
            return Some(count_literal(count));
        };

        let mut values = rows
            .iter()
            .filter_map(|row| row.value(variable))
            .collect::<Vec<_>>();
        if self.distinct {
            let mut seen = FxHashSet::default();
            values.retain(|value| seen.insert(*value));
        }

        match &self.function {
            AggregateFunction::Count => Some(count_literal(values.len())),
            AggregateFunction::Sum => Some(Literal::from(numeric_values(&values).sum::<f64>()).into()),
            AggregateFunction::Avg => {
                let numbers = numeric_values(&values).collect::<Vec<_>>();
                if numbers.is_empty() {
                    return None;
                }
                #[allow(clippy::cast_precision_loss)]
                let average = numbers.iter().sum::<f64>() / numbers.len() as f64;
                Some(Literal::from(average).into())
            }
            AggregateFunction::Min => extremum(&values, Ordering::Less),
            AggregateFunction::Max => extremum(&values, Ordering::Greater),
            AggregateFunction::GroupConcat { separator } => {
                let parts = values
                    .iter()
                    .filter_map(|value| match value {
                        Term::NamedNode(node) => Some(node.as_str()),
                        Term::Literal(literal) => Some(literal.value()),
                        Term::BlankNode(_) => None,
                    })
                    .collect::<Vec<_>>();
                Some(Literal::new_simple_literal(parts.join(separator)).into())
            }
            AggregateFunction::Sample => values.first().map(|value| (*value).clone()),
        }
    }

    /// Returns whether a partition with the aggregate value `aggregate` passes the `HAVING`
    /// condition of this aggregator.
    pub fn accepts(&self, aggregate: Option<&Term>) -> bool {
        self.having
            .as_ref()
            .is_none_or(|having| having.accepts(aggregate))
    }
}

fn count_literal(count: usize) -> Term {
    Literal::from(i64::try_from(count).unwrap_or(i64::MAX)).into()
}

fn numeric_values<'a>(values: &'a [&'a Term]) -> impl Iterator<Item = f64> + 'a {
    values.iter().filter_map(|value| match value {
        Term::Literal(literal) => Numeric::from_literal(literal.as_ref())
            .ok()
            .map(Numeric::to_double),
        Term::NamedNode(_) | Term::BlankNode(_) => None,
    })
}

fn extremum(values: &[&Term], wanted: Ordering) -> Option<Term> {
    values
        .iter()
        .copied()
        .reduce(|best, candidate| {
            let ordering = order_terms(
                Some(TermRef::from(candidate)),
                Some(TermRef::from(best)),
            );
            if ordering == wanted {
                candidate
            } else {
                best
            }
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontoquad_model::vocab::{owl, xsd};
    use ontoquad_model::NamedNode;

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn columns() -> Vec<Variable> {
        vec![var("x")]
    }

    fn values() -> Vec<Vec<Option<Term>>> {
        vec![
            vec![Some(Literal::new_typed_literal("4", xsd::INTEGER).into())],
            vec![Some(Literal::new_typed_literal("1/2", owl::RATIONAL).into())],
            vec![Some(NamedNode::new_unchecked("http://example.com/a").into())],
            vec![Some(Literal::new_typed_literal("4", xsd::INTEGER).into())],
            vec![None],
        ]
    }

    fn aggregate(aggregator: &Aggregator) -> Option<Term> {
        let columns = columns();
        let values = values();
        let rows = values
            .iter()
            .map(|row| SolutionRow::new(&columns, row))
            .collect::<Vec<_>>();
        aggregator.evaluate(&rows)
    }

    #[test]
    fn counting() {
        assert_eq!(
            aggregate(&Aggregator::count_rows(var("c"))),
            Some(Literal::from(5).into())
        );
        assert_eq!(
            aggregate(&Aggregator::new(AggregateFunction::Count, var("x"), var("c"))),
            Some(Literal::from(4).into())
        );
        assert_eq!(
            aggregate(&Aggregator::new(AggregateFunction::Count, var("x"), var("c")).distinct()),
            Some(Literal::from(3).into())
        );
    }

    #[test]
    fn numeric_aggregates_skip_other_values() {
        assert_eq!(
            aggregate(&Aggregator::new(AggregateFunction::Sum, var("x"), var("s"))),
            Some(Literal::from(8.5).into())
        );
        assert_eq!(
            aggregate(&Aggregator::new(AggregateFunction::Avg, var("x"), var("a")).distinct()),
            Some(Literal::from(2.25).into())
        );
    }

    #[test]
    fn extrema_use_the_total_order() {
        assert_eq!(
            aggregate(&Aggregator::new(AggregateFunction::Min, var("x"), var("m"))),
            Some(NamedNode::new_unchecked("http://example.com/a").into())
        );
        assert_eq!(
            aggregate(&Aggregator::new(AggregateFunction::Max, var("x"), var("m"))),
            Some(Literal::new_typed_literal("4", xsd::INTEGER).into())
        );
        assert_eq!(
            Aggregator::new(AggregateFunction::Max, var("x"), var("m")).evaluate(&[]),
            None
        );
    }

    #[test]
    fn having_rejects_unbound_aggregates() {
        let aggregator = Aggregator::new(AggregateFunction::Avg, var("x"), var("a")).having(
            Having::new(ComparisonOperator::Greater, Literal::from(1.0)),
        );
        assert!(aggregator.accepts(aggregate(&aggregator).as_ref()));
        assert!(!aggregator.accepts(None));
    }
}
