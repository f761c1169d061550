use crate::aggregate::Aggregator;
use crate::error::QueryError;
use crate::table::{SolutionRow, SolutionTable};
use itertools::Itertools;
use ontoquad_model::{order_terms, Term, Variable};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use tracing::trace;

/// Partitions the solutions by the values of `variables` and aggregates each partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupBy {
    variables: Vec<Variable>,
    aggregators: Vec<Aggregator>,
}

impl GroupBy {
    pub fn new(variables: Vec<Variable>) -> Self {
        Self {
            variables,
            aggregators: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_aggregator(mut self, aggregator: Aggregator) -> Self {
        self.aggregators.push(aggregator);
        self
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn aggregators(&self) -> &[Aggregator] {
        &self.aggregators
    }

    /// Computes one row per partition.
    ///
    /// Without grouping variables, all solutions form a single partition, even if there are no
    /// solutions at all. Partitions that fail a `HAVING` condition are dropped.
    pub fn apply(&self, table: &SolutionTable) -> Result<SolutionTable, QueryError> {
        let columns = self
            .variables
            .iter()
            .chain(self.aggregators.iter().map(Aggregator::output))
            .cloned()
            .collect::<Vec<_>>();
        if !columns.iter().all_unique() {
            return QueryError::invalid_query(
                "The outputs of a GROUP BY must differ from each other and from the grouping variables",
            );
        }

        let mut partitions: Vec<Vec<SolutionRow<'_>>> = Vec::new();
        if self.variables.is_empty() {
            partitions.push(table.rows().collect());
        } else {
            let mut keys = FxHashMap::default();
            for row in table.rows() {
                let key = self
                    .variables
                    .iter()
                    .map(|variable| row.value(variable).map(Term::to_string))
                    .collect::<Vec<_>>();
                let index = *keys.entry(key).or_insert_with(|| {
                    partitions.push(Vec::new());
                    partitions.len() - 1
                });
                partitions[index].push(row);
            }
        }

        let mut result = SolutionTable::new(columns);
        'partitions: for partition in &partitions {
            let mut row = self
                .variables
                .iter()
                .map(|variable| partition.first().and_then(|first| first.value(variable)).cloned())
                .collect::<Vec<_>>();
            for aggregator in &self.aggregators {
                let value = aggregator.evaluate(partition);
                if !aggregator.accepts(value.as_ref()) {
                    continue 'partitions;
                }
                row.push(value);
            }
            result.push_row(row);
        }

        trace!(
            partitions = partitions.len(),
            rows = result.len(),
            "Evaluated GROUP BY"
        );
        Ok(result)
    }
}

/// Orders the solutions by a single variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderBy {
    variable: Variable,
    descending: bool,
}

impl OrderBy {
    pub fn ascending(variable: Variable) -> Self {
        Self {
            variable,
            descending: false,
        }
    }

    pub fn descending(variable: Variable) -> Self {
        Self {
            variable,
            descending: true,
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    fn compare(&self, lhs: &SolutionRow<'_>, rhs: &SolutionRow<'_>) -> Ordering {
        let ordering = order_terms(
            lhs.value(&self.variable).map(Term::as_ref),
            rhs.value(&self.variable).map(Term::as_ref),
        );
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// A solution modifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    GroupBy(GroupBy),
    OrderBy(OrderBy),
    Distinct,
    Offset(usize),
    Limit(usize),
}

/// The normalized modifiers of a query.
///
/// The modifiers are applied in a fixed order, regardless of the order in which they were
/// declared: `GROUP BY`, `ORDER BY`, projection, `DISTINCT`, `OFFSET`, and `LIMIT`. Only the first
/// `GROUP BY`, `OFFSET`, and `LIMIT` are used. `ORDER BY` keys are applied in declaration order,
/// and a variable is only used for its first key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModifierPipeline {
    group_by: Option<GroupBy>,
    order_by: Vec<OrderBy>,
    distinct: bool,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl ModifierPipeline {
    pub fn new<'a>(modifiers: impl IntoIterator<Item = &'a Modifier>) -> Self {
        let mut pipeline = Self::default();
        for modifier in modifiers {
            match modifier {
                Modifier::GroupBy(group_by) => {
                    pipeline.group_by.get_or_insert_with(|| group_by.clone());
                }
                Modifier::OrderBy(order_by) => {
                    if !pipeline
                        .order_by
                        .iter()
                        .any(|existing| existing.variable == order_by.variable)
                    {
                        pipeline.order_by.push(order_by.clone());
                    }
                }
                Modifier::Distinct => pipeline.distinct = true,
                Modifier::Offset(offset) => {
                    pipeline.offset.get_or_insert(*offset);
                }
                Modifier::Limit(limit) => {
                    pipeline.limit.get_or_insert(*limit);
                }
            }
        }
        pipeline
    }

    pub fn group_by(&self) -> Option<&GroupBy> {
        self.group_by.as_ref()
    }

    /// Applies the modifiers to `table`. If `projection` is given, the table is projected onto
    /// these variables after ordering.
    pub fn apply(
        &self,
        table: SolutionTable,
        projection: Option<&[Variable]>,
    ) -> Result<SolutionTable, QueryError> {
        let mut table = match &self.group_by {
            Some(group_by) => group_by.apply(&table)?,
            None => table,
        };

        if !self.order_by.is_empty() {
            table.sort_rows_by(|lhs, rhs| {
                self.order_by
                    .iter()
                    .map(|order_by| order_by.compare(lhs, rhs))
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(Ordering::Equal)
            });
        }

        if let Some(projection) = projection {
            table = table.project(projection);
        }

        if self.distinct {
            table.distinct();
        }

        if self.offset.is_some() || self.limit.is_some() {
            table.slice_rows(self.offset.unwrap_or_default(), self.limit);
        }
        Ok(table)
    }
}
