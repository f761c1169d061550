use crate::error::QueryError;
use itertools::Itertools;
use ontoquad_model::{Term, Variable};
use rustc_hash::FxHashSet;
use std::fmt::{Display, Formatter};

/// Describes how a [SolutionTable] is merged into the table of the preceding members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// Natural join on the shared columns.
    #[default]
    Inner,
    /// Left-outer join. Rows of the preceding table survive without a partner.
    LeftOptional,
    /// Row union with a column superset.
    Union,
    /// Removes the compatible rows from the preceding table.
    Minus,
}

/// A table of solutions.
///
/// The columns are variables and every row holds one optional term per column. An absent term
/// means that the variable is unbound in this solution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolutionTable {
    columns: Vec<Variable>,
    rows: Vec<Vec<Option<Term>>>,
    kind: JoinKind,
}

impl SolutionTable {
    /// Creates a table with the given columns and no rows.
    pub fn new(columns: Vec<Variable>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            kind: JoinKind::Inner,
        }
    }

    /// Creates a table with the given columns and rows.
    ///
    /// Fails if a row does not have one cell per column or if a column appears twice.
    pub fn try_new(
        columns: Vec<Variable>,
        rows: Vec<Vec<Option<Term>>>,
    ) -> Result<Self, QueryError> {
        if !columns.iter().all_unique() {
            return QueryError::invalid_query("The columns of a solution table must be unique");
        }
        if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
            return QueryError::invalid_query(format!(
                "Expected {} cells per row, found {}",
                columns.len(),
                row.len()
            ));
        }
        Ok(Self {
            columns,
            rows,
            kind: JoinKind::Inner,
        })
    }

    /// The neutral element of the join: no columns and a single empty row.
    pub fn identity() -> Self {
        Self {
            columns: Vec::new(),
            rows: vec![Vec::new()],
            kind: JoinKind::Inner,
        }
    }

    /// A table without columns and without rows. Joining with it always yields no rows.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn columns(&self) -> &[Variable] {
        &self.columns
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    #[must_use]
    pub fn with_kind(mut self, kind: JoinKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, variable: &Variable) -> Option<usize> {
        self.columns.iter().position(|column| column == variable)
    }

    pub fn has_column(&self, variable: &Variable) -> bool {
        self.column_index(variable).is_some()
    }

    pub fn row(&self, index: usize) -> Option<SolutionRow<'_>> {
        self.rows.get(index).map(|values| SolutionRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = SolutionRow<'_>> {
        self.rows.iter().map(|values| SolutionRow {
            columns: &self.columns,
            values,
        })
    }

    /// Returns the value of `variable` in every row or [None] if there is no such column.
    pub fn column_values(&self, variable: &Variable) -> Option<Vec<Option<&Term>>> {
        let index = self.column_index(variable)?;
        Some(self.rows.iter().map(|row| row[index].as_ref()).collect())
    }

    pub fn into_rows(self) -> Vec<Vec<Option<Term>>> {
        self.rows
    }

    pub(crate) fn into_parts(self) -> (Vec<Variable>, Vec<Vec<Option<Term>>>) {
        (self.columns, self.rows)
    }

    /// Creates a table without checking the row widths.
    pub(crate) fn from_parts(columns: Vec<Variable>, rows: Vec<Vec<Option<Term>>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self {
            columns,
            rows,
            kind: JoinKind::Inner,
        }
    }

    pub(crate) fn push_row(&mut self, row: Vec<Option<Term>>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Appends the column `variable` with unbound cells. Returns the index of the column.
    ///
    /// If the column already exists, its index is returned and the table is not modified.
    pub fn add_column(&mut self, variable: Variable) -> usize {
        if let Some(index) = self.column_index(&variable) {
            return index;
        }
        self.columns.push(variable);
        for row in &mut self.rows {
            row.push(None);
        }
        self.columns.len() - 1
    }

    /// Keeps only the rows for which `predicate` returns `true`.
    pub fn retain(&mut self, mut predicate: impl FnMut(&SolutionRow<'_>) -> bool) {
        let columns = &self.columns;
        self.rows.retain(|values| predicate(&SolutionRow { columns, values }));
    }

    /// Projects the table onto `variables`. Variables that are not a column yield unbound cells.
    #[must_use]
    pub fn project(&self, variables: &[Variable]) -> Self {
        let indices = variables
            .iter()
            .map(|variable| self.column_index(variable))
            .collect::<Vec<_>>();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|index| index.and_then(|index| row[index].clone()))
                    .collect()
            })
            .collect();
        Self {
            columns: variables.to_vec(),
            rows,
            kind: self.kind,
        }
    }

    /// Removes all columns for which `predicate` returns `true`.
    #[must_use]
    pub fn drop_columns(self, predicate: impl Fn(&Variable) -> bool) -> Self {
        let kept = self
            .columns
            .iter()
            .filter(|column| !predicate(column))
            .cloned()
            .collect::<Vec<_>>();
        if kept.len() == self.columns.len() {
            return self;
        }
        self.project(&kept)
    }

    /// Removes duplicate rows, keeping the first occurrence.
    pub fn distinct(&mut self) {
        let mut seen = FxHashSet::default();
        self.rows.retain(|row| seen.insert(row.clone()));
    }

    pub(crate) fn sort_rows_by(
        &mut self,
        mut compare: impl FnMut(&SolutionRow<'_>, &SolutionRow<'_>) -> std::cmp::Ordering,
    ) {
        let columns = &self.columns;
        self.rows.sort_by(|lhs, rhs| {
            compare(
                &SolutionRow {
                    columns,
                    values: lhs,
                },
                &SolutionRow {
                    columns,
                    values: rhs,
                },
            )
        });
    }

    pub(crate) fn slice_rows(&mut self, offset: usize, limit: Option<usize>) {
        let end = limit.map_or(self.rows.len(), |limit| {
            offset.saturating_add(limit).min(self.rows.len())
        });
        let start = offset.min(end);
        self.rows.truncate(end);
        self.rows.drain(..start);
    }
}

/// Renders the table as a simple pipe-separated grid. Unbound cells are empty.
impl Display for SolutionTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("|")?;
        for column in &self.columns {
            write!(f, " {column} |")?;
        }
        for row in &self.rows {
            f.write_str("\n|")?;
            for value in row {
                match value {
                    Some(value) => write!(f, " {value} |")?,
                    None => f.write_str("  |")?,
                }
            }
        }
        Ok(())
    }
}

/// A borrowed row of a [SolutionTable].
#[derive(Clone, Copy, Debug)]
pub struct SolutionRow<'table> {
    columns: &'table [Variable],
    values: &'table [Option<Term>],
}

impl<'table> SolutionRow<'table> {
    /// Creates a row from its parts. `columns` and `values` must have the same length.
    pub fn new(columns: &'table [Variable], values: &'table [Option<Term>]) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Looks up `variable`.
    ///
    /// Returns [None] if the row has no such column and `Some(None)` if the variable is unbound.
    pub fn get(&self, variable: &Variable) -> Option<Option<&'table Term>> {
        let index = self.columns.iter().position(|column| column == variable)?;
        Some(self.values[index].as_ref())
    }

    /// Returns the bound value of `variable`.
    pub fn value(&self, variable: &Variable) -> Option<&'table Term> {
        self.get(variable).flatten()
    }

    pub fn columns(&self) -> &'table [Variable] {
        self.columns
    }

    pub fn values(&self) -> &'table [Option<Term>] {
        self.values
    }

    /// Iterates over the bound (variable, value) pairs of this row.
    pub fn bindings(&self) -> impl Iterator<Item = (&'table Variable, &'table Term)> {
        self.columns
            .iter()
            .zip(self.values)
            .filter_map(|(variable, value)| value.as_ref().map(|value| (variable, value)))
    }

    /// Returns whether `other` agrees with this row on all columns bound in both rows.
    pub fn is_compatible_with(&self, other: &SolutionRow<'_>) -> bool {
        self.bindings()
            .all(|(variable, value)| other.value(variable).is_none_or(|other| other == value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use ontoquad_model::{Literal, NamedNode};

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn table() -> SolutionTable {
        SolutionTable::try_new(
            vec![var("x"), var("y")],
            vec![
                vec![
                    Some(NamedNode::new_unchecked("http://example.com/a").into()),
                    Some(Literal::from("A").into()),
                ],
                vec![
                    Some(NamedNode::new_unchecked("http://example.com/b").into()),
                    None,
                ],
                vec![
                    Some(NamedNode::new_unchecked("http://example.com/a").into()),
                    Some(Literal::from("A").into()),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn display_renders_unbound_cells_empty() {
        assert_snapshot!(table(), @r#"
        | ?x | ?y |
        | <http://example.com/a> | "A" |
        | <http://example.com/b> |  |
        | <http://example.com/a> | "A" |
        "#);
    }

    #[test]
    fn rejects_rows_with_wrong_width() {
        let result = SolutionTable::try_new(vec![var("x")], vec![vec![None, None]]);
        assert!(matches!(result, Err(QueryError::InvalidQuery(_))));
    }

    #[test]
    fn distinct_keeps_first_occurrence() {
        let mut table = table();
        table.distinct();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn project_pads_missing_columns() {
        let projected = table().project(&[var("y"), var("z")]);
        assert_eq!(projected.columns(), &[var("y"), var("z")]);
        assert!(projected.rows().all(|row| row.value(&var("z")).is_none()));
    }

    #[test]
    fn slice_rows_handles_out_of_range() {
        let mut table = table();
        table.slice_rows(2, Some(5));
        assert_eq!(table.len(), 1);
        let mut table = self::table();
        table.slice_rows(10, None);
        assert!(table.is_empty());
    }

    #[test]
    fn row_lookup_distinguishes_absent_and_unbound() {
        let table = table();
        let row = table.row(1).unwrap();
        assert_eq!(row.get(&var("y")), Some(None));
        assert_eq!(row.get(&var("z")), None);
    }
}
