//! Merges solution tables.
//!
//! All joins are natural joins on the shared columns. Two rows are compatible if they agree on
//! every shared column that is bound in both rows. Unbound cells are filled from the other side.

use crate::table::{JoinKind, SolutionRow, SolutionTable};
use ontoquad_model::{Term, Variable};
use rustc_hash::FxHashMap;

/// Merges `right` into `left` according to the [JoinKind] of `right`.
pub fn merge(left: SolutionTable, right: SolutionTable) -> SolutionTable {
    match right.kind() {
        JoinKind::Inner => inner_join(&left, &right),
        JoinKind::LeftOptional => left_join(&left, &right),
        JoinKind::Union => union(left, right),
        JoinKind::Minus => minus(left, &right),
    }
}

/// Returns all combinations of compatible rows.
pub fn inner_join(left: &SolutionTable, right: &SolutionTable) -> SolutionTable {
    join(left, right, false)
}

/// Like [inner_join], but rows of `left` without a compatible partner are kept and padded with
/// unbound cells.
pub fn left_join(left: &SolutionTable, right: &SolutionTable) -> SolutionTable {
    join(left, right, true)
}

/// Appends the rows of `right` to the rows of `left`. The columns of the result are the columns of
/// `left` followed by the columns that only `right` has.
pub fn union(left: SolutionTable, right: SolutionTable) -> SolutionTable {
    let layout = JoinLayout::new(&left, &right);
    let width = layout.columns.len();
    let (_, left_rows) = left.into_parts();
    let (_, right_rows) = right.into_parts();

    let mut rows = Vec::with_capacity(left_rows.len() + right_rows.len());
    for mut row in left_rows {
        row.resize(width, None);
        rows.push(row);
    }
    for row in right_rows {
        let mut target = vec![None; width];
        for (value, index) in row.into_iter().zip(&layout.right_targets) {
            target[*index] = value;
        }
        rows.push(target);
    }
    SolutionTable::from_parts(layout.columns, rows)
}

/// Removes every row of `left` that is compatible with a row of `right` and shares at least one
/// bound variable with it.
pub fn minus(mut left: SolutionTable, right: &SolutionTable) -> SolutionTable {
    let shared = shared_columns(&left, right);
    if shared.is_empty() || right.is_empty() {
        return left.with_kind(JoinKind::Inner);
    }

    left.retain(|row| {
        !right.rows().any(|other| {
            let mut overlaps = false;
            for (left_index, right_index) in &shared {
                match (&row.values()[*left_index], &other.values()[*right_index]) {
                    (Some(lhs), Some(rhs)) if lhs != rhs => return false,
                    (Some(_), Some(_)) => overlaps = true,
                    _ => {}
                }
            }
            overlaps
        })
    });
    left.with_kind(JoinKind::Inner)
}

fn join(left: &SolutionTable, right: &SolutionTable, keep_unmatched: bool) -> SolutionTable {
    let layout = JoinLayout::new(left, right);
    let mut result = SolutionTable::new(layout.columns.clone());
    let index = RightIndex::new(right, &layout.shared);

    for left_row in left.rows() {
        let mut matched = false;
        for right_row in index.candidates(left_row, &layout.shared) {
            if let Some(row) = layout.merge_rows(left_row, right_row) {
                matched = true;
                result.push_row(row);
            }
        }
        if keep_unmatched && !matched {
            let mut row = left_row.values().to_vec();
            row.resize(layout.columns.len(), None);
            result.push_row(row);
        }
    }
    result
}

/// Column pairs (left index, right index) of the columns that both tables have.
fn shared_columns(left: &SolutionTable, right: &SolutionTable) -> Vec<(usize, usize)> {
    left.columns()
        .iter()
        .enumerate()
        .filter_map(|(left_index, column)| {
            right
                .column_index(column)
                .map(|right_index| (left_index, right_index))
        })
        .collect()
}

/// The column layout of a join result.
struct JoinLayout {
    /// The columns of the left table followed by the columns that only the right table has.
    columns: Vec<Variable>,
    shared: Vec<(usize, usize)>,
    /// For every column of the right table, the index of the column in the result.
    right_targets: Vec<usize>,
}

impl JoinLayout {
    fn new(left: &SolutionTable, right: &SolutionTable) -> Self {
        let mut columns = left.columns().to_vec();
        let mut right_targets = Vec::with_capacity(right.columns().len());
        for column in right.columns() {
            match left.column_index(column) {
                Some(index) => right_targets.push(index),
                None => {
                    right_targets.push(columns.len());
                    columns.push(column.clone());
                }
            }
        }
        Self {
            columns,
            shared: shared_columns(left, right),
            right_targets,
        }
    }

    /// Merges two rows or returns [None] if they are incompatible.
    fn merge_rows(
        &self,
        left: SolutionRow<'_>,
        right: SolutionRow<'_>,
    ) -> Option<Vec<Option<Term>>> {
        let mut row = left.values().to_vec();
        row.resize(self.columns.len(), None);
        for (value, target) in right.values().iter().zip(&self.right_targets) {
            let Some(value) = value else {
                continue;
            };
            match &row[*target] {
                Some(existing) if existing != value => return None,
                Some(_) => {}
                None => row[*target] = Some(value.clone()),
            }
        }
        Some(row)
    }
}

/// Hashes the rows of the right table by their shared values.
///
/// Rows with an unbound shared cell cannot be hashed and are kept in a separate list that is
/// checked for every probe.
struct RightIndex<'table> {
    table: &'table SolutionTable,
    buckets: FxHashMap<Vec<&'table Term>, Vec<usize>>,
    unhashed: Vec<usize>,
}

impl<'table> RightIndex<'table> {
    fn new(table: &'table SolutionTable, shared: &[(usize, usize)]) -> Self {
        let mut buckets: FxHashMap<Vec<&'table Term>, Vec<usize>> = FxHashMap::default();
        let mut unhashed = Vec::new();
        if !shared.is_empty() {
            for (index, row) in table.rows().enumerate() {
                match shared_key(row.values(), shared.iter().map(|(_, right)| *right)) {
                    Some(key) => buckets.entry(key).or_default().push(index),
                    None => unhashed.push(index),
                }
            }
        }
        Self {
            table,
            buckets,
            unhashed,
        }
    }

    /// Returns the rows of the right table that may be compatible with `left`.
    fn candidates(
        &self,
        left: SolutionRow<'_>,
        shared: &[(usize, usize)],
    ) -> Box<dyn Iterator<Item = SolutionRow<'table>> + '_> {
        if shared.is_empty() {
            return Box::new(self.table.rows());
        }
        match shared_key(left.values(), shared.iter().map(|(left, _)| *left)) {
            Some(key) => {
                let bucket = self
                    .buckets
                    .get(&key)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let mut indices = bucket
                    .iter()
                    .chain(&self.unhashed)
                    .copied()
                    .collect::<Vec<_>>();
                indices.sort_unstable();
                Box::new(indices.into_iter().filter_map(|index| self.table.row(index)))
            }
            None => Box::new(self.table.rows()),
        }
    }
}

fn shared_key<'table>(
    values: &'table [Option<Term>],
    indices: impl Iterator<Item = usize>,
) -> Option<Vec<&'table Term>> {
    indices.map(|index| values[index].as_ref()).collect()
}

/// Accumulates the member tables of a group or a query.
///
/// A member flagged with `union_with_next` is unioned with its successor before the union block is
/// merged. A member flagged with `minus_with_next` causes its successor to be subtracted.
#[derive(Debug)]
pub(crate) struct JoinAccumulator {
    running: SolutionTable,
    pending_union: Option<SolutionTable>,
    minus_next: bool,
}

/// Flags that control how a member table is merged by the [JoinAccumulator].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MemberFlags {
    pub optional: bool,
    pub union_with_next: bool,
    pub minus_with_next: bool,
}

impl JoinAccumulator {
    pub fn new() -> Self {
        Self {
            running: SolutionTable::identity(),
            pending_union: None,
            minus_next: false,
        }
    }

    pub fn push(&mut self, table: SolutionTable, flags: MemberFlags) {
        let table = match self.pending_union.take() {
            Some(pending) => union(pending, table),
            None => table,
        };
        if flags.union_with_next {
            self.pending_union = Some(table);
            return;
        }

        let kind = if self.minus_next {
            JoinKind::Minus
        } else if flags.optional {
            JoinKind::LeftOptional
        } else {
            JoinKind::Inner
        };
        self.minus_next = flags.minus_with_next;
        self.merge(table.with_kind(kind));
    }

    /// Merges a pending union block into the running table.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending_union.take() {
            let kind = if self.minus_next {
                JoinKind::Minus
            } else {
                JoinKind::Inner
            };
            self.minus_next = false;
            self.merge(pending.with_kind(kind));
        }
    }

    /// Gives access to the running table, e.g., for extending it with a new column.
    pub fn running_mut(&mut self) -> &mut SolutionTable {
        self.flush();
        &mut self.running
    }

    pub fn finish(mut self) -> SolutionTable {
        self.flush();
        self.running
    }

    fn merge(&mut self, table: SolutionTable) {
        let running = std::mem::take(&mut self.running);
        self.running = merge(running, table);
    }
}
