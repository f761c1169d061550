use crate::error::QueryError;
use crate::table::SolutionTable;
use itertools::Itertools;
use ontoquad_model::{Term, Variable};

/// An inline table of bindings (`VALUES`).
///
/// Inside a pattern group, the bindings are joined with the other members and additionally act
/// as a filter on the result of the group. The bindings of a query are injected into the
/// subqueries that use their variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Values {
    variables: Vec<Variable>,
    bindings: Vec<Vec<Option<Term>>>,
    injected: bool,
}

impl Values {
    /// Creates an empty set of bindings for `variables`.
    pub fn new(variables: Vec<Variable>) -> Result<Self, QueryError> {
        if !variables.iter().all_unique() {
            return QueryError::invalid_query("The variables of VALUES must be unique");
        }
        Ok(Self {
            variables,
            bindings: Vec::new(),
            injected: false,
        })
    }

    /// Appends a row of bindings. `None` leaves the variable unbound (`UNDEF`).
    pub fn with_row(mut self, row: Vec<Option<Term>>) -> Result<Self, QueryError> {
        if row.len() != self.variables.len() {
            return QueryError::invalid_query(format!(
                "VALUES expects {} terms per row, found {}",
                self.variables.len(),
                row.len()
            ));
        }
        self.bindings.push(row);
        Ok(self)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Whether these bindings were propagated from an enclosing query.
    pub fn is_injected(&self) -> bool {
        self.injected
    }

    /// Creates a copy that is flagged as injected.
    #[must_use]
    pub fn injected_copy(&self) -> Self {
        Self {
            injected: true,
            ..self.clone()
        }
    }

    pub fn to_table(&self) -> SolutionTable {
        SolutionTable::from_parts(self.variables.clone(), self.bindings.clone())
    }
}
