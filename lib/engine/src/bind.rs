use crate::error::QueryError;
use crate::expression::Expression;
use crate::table::{SolutionRow, SolutionTable};
use ontoquad_model::Variable;
use tracing::trace;

/// Binds the result of an expression to a new variable (`BIND(expression AS ?variable)`).
#[derive(Clone, Debug)]
pub struct Bind {
    expression: Expression,
    variable: Variable,
}

impl Bind {
    pub fn new(expression: impl Into<Expression>, variable: Variable) -> Self {
        Self {
            expression: expression.into(),
            variable,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Evaluates the expression for every row of `table` and stores the result in a new column.
    ///
    /// Rows for which the evaluation fails leave the variable unbound. Fails if the variable is
    /// already a column of `table`.
    pub fn apply(&self, table: &mut SolutionTable) -> Result<(), QueryError> {
        if table.has_column(&self.variable) {
            return QueryError::invalid_query(format!(
                "BIND re-binds the variable {} that is already in scope",
                self.variable
            ));
        }

        let (mut columns, rows) = std::mem::take(table).into_parts();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                let value = self
                    .expression
                    .evaluate(&SolutionRow::new(&columns, &row))
                    .ok();
                row.push(value);
                row
            })
            .collect::<Vec<_>>();
        columns.push(self.variable.clone());
        trace!(variable = %self.variable, rows = rows.len(), "Evaluated BIND");
        *table = SolutionTable::from_parts(columns, rows);
        Ok(())
    }
}
