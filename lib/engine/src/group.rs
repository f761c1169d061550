use crate::bind::Bind;
use crate::engine::QueryOptions;
use crate::error::QueryError;
use crate::filter::Filter;
use crate::join::{JoinAccumulator, MemberFlags};
use crate::matcher::match_pattern;
use crate::path::PropertyPath;
use crate::table::SolutionTable;
use crate::values::Values;
use ontoquad_common::QuadSource;
use ontoquad_model::{Pattern, Variable};
use std::sync::Arc;
use tracing::trace;

/// A member of a [PatternGroup].
#[derive(Clone, Debug)]
pub enum GroupMember {
    Pattern(Pattern),
    PropertyPath(PropertyPath),
    Values(Values),
    Bind(Bind),
}

impl GroupMember {
    /// The variables that this member binds.
    pub fn variables(&self) -> Vec<Variable> {
        match self {
            Self::Pattern(pattern) => pattern.variables(),
            Self::PropertyPath(path) => path.variables(),
            Self::Values(values) => values.variables().to_vec(),
            Self::Bind(bind) => vec![bind.variable().clone()],
        }
    }
}

impl From<Pattern> for GroupMember {
    fn from(value: Pattern) -> Self {
        Self::Pattern(value)
    }
}

impl From<PropertyPath> for GroupMember {
    fn from(value: PropertyPath) -> Self {
        Self::PropertyPath(value)
    }
}

/// A named block of members (`{ ... }`) that is evaluated into a single [SolutionTable].
///
/// The members are evaluated in declaration order and merged into a running table. Optional
/// members are left-joined and members flagged with `union_with_next` are unioned with their
/// successor. The filters of the group are applied after all members have been merged.
#[derive(Clone, Debug, Default)]
pub struct PatternGroup {
    name: String,
    members: Vec<GroupMember>,
    filters: Vec<(Filter, bool)>,
}

impl PatternGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            filters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.members.push(GroupMember::Pattern(pattern));
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: PropertyPath) -> Self {
        self.members.push(GroupMember::PropertyPath(path));
        self
    }

    #[must_use]
    pub fn with_values(mut self, values: Values) -> Self {
        self.members.push(GroupMember::Values(values));
        self
    }

    #[must_use]
    pub fn with_bind(mut self, bind: Bind) -> Self {
        self.members.push(GroupMember::Bind(bind));
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push((filter, false));
        self
    }

    #[must_use]
    pub fn with_negated_filter(mut self, filter: Filter) -> Self {
        self.filters.push((filter, true));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub fn filters(&self) -> &[(Filter, bool)] {
        &self.filters
    }

    /// Returns whether a member of this group binds `variable`.
    pub fn mentions(&self, variable: &Variable) -> bool {
        self.members
            .iter()
            .any(|member| member.variables().contains(variable))
    }

    /// Evaluates the group against `source`.
    pub fn evaluate(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
    ) -> Result<SolutionTable, QueryError> {
        let mut accumulator = JoinAccumulator::new();
        let mut values_filters = Vec::new();
        let mut synthetic_variables = 0;

        for member in &self.members {
            match member {
                GroupMember::Pattern(pattern) => {
                    let table = match_pattern(pattern, source, options)?;
                    accumulator.push(
                        table,
                        MemberFlags {
                            optional: pattern.is_optional(),
                            union_with_next: pattern.join_as_union(),
                            minus_with_next: false,
                        },
                    );
                }
                GroupMember::PropertyPath(path) => {
                    if path.is_empty() {
                        continue;
                    }
                    let table = path.evaluate(source, options, &mut synthetic_variables)?;
                    accumulator.push(
                        table,
                        MemberFlags {
                            optional: path.is_optional(),
                            union_with_next: path.join_as_union(),
                            minus_with_next: false,
                        },
                    );
                }
                GroupMember::Values(values) => {
                    let table = values.to_table();
                    values_filters.push(Filter::Values(Arc::new(table.clone())));
                    accumulator.push(table, MemberFlags::default());
                }
                GroupMember::Bind(bind) => bind.apply(accumulator.running_mut())?,
            }
        }
        let mut table = accumulator.finish();

        for (filter, _) in &self.filters {
            filter.prepare(source, options)?;
        }
        table.retain(|row| {
            self.filters
                .iter()
                .all(|(filter, negate)| filter.apply(row, *negate))
                && values_filters.iter().all(|filter| filter.apply(row, false))
        });

        trace!(group = %self.name, rows = table.len(), "Evaluated pattern group");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{ComparisonOperator, Expression};
    use insta::assert_snapshot;
    use ontoquad_model::vocab::xsd;
    use ontoquad_model::{GraphName, Literal, NamedNode, Quad};
    use ontoquad_storage::MemQuadStore;

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn store() -> MemQuadStore {
        let mut store = MemQuadStore::new();
        for (person, name, age) in [("alice", "Alice", "30"), ("bob", "Bob", "17")] {
            store.insert(&Quad::new(
                ex(person),
                ex("name"),
                Literal::from(name),
                GraphName::DefaultGraph,
            ));
            store.insert(&Quad::new(
                ex(person),
                ex("age"),
                Literal::new_typed_literal(age, xsd::INTEGER),
                GraphName::DefaultGraph,
            ));
        }
        store.insert(&Quad::new(
            ex("carol"),
            ex("name"),
            Literal::from("Carol"),
            GraphName::DefaultGraph,
        ));
        store.insert(&Quad::new(
            ex("alice"),
            ex("knows"),
            ex("bob"),
            GraphName::DefaultGraph,
        ));
        store
    }

    fn ordered(mut table: SolutionTable) -> SolutionTable {
        table.sort_rows_by(|lhs, rhs| {
            let key = |row: &crate::table::SolutionRow<'_>| {
                row.values()
                    .iter()
                    .map(|value| value.as_ref().map(ToString::to_string))
                    .collect::<Vec<_>>()
            };
            key(lhs).cmp(&key(rhs))
        });
        table
    }

    #[test]
    fn optional_members_pad_with_unbound() -> Result<(), QueryError> {
        let group = PatternGroup::new("people")
            .with_pattern(Pattern::new(var("p"), ex("name"), var("name"))?)
            .with_pattern(Pattern::new(var("p"), ex("age"), var("age"))?.optional());
        let table = group.evaluate(&store(), &QueryOptions::default())?;
        assert_snapshot!(ordered(table), @r#"
        | ?p | ?name | ?age |
        | <http://example.com/alice> | "Alice" | "30"^^<http://www.w3.org/2001/XMLSchema#integer> |
        | <http://example.com/bob> | "Bob" | "17"^^<http://www.w3.org/2001/XMLSchema#integer> |
        | <http://example.com/carol> | "Carol" |  |
        "#);
        Ok(())
    }

    #[test]
    fn filters_run_after_all_members() -> Result<(), QueryError> {
        let group = PatternGroup::new("adults")
            .with_filter(Filter::comparison(
                ComparisonOperator::Greater,
                var("age"),
                Literal::new_typed_literal("18", xsd::INTEGER),
            ))
            .with_pattern(Pattern::new(var("p"), ex("age"), var("age"))?);
        let table = group.evaluate(&store(), &QueryOptions::default())?;
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.row(0).and_then(|row| row.value(&var("p")).cloned()),
            Some(ex("alice").into())
        );
        Ok(())
    }

    #[test]
    fn values_restrict_the_group() -> Result<(), QueryError> {
        let values = Values::new(vec![var("p")])?.with_row(vec![Some(ex("bob").into())])?;
        let group = PatternGroup::new("bob")
            .with_pattern(Pattern::new(var("p"), ex("name"), var("name"))?)
            .with_values(values);
        let table = group.evaluate(&store(), &QueryOptions::default())?;
        assert_snapshot!(table, @r#"
        | ?p | ?name |
        | <http://example.com/bob> | "Bob" |
        "#);
        Ok(())
    }

    #[test]
    fn bind_extends_the_running_table() -> Result<(), QueryError> {
        let group = PatternGroup::new("next-year")
            .with_pattern(Pattern::new(ex("alice"), ex("age"), var("age"))?)
            .with_bind(Bind::new(
                Expression::Add(
                    Box::new(var("age").into()),
                    Box::new(Literal::new_typed_literal("1", xsd::INTEGER).into()),
                ),
                var("next"),
            ));
        let table = group.evaluate(&store(), &QueryOptions::default())?;
        assert_snapshot!(table, @r#"
        | ?age | ?next |
        | "30"^^<http://www.w3.org/2001/XMLSchema#integer> | "31"^^<http://www.w3.org/2001/XMLSchema#integer> |
        "#);
        Ok(())
    }

    #[test]
    fn union_members_combine_before_joining() -> Result<(), QueryError> {
        let group = PatternGroup::new("union")
            .with_pattern(Pattern::new(var("p"), ex("knows"), var("o"))?.union_with_next())
            .with_pattern(Pattern::new(var("p"), ex("age"), var("o"))?);
        let table = group.evaluate(&store(), &QueryOptions::default())?;
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns(), &[var("p"), var("o")]);
        Ok(())
    }

    #[test]
    fn paths_without_steps_are_skipped() -> Result<(), QueryError> {
        let group = PatternGroup::new("empty-path")
            .with_pattern(Pattern::new(var("p"), ex("knows"), var("o"))?)
            .with_path(PropertyPath::new(var("p"), var("x"))?);
        let table = group.evaluate(&store(), &QueryOptions::default())?;
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns(), &[var("p"), var("o")]);
        Ok(())
    }
}
