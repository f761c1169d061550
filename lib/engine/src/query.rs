use crate::engine::QueryOptions;
use crate::error::QueryError;
use crate::group::PatternGroup;
use crate::join::{inner_join, JoinAccumulator, MemberFlags};
use crate::modifier::{Modifier, ModifierPipeline};
use crate::results::{AskQueryResult, ConstructQueryResult, DescribeQueryResult, SelectQueryResult};
use crate::table::{SolutionRow, SolutionTable};
use crate::values::Values;
use ontoquad_common::QuadSource;
use ontoquad_model::{
    term_to_graph_name, term_to_subject, BlankNode, GraphName, Pattern, PatternMember, Quad,
    Subject, Term, Variable,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// What a [QueryMember] evaluates.
#[derive(Clone, Debug)]
pub enum QueryMemberKind {
    Group(PatternGroup),
    Subquery(Box<SelectQuery>),
}

/// A top-level member of a query: a pattern group or a subquery.
#[derive(Clone, Debug)]
pub struct QueryMember {
    kind: QueryMemberKind,
    optional: bool,
    union_with_next: bool,
    minus_with_next: bool,
}

impl QueryMember {
    pub fn group(group: PatternGroup) -> Self {
        Self::new(QueryMemberKind::Group(group))
    }

    pub fn subquery(query: SelectQuery) -> Self {
        Self::new(QueryMemberKind::Subquery(Box::new(query)))
    }

    fn new(kind: QueryMemberKind) -> Self {
        Self {
            kind,
            optional: false,
            union_with_next: false,
            minus_with_next: false,
        }
    }

    /// Left-joins the solutions of this member.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Unions the solutions of this member with the solutions of the next member.
    #[must_use]
    pub fn union_with_next(mut self) -> Self {
        self.union_with_next = true;
        self
    }

    /// Removes the solutions of the next member from the solutions up to this member.
    #[must_use]
    pub fn minus_with_next(mut self) -> Self {
        self.minus_with_next = true;
        self
    }

    pub fn kind(&self) -> &QueryMemberKind {
        &self.kind
    }

    fn flags(&self) -> MemberFlags {
        MemberFlags {
            optional: self.optional,
            union_with_next: self.union_with_next,
            minus_with_next: self.minus_with_next,
        }
    }

    fn mentions(&self, variable: &Variable) -> bool {
        match &self.kind {
            QueryMemberKind::Group(group) => group.mentions(variable),
            QueryMemberKind::Subquery(query) => query.projects(variable),
        }
    }
}

impl From<PatternGroup> for QueryMember {
    fn from(value: PatternGroup) -> Self {
        Self::group(value)
    }
}

impl From<SelectQuery> for QueryMember {
    fn from(value: SelectQuery) -> Self {
        Self::subquery(value)
    }
}

/// The `WHERE` clause of a query.
#[derive(Clone, Debug, Default)]
pub struct QueryBody {
    members: Vec<QueryMember>,
    values: Option<Values>,
}

impl QueryBody {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_member(mut self, member: impl Into<QueryMember>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Sets the `VALUES` of the query. They are joined with the solutions of the members and
    /// injected into the subqueries that use all of their variables.
    #[must_use]
    pub fn with_values(mut self, values: Values) -> Self {
        self.values = Some(values);
        self
    }

    pub fn members(&self) -> &[QueryMember] {
        &self.members
    }

    pub fn values(&self) -> Option<&Values> {
        self.values.as_ref()
    }

    fn mentions(&self, variable: &Variable) -> bool {
        self.members.iter().any(|member| member.mentions(variable))
    }

    fn evaluate(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
        injected: Option<&Values>,
    ) -> Result<SolutionTable, QueryError> {
        let mut accumulator = JoinAccumulator::new();
        for member in &self.members {
            let table = match &member.kind {
                QueryMemberKind::Group(group) => group.evaluate(source, options)?,
                QueryMemberKind::Subquery(query) => {
                    let injected = self
                        .values
                        .as_ref()
                        .filter(|values| query.accepts_injection(values))
                        .map(Values::injected_copy);
                    query.evaluate_table(source, options, injected.as_ref())?
                }
            };
            accumulator.push(table, member.flags());
        }

        let mut table = accumulator.finish();
        for values in self.values.iter().chain(injected) {
            table = inner_join(&table, &values.to_table());
        }
        Ok(table)
    }
}

/// A `SELECT` query.
#[derive(Clone, Debug, Default)]
pub struct SelectQuery {
    body: QueryBody,
    projection: Option<Vec<Variable>>,
    modifiers: Vec<Modifier>,
}

impl SelectQuery {
    /// Creates a `SELECT *` query.
    pub fn new(body: QueryBody) -> Self {
        Self {
            body,
            projection: None,
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_projection(mut self, variables: Vec<Variable>) -> Self {
        self.projection = Some(variables);
        self
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn body(&self) -> &QueryBody {
        &self.body
    }

    pub fn projection(&self) -> Option<&[Variable]> {
        self.projection.as_deref()
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Returns whether `variable` is part of the solutions of this query.
    pub fn projects(&self, variable: &Variable) -> bool {
        match &self.projection {
            Some(projection) => projection.contains(variable),
            None => self.body.mentions(variable),
        }
    }

    pub fn evaluate(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
    ) -> Result<SelectQueryResult, QueryError> {
        let table = self.evaluate_table(source, options, None)?;
        debug!(columns = table.columns().len(), rows = table.len(), "Evaluated SELECT query");
        Ok(SelectQueryResult::new(table))
    }

    fn accepts_injection(&self, values: &Values) -> bool {
        values
            .variables()
            .iter()
            .all(|variable| self.body.mentions(variable) && self.projects(variable))
    }

    fn evaluate_table(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
        injected: Option<&Values>,
    ) -> Result<SolutionTable, QueryError> {
        let table = self.body.evaluate(source, options, injected)?;
        ModifierPipeline::new(&self.modifiers).apply(table, self.projection())
    }
}

/// An `ASK` query.
#[derive(Clone, Debug, Default)]
pub struct AskQuery {
    body: QueryBody,
}

impl AskQuery {
    pub fn new(body: QueryBody) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &QueryBody {
        &self.body
    }

    pub fn evaluate(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
    ) -> Result<AskQueryResult, QueryError> {
        let table = self.body.evaluate(source, options, None)?;
        debug!(rows = table.len(), "Evaluated ASK query");
        Ok(AskQueryResult::new(!table.is_empty()))
    }
}

/// A `CONSTRUCT` query.
///
/// The template is instantiated once per solution. Blank nodes of the template are replaced with
/// fresh blank nodes for every solution. Instantiations with unbound variables or with terms
/// that are invalid in their position (e.g., a literal as subject) are skipped.
#[derive(Clone, Debug, Default)]
pub struct ConstructQuery {
    template: Vec<Pattern>,
    body: QueryBody,
    modifiers: Vec<Modifier>,
}

impl ConstructQuery {
    pub fn new(template: Vec<Pattern>, body: QueryBody) -> Self {
        Self {
            template,
            body,
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn template(&self) -> &[Pattern] {
        &self.template
    }

    pub fn body(&self) -> &QueryBody {
        &self.body
    }

    pub fn evaluate(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
    ) -> Result<ConstructQueryResult, QueryError> {
        let table = self.body.evaluate(source, options, None)?;
        let table = ModifierPipeline::new(&self.modifiers).apply(table, None)?;

        let mut quads = Vec::new();
        for row in table.rows() {
            let mut blank_nodes = FxHashMap::default();
            quads.extend(
                self.template
                    .iter()
                    .filter_map(|pattern| instantiate(pattern, &row, &mut blank_nodes)),
            );
        }
        debug!(
            solutions = table.len(),
            quads = quads.len(),
            "Evaluated CONSTRUCT query"
        );
        Ok(ConstructQueryResult::from_quads(quads))
    }
}

fn instantiate(
    pattern: &Pattern,
    row: &SolutionRow<'_>,
    blank_nodes: &mut FxHashMap<BlankNode, BlankNode>,
) -> Option<Quad> {
    let mut resolve = |member: &PatternMember| -> Option<Term> {
        match member {
            PatternMember::Variable(variable) => row.value(variable).cloned(),
            PatternMember::BlankNode(node) => Some(
                blank_nodes
                    .entry(node.clone())
                    .or_insert_with(BlankNode::default)
                    .clone()
                    .into(),
            ),
            PatternMember::NamedNode(node) => Some(node.clone().into()),
            PatternMember::Literal(literal) => Some(literal.clone().into()),
        }
    };

    let subject = term_to_subject(resolve(pattern.subject())?)?;
    let Term::NamedNode(predicate) = resolve(pattern.predicate())? else {
        return None;
    };
    let object = resolve(pattern.object())?;
    let graph_name = match pattern.context() {
        Some(context) => term_to_graph_name(resolve(context)?)?,
        None => GraphName::DefaultGraph,
    };
    Some(Quad::new(subject, predicate, object, graph_name))
}

/// A `DESCRIBE` query.
///
/// The description of a resource consists of all quads that have the resource as subject.
/// Variables among the resources are resolved with the solutions of the body.
#[derive(Clone, Debug, Default)]
pub struct DescribeQuery {
    resources: Vec<PatternMember>,
    body: QueryBody,
}

impl DescribeQuery {
    pub fn new(resources: Vec<PatternMember>, body: QueryBody) -> Self {
        Self { resources, body }
    }

    pub fn resources(&self) -> &[PatternMember] {
        &self.resources
    }

    pub fn body(&self) -> &QueryBody {
        &self.body
    }

    pub fn evaluate(
        &self,
        source: &dyn QuadSource,
        options: &QueryOptions,
    ) -> Result<DescribeQueryResult, QueryError> {
        let table = self.body.evaluate(source, options, None)?;

        let mut seen = FxHashSet::default();
        let mut subjects = Vec::new();
        for resource in &self.resources {
            let candidates: Vec<Subject> = match resource {
                PatternMember::Variable(variable) => table
                    .column_values(variable)
                    .unwrap_or_default()
                    .into_iter()
                    .flatten()
                    .filter_map(|term| term_to_subject(term.clone()))
                    .collect(),
                _ => resource
                    .as_subject()
                    .map(|subject| vec![subject.into_owned()])
                    .unwrap_or_default(),
            };
            subjects.extend(
                candidates
                    .into_iter()
                    .filter(|subject| seen.insert(subject.clone())),
            );
        }

        let mut quads = Vec::new();
        for subject in &subjects {
            quads.extend(source.quads_for_pattern(None, Some(subject.as_ref()), None, None)?);
        }
        debug!(
            resources = subjects.len(),
            quads = quads.len(),
            "Evaluated DESCRIBE query"
        );
        Ok(DescribeQueryResult::from_quads(quads))
    }
}
