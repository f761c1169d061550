use crate::engine::QueryOptions;
use crate::error::QueryError;
use crate::table::SolutionTable;
use ontoquad_common::QuadSource;
use ontoquad_model::{
    graph_name_to_term, GraphNameRef, Pattern, PatternMember, Quad, Term, Variable,
};
use tracing::trace;

/// Matches a single `pattern` against `source`.
///
/// The columns of the resulting table are the distinct variables of the pattern in
/// (context, subject, predicate, object) order. A variable that occurs in multiple positions
/// only matches quads that hold the same term in all of these positions.
///
/// A pattern with a variable context only matches quads in named graphs. A pattern without
/// context matches quads of all graphs, unless [QueryOptions::union_default_graph] is disabled.
pub fn match_pattern(
    pattern: &Pattern,
    source: &dyn QuadSource,
    options: &QueryOptions,
) -> Result<SolutionTable, QueryError> {
    let graph_name = match pattern.context() {
        None if options.union_default_graph => None,
        None => Some(GraphNameRef::DefaultGraph),
        Some(PatternMember::NamedNode(node)) => Some(node.as_ref().into()),
        Some(PatternMember::BlankNode(node)) => Some(node.as_ref().into()),
        Some(PatternMember::Variable(_)) => None,
        Some(member @ PatternMember::Literal(_)) => {
            return QueryError::internal(format!("The context {member} is a literal"));
        }
    };
    let named_graphs_only = pattern.context().is_some_and(PatternMember::is_variable);

    let quads = source.quads_for_pattern(
        graph_name,
        pattern.subject().as_subject(),
        pattern.predicate().as_named_node(),
        pattern.object().as_term(),
    )?;

    let variables = pattern.variables();
    let mut table = SolutionTable::new(variables.clone());
    for quad in quads {
        if named_graphs_only && quad.graph_name.is_default_graph() {
            continue;
        }
        if let Some(row) = bind_quad(pattern, &variables, quad) {
            table.push_row(row);
        }
    }
    table.distinct();

    trace!(%pattern, rows = table.len(), "Matched pattern");
    Ok(table)
}

/// Binds the variables of `pattern` to the terms of `quad`. Returns [None] if a repeated variable
/// would be bound to different terms.
fn bind_quad(
    pattern: &Pattern,
    variables: &[Variable],
    quad: Quad,
) -> Option<Vec<Option<Term>>> {
    let positions = [
        (pattern.context(), graph_name_to_term(quad.graph_name)),
        (Some(pattern.subject()), Some(quad.subject.into())),
        (Some(pattern.predicate()), Some(quad.predicate.into())),
        (Some(pattern.object()), Some(quad.object)),
    ];

    let mut row: Vec<Option<Term>> = vec![None; variables.len()];
    for (member, term) in positions {
        let Some(PatternMember::Variable(variable)) = member else {
            continue;
        };
        let index = variables.iter().position(|v| v == variable)?;
        let term = term?;
        match &row[index] {
            Some(bound) if *bound != term => return None,
            Some(_) => {}
            None => row[index] = Some(term),
        }
    }
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use ontoquad_model::{GraphName, Literal, NamedNode};
    use ontoquad_storage::MemQuadStore;

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn store() -> MemQuadStore {
        let mut store = MemQuadStore::new();
        store.insert(&Quad::new(ex("a"), ex("knows"), ex("a"), GraphName::DefaultGraph));
        store.insert(&Quad::new(ex("a"), ex("knows"), ex("b"), GraphName::DefaultGraph));
        store.insert(&Quad::new(ex("b"), ex("name"), Literal::from("Bob"), ex("g")));
        store
    }

    #[test]
    fn repeated_variables_enforce_equality() -> Result<(), QueryError> {
        let x = Variable::new_unchecked("x");
        let pattern = Pattern::new(x.clone(), ex("knows"), x)?;
        let table = match_pattern(&pattern, &store(), &QueryOptions::default())?;
        assert_snapshot!(table, @r"
        | ?x |
        | <http://example.com/a> |
        ");
        Ok(())
    }

    #[test]
    fn variable_context_matches_named_graphs_only() -> Result<(), QueryError> {
        let pattern = Pattern::new_in_context(
            Variable::new_unchecked("g"),
            Variable::new_unchecked("s"),
            Variable::new_unchecked("p"),
            Variable::new_unchecked("o"),
        )?;
        let table = match_pattern(&pattern, &store(), &QueryOptions::default())?;
        assert_snapshot!(table, @r#"
        | ?g | ?s | ?p | ?o |
        | <http://example.com/g> | <http://example.com/b> | <http://example.com/name> | "Bob" |
        "#);
        Ok(())
    }

    #[test]
    fn default_graph_can_be_isolated() -> Result<(), QueryError> {
        let pattern = Pattern::new(
            Variable::new_unchecked("s"),
            ex("name"),
            Variable::new_unchecked("o"),
        )?;
        let options = QueryOptions::default();
        assert_eq!(match_pattern(&pattern, &store(), &options)?.len(), 1);

        let options = options.with_union_default_graph(false);
        assert!(match_pattern(&pattern, &store(), &options)?.is_empty());
        Ok(())
    }

    #[test]
    fn ground_pattern_behaves_like_ask() -> Result<(), QueryError> {
        let options = QueryOptions::default();
        let pattern = Pattern::new(ex("a"), ex("knows"), ex("b"))?;
        let table = match_pattern(&pattern, &store(), &options)?;
        assert!(table.columns().is_empty());
        assert_eq!(table.len(), 1);

        let pattern = Pattern::new(ex("b"), ex("knows"), ex("a"))?;
        assert!(match_pattern(&pattern, &store(), &options)?.is_empty());
        Ok(())
    }
}
