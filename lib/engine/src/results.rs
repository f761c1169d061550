use crate::table::SolutionTable;
use ontoquad_model::{
    graph_name_to_term, term_to_graph_name, term_to_subject, Graph, GraphName, Quad, Term, Triple,
    Variable,
};
use ontoquad_storage::MemQuadStore;
use rustc_hash::FxHashSet;

/// The solutions of a `SELECT` query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectQueryResult {
    table: SolutionTable,
}

impl SelectQueryResult {
    pub fn new(table: SolutionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SolutionTable {
        &self.table
    }

    pub fn into_table(self) -> SolutionTable {
        self.table
    }

    pub fn variables(&self) -> &[Variable] {
        self.table.columns()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// The answer to an `ASK` query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AskQueryResult(bool);

impl AskQueryResult {
    pub fn new(value: bool) -> Self {
        Self(value)
    }

    pub fn value(self) -> bool {
        self.0
    }
}

impl From<AskQueryResult> for bool {
    fn from(value: AskQueryResult) -> Self {
        value.0
    }
}

fn subject_column() -> Variable {
    Variable::new_unchecked("SUBJECT")
}

fn predicate_column() -> Variable {
    Variable::new_unchecked("PREDICATE")
}

fn object_column() -> Variable {
    Variable::new_unchecked("OBJECT")
}

fn context_column() -> Variable {
    Variable::new_unchecked("CONTEXT")
}

/// Builds a `?SUBJECT ?PREDICATE ?OBJECT` table. The `?CONTEXT` column is only added if a quad is
/// in a named graph. Duplicate quads are removed.
fn quads_to_table(quads: impl IntoIterator<Item = Quad>) -> SolutionTable {
    let mut seen = FxHashSet::default();
    let quads = quads
        .into_iter()
        .filter(|quad| seen.insert(quad.clone()))
        .collect::<Vec<_>>();
    let with_context = quads.iter().any(|quad| !quad.graph_name.is_default_graph());

    let mut columns = vec![subject_column(), predicate_column(), object_column()];
    if with_context {
        columns.push(context_column());
    }
    let rows = quads
        .into_iter()
        .map(|quad| {
            let mut row = vec![
                Some(quad.subject.into()),
                Some(quad.predicate.into()),
                Some(quad.object),
            ];
            if with_context {
                row.push(graph_name_to_term(quad.graph_name));
            }
            row
        })
        .collect();
    SolutionTable::from_parts(columns, rows)
}

/// Decodes the rows of a table built by [quads_to_table]. Rows that do not form a valid quad are
/// skipped.
fn table_to_quads(table: &SolutionTable) -> Vec<Quad> {
    let columns = [
        subject_column(),
        predicate_column(),
        object_column(),
        context_column(),
    ];
    table
        .rows()
        .filter_map(|row| {
            let subject = term_to_subject(row.value(&columns[0])?.clone())?;
            let Term::NamedNode(predicate) = row.value(&columns[1])?.clone() else {
                return None;
            };
            let object = row.value(&columns[2])?.clone();
            let graph_name = match row.value(&columns[3]) {
                Some(context) => term_to_graph_name(context.clone())?,
                None => GraphName::DefaultGraph,
            };
            Some(Quad::new(subject, predicate, object, graph_name))
        })
        .collect()
}

macro_rules! graph_query_result {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            table: SolutionTable,
        }

        impl $name {
            pub fn from_quads(quads: impl IntoIterator<Item = Quad>) -> Self {
                Self {
                    table: quads_to_table(quads),
                }
            }

            /// Creates a result from the triples of `graph`. The triples are put into the default
            /// graph.
            pub fn from_graph(graph: &Graph) -> Self {
                Self::from_quads(
                    graph
                        .iter()
                        .map(|triple| triple.into_owned().in_graph(GraphName::DefaultGraph)),
                )
            }

            /// The `?SUBJECT ?PREDICATE ?OBJECT [?CONTEXT]` table.
            pub fn table(&self) -> &SolutionTable {
                &self.table
            }

            pub fn len(&self) -> usize {
                self.table.len()
            }

            pub fn is_empty(&self) -> bool {
                self.table.is_empty()
            }

            pub fn quads(&self) -> Vec<Quad> {
                table_to_quads(&self.table)
            }

            /// Collects the triples of all graphs into a single [Graph].
            pub fn to_graph(&self) -> Graph {
                let mut graph = Graph::new();
                for quad in self.quads() {
                    graph.insert(&Triple::from(quad));
                }
                graph
            }

            pub fn to_store(&self) -> MemQuadStore {
                let mut store = MemQuadStore::new();
                store.extend(&self.quads());
                store
            }
        }
    };
}

graph_query_result!(
    /// The triples built by a `CONSTRUCT` query.
    ConstructQueryResult
);

graph_query_result!(
    /// The description of the resources of a `DESCRIBE` query.
    DescribeQueryResult
);

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use ontoquad_model::{Literal, NamedNode};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    #[test]
    fn context_column_only_for_named_graphs() {
        let result = ConstructQueryResult::from_quads([Quad::new(
            ex("a"),
            ex("p"),
            Literal::from("x"),
            GraphName::DefaultGraph,
        )]);
        assert_snapshot!(result.table(), @r#"
        | ?SUBJECT | ?PREDICATE | ?OBJECT |
        | <http://example.com/a> | <http://example.com/p> | "x" |
        "#);

        let result = DescribeQueryResult::from_quads([
            Quad::new(ex("a"), ex("p"), ex("b"), GraphName::DefaultGraph),
            Quad::new(ex("a"), ex("p"), ex("b"), ex("g")),
            Quad::new(ex("a"), ex("p"), ex("b"), ex("g")),
        ]);
        assert_snapshot!(result.table(), @r"
        | ?SUBJECT | ?PREDICATE | ?OBJECT | ?CONTEXT |
        | <http://example.com/a> | <http://example.com/p> | <http://example.com/b> |  |
        | <http://example.com/a> | <http://example.com/p> | <http://example.com/b> | <http://example.com/g> |
        ");
    }

    #[test]
    fn graph_round_trip() {
        let mut graph = Graph::new();
        graph.insert(&Triple::new(ex("a"), ex("p"), ex("b")));
        graph.insert(&Triple::new(ex("b"), ex("q"), Literal::from("c")));
        let result = ConstructQueryResult::from_graph(&graph);
        assert_eq!(result.to_graph(), graph);
        assert_eq!(result.to_store().len(), 2);
    }
}
