use crate::error::QueryError;
use ontoquad_common::error::StorageError;
use ontoquad_common::QuadSource;
use ontoquad_model::{
    term_to_subject, GraphName, GraphNameRef, NamedNode, NamedNodeRef, Quad, Subject, SubjectRef,
    Term, TermRef,
};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use sparesults::{
    QueryResultsFormat, QueryResultsParser, QuerySolution, ReaderQueryResultsParserOutput,
};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, warn};

/// The default timeout of a request to a SPARQL endpoint.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// What happens if a SPARQL endpoint cannot be reached or returns an invalid response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EndpointErrorBehavior {
    /// The error is propagated to the caller.
    #[default]
    Throw,
    /// The error is logged and the pattern has no matches.
    ReturnEmpty,
}

/// Options for a [SparqlEndpoint].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointOptions {
    pub timeout_ms: u64,
    pub error_behavior: EndpointErrorBehavior,
    /// Sent as `default-graph-uri` with every request.
    pub default_graph: Option<NamedNode>,
    /// The requested result format.
    pub format: QueryResultsFormat,
}

impl Default for EndpointOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            error_behavior: EndpointErrorBehavior::default(),
            default_graph: None,
            format: QueryResultsFormat::Json,
        }
    }
}

impl EndpointOptions {
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_error_behavior(mut self, error_behavior: EndpointErrorBehavior) -> Self {
        self.error_behavior = error_behavior;
        self
    }

    #[must_use]
    pub fn with_default_graph(mut self, default_graph: NamedNode) -> Self {
        self.default_graph = Some(default_graph);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: QueryResultsFormat) -> Self {
        self.format = format;
        self
    }
}

/// A remote SPARQL endpoint used as a data source.
///
/// Every pattern is translated into a `SELECT` query that is sent with an HTTP `GET` request. The
/// response is parsed with the configured [QueryResultsFormat]. Blank nodes cannot be used to
/// address remote resources, so patterns with a ground blank node have no matches.
#[derive(Debug, Clone)]
pub struct SparqlEndpoint {
    url: String,
    options: EndpointOptions,
    client: Client,
}

impl SparqlEndpoint {
    pub fn new(url: impl Into<String>, options: EndpointOptions) -> Result<Self, QueryError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .build()
            .map_err(|error| QueryError::Endpoint {
                endpoint: url.clone(),
                error: Box::new(error),
            })?;
        Ok(Self {
            url,
            options,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &EndpointOptions {
        &self.options
    }

    fn fetch(&self, query: &str) -> Result<Vec<QuerySolution>, Box<dyn Error + Send + Sync>> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&[("query", query)])
            .header(ACCEPT, self.options.format.media_type());
        if let Some(default_graph) = &self.options.default_graph {
            request = request.query(&[("default-graph-uri", default_graph.as_str())]);
        }
        let response = request.send()?.error_for_status()?;

        match QueryResultsParser::from_format(self.options.format).for_reader(response)? {
            ReaderQueryResultsParserOutput::Solutions(solutions) => {
                Ok(solutions.collect::<Result<Vec<_>, _>>()?)
            }
            ReaderQueryResultsParserOutput::Boolean(_) => {
                Err("The endpoint returned a boolean instead of solutions".into())
            }
        }
    }
}

impl QuadSource for SparqlEndpoint {
    fn quads_for_pattern(
        &self,
        graph_name: Option<GraphNameRef<'_>>,
        subject: Option<SubjectRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Result<Vec<Quad>, StorageError> {
        let Some(query) = build_query(graph_name, subject, predicate, object) else {
            return Ok(Vec::new());
        };

        let solutions = match self.fetch(&query) {
            Ok(solutions) => solutions,
            Err(error) => match self.options.error_behavior {
                EndpointErrorBehavior::Throw => return Err(StorageError::remote(&self.url, error)),
                EndpointErrorBehavior::ReturnEmpty => {
                    warn!(endpoint = %self.url, %error, "Ignoring failed SPARQL endpoint request");
                    return Ok(Vec::new());
                }
            },
        };

        let quads = solutions
            .iter()
            .filter_map(|solution| decode_solution(solution, graph_name, subject, predicate, object))
            .collect::<Vec<_>>();
        debug!(endpoint = %self.url, matches = quads.len(), "Evaluated pattern on SPARQL endpoint");
        Ok(quads)
    }
}

/// Translates a pattern into a `SELECT` query. Returns [None] if the pattern cannot match.
fn build_query(
    graph_name: Option<GraphNameRef<'_>>,
    subject: Option<SubjectRef<'_>>,
    predicate: Option<NamedNodeRef<'_>>,
    object: Option<TermRef<'_>>,
) -> Option<String> {
    if matches!(subject, Some(SubjectRef::BlankNode(_)))
        || matches!(object, Some(TermRef::BlankNode(_)))
        || matches!(graph_name, Some(GraphNameRef::BlankNode(_)))
    {
        return None;
    }

    let subject = subject.map_or_else(|| "?s".to_owned(), |subject| subject.to_string());
    let predicate = predicate.map_or_else(|| "?p".to_owned(), |predicate| predicate.to_string());
    let object = object.map_or_else(|| "?o".to_owned(), |object| object.to_string());
    let triple = format!("{subject} {predicate} {object}");

    Some(match graph_name {
        None => format!("SELECT * WHERE {{ {{ {triple} }} UNION {{ GRAPH ?g {{ {triple} }} }} }}"),
        Some(GraphNameRef::DefaultGraph) => format!("SELECT * WHERE {{ {triple} }}"),
        Some(graph_name) => format!("SELECT * WHERE {{ GRAPH {graph_name} {{ {triple} }} }}"),
    })
}

fn decode_solution(
    solution: &QuerySolution,
    graph_name: Option<GraphNameRef<'_>>,
    subject: Option<SubjectRef<'_>>,
    predicate: Option<NamedNodeRef<'_>>,
    object: Option<TermRef<'_>>,
) -> Option<Quad> {
    let subject: Subject = match subject {
        Some(subject) => subject.into_owned(),
        None => term_to_subject(solution.get("s")?.clone())?,
    };
    let predicate = match predicate {
        Some(predicate) => predicate.into_owned(),
        None => match solution.get("p")? {
            Term::NamedNode(predicate) => predicate.clone(),
            _ => return None,
        },
    };
    let object = match object {
        Some(object) => object.into_owned(),
        None => solution.get("o")?.clone(),
    };
    let graph_name = match (graph_name, solution.get("g")) {
        (Some(graph_name), _) => graph_name.into_owned(),
        (None, Some(Term::NamedNode(graph_name))) => graph_name.clone().into(),
        (None, Some(_)) => return None,
        (None, None) => GraphName::DefaultGraph,
    };
    Some(Quad::new(subject, predicate, object, graph_name))
}
