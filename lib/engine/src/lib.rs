//! The query engine of ontoquad.
//!
//! Queries are built from [PatternGroup]s and subqueries. Every pattern is matched against a
//! [QuadSource](ontoquad_common::QuadSource), the resulting [SolutionTable]s are joined, filtered,
//! and finally passed through the solution modifiers. A [QueryEngine] binds a data source to a
//! set of [QueryOptions].

mod aggregate;
mod bind;
mod endpoint;
mod engine;
pub mod error;
mod expression;
mod filter;
mod group;
pub mod join;
mod matcher;
mod modifier;
mod path;
mod query;
pub mod results;
mod table;
mod values;

pub use aggregate::{AggregateFunction, Aggregator, Having};
pub use bind::Bind;
pub use endpoint::{EndpointErrorBehavior, EndpointOptions, SparqlEndpoint, DEFAULT_TIMEOUT_MS};
pub use engine::{QueryEngine, QueryOptions};
pub use error::QueryError;
pub use expression::{
    lang_matches, ComparisonOperator, CustomExpression, Expression, RegexMatcher,
};
pub use filter::{ExistsFilter, Filter};
pub use group::{GroupMember, PatternGroup};
pub use matcher::match_pattern;
pub use modifier::{GroupBy, Modifier, ModifierPipeline, OrderBy};
pub use path::{PathAlternative, PathExpansion, PathStep, PropertyPath};
pub use query::{
    AskQuery, ConstructQuery, DescribeQuery, QueryBody, QueryMember, QueryMemberKind, SelectQuery,
};
pub use results::{AskQueryResult, ConstructQueryResult, DescribeQueryResult, SelectQueryResult};
pub use sparesults::QueryResultsFormat;
pub use table::{JoinKind, SolutionRow, SolutionTable};
pub use values::Values;
