mod client;
mod error;
mod permissions;
mod results;

use async_trait::async_trait;

pub use client::{Credentials, SparqlClient, SparqlSettings};
pub use error::{GraphError, Result};
pub use permissions::{DEFAULT_PERMISSION_QUERY, GRAPH_PLACEHOLDER, SparqlPermissionCatalog};
pub use results::{Bindings, Head, SelectResults, Term};

/// Triple counts from the graph engine's public query endpoint.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Triples across every named graph, in one aggregate query.
    async fn total_triples(&self) -> Result<u64>;

    async fn named_graphs(&self) -> Result<Vec<String>>;

    async fn graph_triples(&self, graph: &str) -> Result<u64>;
}

/// The engine's own record of who owns a graph. Needs privileged access.
#[async_trait]
pub trait PermissionCatalog: Send + Sync {
    /// Principal names granted ownership of `graph`, deduplicated.
    async fn graph_principals(&self, graph: &str) -> Result<Vec<String>>;
}

/// Checks `iri` against the SPARQL `IRIREF` character rules before it is
/// spliced into a query between angle brackets.
pub fn validate_iri(iri: &str) -> Result<()> {
    let forbidden = |ch: char| {
        ch <= ' ' || matches!(ch, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
    };
    if iri.is_empty() || iri.chars().any(forbidden) {
        return Err(GraphError::InvalidIri(iri.to_string()));
    }
    Ok(())
}
