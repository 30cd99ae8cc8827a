use async_trait::async_trait;
use tracing::debug;

use crate::client::{SparqlClient, SparqlSettings};
use crate::error::{GraphError, Result};
use crate::{PermissionCatalog, validate_iri};

pub const GRAPH_PLACEHOLDER: &str = "{graph}";

/// Principals holding `acl:Control` over a graph, per W3C Web Access Control.
pub const DEFAULT_PERMISSION_QUERY: &str = r#"PREFIX acl: <http://www.w3.org/ns/auth/acl#>
SELECT DISTINCT ?principal WHERE {
  ?authorization acl:accessTo <{graph}> ;
                 acl:mode acl:Control ;
                 acl:agent ?principal .
}"#;

/// Permission lookups through the graph engine's privileged endpoint.
///
/// The template must bind `?principal` and contain `{graph}` where the graph
/// IRI goes.
pub struct SparqlPermissionCatalog {
    client: SparqlClient,
    query_template: String,
}

impl SparqlPermissionCatalog {
    pub fn new(settings: SparqlSettings, query_template: Option<String>) -> Result<Self> {
        if settings.credentials.is_none() {
            return Err(GraphError::InvalidSettings(
                "the permission endpoint needs credentials".to_string(),
            ));
        }
        let query_template = query_template.unwrap_or_else(|| DEFAULT_PERMISSION_QUERY.to_string());
        if !query_template.contains(GRAPH_PLACEHOLDER) {
            return Err(GraphError::InvalidSettings(format!(
                "permission query must contain {GRAPH_PLACEHOLDER}"
            )));
        }
        Ok(Self {
            client: SparqlClient::new(settings)?,
            query_template,
        })
    }

    fn render(&self, graph: &str) -> Result<String> {
        validate_iri(graph)?;
        Ok(self.query_template.replace(GRAPH_PLACEHOLDER, graph))
    }
}

#[async_trait]
impl PermissionCatalog for SparqlPermissionCatalog {
    async fn graph_principals(&self, graph: &str) -> Result<Vec<String>> {
        let query = self.render(graph)?;
        let results = self.client.select(&query).await?;
        let mut principals = results.values("principal");
        principals.sort();
        principals.dedup();
        debug!(graph, principals = principals.len(), "graph permissions read");
        Ok(principals)
    }
}
