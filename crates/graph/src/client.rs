use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::debug;
use url::Url;

use crate::error::{GraphError, Result};
use crate::results::SelectResults;
use crate::{GraphStore, validate_iri};

const RESULTS_JSON: &str = "application/sparql-results+json";

const TOTAL_TRIPLES_QUERY: &str = "SELECT (COUNT(*) AS ?count) WHERE { GRAPH ?g { ?s ?p ?o } }";
const NAMED_GRAPHS_QUERY: &str = "SELECT DISTINCT ?g WHERE { GRAPH ?g { ?s ?p ?o } }";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SparqlSettings {
    pub endpoint: String,
    pub credentials: Option<Credentials>,
    pub request_timeout: Duration,
}

impl SparqlSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// SPARQL protocol client: form-encoded POST, JSON results.
pub struct SparqlClient {
    client: Client,
    endpoint: Url,
    credentials: Option<Credentials>,
}

impl SparqlClient {
    pub fn new(settings: SparqlSettings) -> Result<Self> {
        let endpoint = Url::parse(settings.endpoint.trim()).map_err(|err| GraphError::InvalidUrl {
            url: settings.endpoint.clone(),
            message: err.to_string(),
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(GraphError::InvalidUrl {
                url: settings.endpoint,
                message: "expected an http or https url".to_string(),
            });
        }
        if let Some(credentials) = &settings.credentials
            && credentials.username.trim().is_empty()
        {
            return Err(GraphError::InvalidSettings(
                "username must not be empty when credentials are set".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            credentials: settings.credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn select(&self, query: &str) -> Result<SelectResults> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, RESULTS_JSON)
            .form(&[("query", query)]);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message: String = body.chars().take(200).collect();
            return Err(GraphError::Endpoint {
                status: status.as_u16(),
                message,
            });
        }
        serde_json::from_str(&body).map_err(|err| GraphError::Decode(err.to_string()))
    }
}

#[async_trait]
impl GraphStore for SparqlClient {
    async fn total_triples(&self) -> Result<u64> {
        let results = self.select(TOTAL_TRIPLES_QUERY).await?;
        results.single_count("count")
    }

    async fn named_graphs(&self) -> Result<Vec<String>> {
        let results = self.select(NAMED_GRAPHS_QUERY).await?;
        let graphs = results.values("g");
        debug!(graphs = graphs.len(), "named graphs listed");
        Ok(graphs)
    }

    async fn graph_triples(&self, graph: &str) -> Result<u64> {
        validate_iri(graph)?;
        let query = format!("SELECT (COUNT(*) AS ?count) WHERE {{ GRAPH <{graph}> {{ ?s ?p ?o }} }}");
        let results = self.select(&query).await?;
        results.single_count("count")
    }
}
