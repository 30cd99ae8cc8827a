use std::sync::Arc;

use aggregate::{
    AggregatorSettings, FilesystemProbe, GraphProbe, LocalUrlPolicy, RelationalProbe,
    ResourceStore, UsageAggregator,
};
use storage_catalog::{CatalogClient, CatalogSettings};
use storage_db::{EngineSettings, open_engine};
use storage_graph::{Credentials, SparqlClient, SparqlPermissionCatalog, SparqlSettings};
use tracing::info;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::services::AppServices;

/// Application state shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig, aggregator: UsageAggregator) -> Self {
        Self {
            config: Arc::new(config),
            services: AppServices::new(Arc::new(aggregator)),
        }
    }

    /// Validates `config` and builds the backend clients it describes.
    /// Nothing connects until the first report is requested.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let aggregator = build_aggregator(&config)?;
        info!(
            catalog = %config.catalog.url,
            graph = %config.graph.endpoint,
            "storage backends configured"
        );
        Ok(Self::new(config, aggregator))
    }
}

fn build_aggregator(config: &AppConfig) -> Result<UsageAggregator> {
    let timeout = config.limits.call_timeout();
    let client_error = |name: &str, err: &dyn std::fmt::Display| {
        AppError::Config(format!("{name}: {err}"))
    };

    let mut catalog_settings = CatalogSettings::new(config.catalog.url.clone());
    catalog_settings.api_token = config.catalog.api_token.clone();
    catalog_settings.page_size = config.catalog.page_size;
    catalog_settings.request_timeout = timeout;
    let catalog = CatalogClient::new(catalog_settings).map_err(|err| client_error("catalog", &err))?;

    let filesystem = FilesystemProbe::new(
        LocalUrlPolicy::new(&config.filesystem.site_url)?,
        ResourceStore::new(&config.filesystem.storage_path)?,
        timeout,
    );

    let engine = open_engine(&EngineSettings {
        url: config.datastore.url.clone(),
        max_connections: config.datastore.max_connections,
        acquire_timeout: timeout,
    })
    .map_err(|err| client_error("datastore", &err))?;
    let relational = RelationalProbe::new(engine, config.datastore.schema.clone(), timeout)?;

    let mut graph_settings = SparqlSettings::new(config.graph.endpoint.clone());
    graph_settings.request_timeout = timeout;
    let store = SparqlClient::new(graph_settings).map_err(|err| client_error("graph", &err))?;

    let permissions = &config.graph.permissions;
    let mut permission_settings = SparqlSettings::new(permissions.endpoint.clone());
    permission_settings.request_timeout = timeout;
    permission_settings.credentials = Some(Credentials {
        username: permissions.username.clone(),
        password: permissions.password.clone(),
    });
    let permission_catalog =
        SparqlPermissionCatalog::new(permission_settings, permissions.query.clone())
            .map_err(|err| client_error("graph.permissions", &err))?;

    let graph = GraphProbe::new(Arc::new(store), Arc::new(permission_catalog), timeout);

    Ok(UsageAggregator::new(
        Arc::new(catalog),
        filesystem,
        relational,
        graph,
        AggregatorSettings {
            call_timeout: timeout,
            principal_map: config.ownership.principals.clone(),
        },
    ))
}
