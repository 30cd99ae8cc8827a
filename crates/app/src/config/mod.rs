use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storage_db::validate_identifier;
use storage_graph::GRAPH_PLACEHOLDER;
use url::Url;

use crate::error::{AppError, Result};

pub const CONFIG_ENV: &str = "STORAGE_ADMIN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "storage-admin.toml";

const DEFAULT_BIND: &str = "127.0.0.1:5050";
const DEFAULT_PAGE_SIZE: u32 = 100;
const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// `--config` wins, then `STORAGE_ADMIN_CONFIG`, then `./storage-admin.toml`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            std::env::var_os(CONFIG_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub filesystem: FilesystemConfig,
    pub datastore: DatastoreConfig,
    pub graph: GraphConfig,
    #[serde(default)]
    pub ownership: OwnershipConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Required in the `x-storage-admin-token` header when set.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_token: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    pub url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilesystemConfig {
    pub storage_path: PathBuf,
    pub site_url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatastoreConfig {
    pub url: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    pub endpoint: String,
    pub permissions: PermissionsConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionsConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OwnershipConfig {
    /// Graph principal name to organization id.
    #[serde(default)]
    pub principals: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}

impl LimitsConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

impl AppConfig {
    /// Reads and validates the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AppError::Config(format!("read config {}: {}", path.display(), err))
        })?;
        let config: AppConfig = toml::from_str(&contents).map_err(|err| {
            AppError::Config(format!("parse config {}: {}", path.display(), err))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|err| AppError::Config(format!("parse config: {}", err)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if let Some(token) = &self.server.api_token
            && token.trim().is_empty()
        {
            return Err(invalid("server.api_token must not be empty when set"));
        }

        http_url("catalog.url", &self.catalog.url)?;
        if self.catalog.page_size == 0 {
            return Err(invalid("catalog.page_size must be greater than zero"));
        }

        if self.filesystem.storage_path.as_os_str().is_empty() {
            return Err(invalid("filesystem.storage_path must not be empty"));
        }
        http_url("filesystem.site_url", &self.filesystem.site_url)?;

        let datastore = self.datastore.url.trim();
        let supported = ["postgres://", "postgresql://", "sqlite:"];
        if !supported.iter().any(|prefix| datastore.starts_with(prefix)) {
            return Err(invalid(format!(
                "datastore.url must start with postgres://, postgresql:// or sqlite:, got {:?}",
                self.datastore.url
            )));
        }
        if let Some(schema) = &self.datastore.schema {
            validate_identifier(schema)
                .map_err(|err| invalid(format!("datastore.schema: {err}")))?;
        }
        if self.datastore.max_connections == 0 {
            return Err(invalid("datastore.max_connections must be greater than zero"));
        }

        http_url("graph.endpoint", &self.graph.endpoint)?;
        let permissions = &self.graph.permissions;
        http_url("graph.permissions.endpoint", &permissions.endpoint)?;
        if permissions.username.trim().is_empty() {
            return Err(invalid("graph.permissions.username must not be empty"));
        }
        if let Some(query) = &permissions.query
            && !query.contains(GRAPH_PLACEHOLDER)
        {
            return Err(invalid(format!(
                "graph.permissions.query must contain {GRAPH_PLACEHOLDER}"
            )));
        }

        for (principal, organization) in &self.ownership.principals {
            if principal.trim().is_empty() || organization.trim().is_empty() {
                return Err(invalid(
                    "ownership.principals entries need a principal and an organization id",
                ));
            }
        }

        if self.limits.call_timeout_secs == 0 {
            return Err(invalid("limits.call_timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|err| invalid(format!("server.bind {:?}: {err}", self.server.bind)))
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Config(message.into())
}

fn http_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value.trim()).map_err(|err| invalid(format!("{field} {value:?}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid(format!("{field} must be an http(s) url, got {value:?}")));
    }
    Ok(url)
}
