use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use storage_app::{AppConfig, AppError, resolve_config_path};

const TEMPLATE: &str = r#"# storage-admin configuration

[server]
bind = "127.0.0.1:5050"
# Clients must send it in the x-storage-admin-token header when set.
# api_token = "change-me"

[catalog]
url = "http://localhost:5000"
# api_token = "catalog-api-token"
page_size = 100

[filesystem]
# The catalog's storage path; uploads live under <storage_path>/resources.
storage_path = "/var/lib/catalog/default"
# Resource URLs on this host and port count as locally stored.
site_url = "http://localhost:5000"

[datastore]
url = "postgres://datastore_ro@localhost/datastore_default"
# schema = "public"
max_connections = 4

[graph]
endpoint = "http://localhost:8890/sparql"

[graph.permissions]
endpoint = "http://localhost:8890/sparql-auth"
username = "dba"
password = "dba"
# The query must select ?principal and contain {graph}.
# query = "..."

[ownership.principals]
# "graph-principal" = "organization-id"

[limits]
call_timeout_secs = 30
"#;

pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
}

pub fn load(explicit: Option<PathBuf>) -> Result<LoadedConfig, AppError> {
    let path = resolve_config_path(explicit);
    let config = AppConfig::load(&path)?;
    Ok(LoadedConfig { config, path })
}

/// Writes the template to `path`. An existing file is left alone.
pub fn write_template(path: &Path) -> Result<bool, AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(TEMPLATE.as_bytes())?;
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err.into()),
    }
}
