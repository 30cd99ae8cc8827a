mod error;
mod postgres;
mod sqlite;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

pub use error::{DbError, Result};
pub use postgres::PostgresEngine;
pub use sqlite::SqliteEngine;
pub use types::{EngineSettings, TableSize};

/// Registry table the datastore keeps next to the resource tables.
pub const TABLE_METADATA: &str = "_table_metadata";

/// Read-only view of the relational engine backing the datastore.
#[async_trait]
pub trait RelationalEngine: Send + Sync {
    /// Schema used when the configuration does not name one.
    fn default_schema(&self) -> &'static str;

    /// Total on-disk size of every table in `schema`, as the engine reports it.
    async fn table_sizes(&self, schema: &str) -> Result<Vec<TableSize>>;
}

/// Opens the engine matching the url scheme (`postgres://`, `postgresql://`, `sqlite:`).
///
/// PostgreSQL pools connect lazily, so this does not touch the network.
pub fn open_engine(settings: &EngineSettings) -> Result<Arc<dyn RelationalEngine>> {
    let url = settings.url.trim();
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let engine = PostgresEngine::connect_lazy(
            url,
            settings.max_connections,
            settings.acquire_timeout,
        )?;
        return Ok(Arc::new(engine));
    }
    if let Some(path) = sqlite_path(url) {
        return Ok(Arc::new(SqliteEngine::new(path)));
    }
    Err(DbError::UnsupportedUrl(settings.url.clone()))
}

fn sqlite_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    if rest.is_empty() {
        return None;
    }
    Some(PathBuf::from(rest))
}

/// Accepts plain SQL identifiers only; schema names end up inside query text.
pub fn validate_identifier(value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    };
    if valid && value.len() <= 63 {
        Ok(())
    } else {
        Err(DbError::InvalidSchema(value.to_string()))
    }
}
