use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use storage_catalog::CatalogError;
use storage_db::DbError;

/// External system an aggregation run depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Catalog,
    Filesystem,
    Database,
    Triplestore,
    Permissions,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Catalog => "catalog",
            Self::Filesystem => "filesystem",
            Self::Database => "database",
            Self::Triplestore => "triplestore",
            Self::Permissions => "graph permissions",
        };
        f.write_str(name)
    }
}

/// Anything that aborts an aggregation run. Unattributed records are not
/// errors; they end up in the unattributed report instead.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("{backend} backend unavailable: {message}")]
    BackendUnavailable { backend: Backend, message: String },
    #[error("resource {resource_id} has no backing file at {}", path.display())]
    MissingBackingObject { resource_id: String, path: PathBuf },
    #[error("resource id {0:?} does not map to a storage path")]
    InvalidResourceId(String),
    #[error("{call} gave no answer within {after:?}")]
    Timeout { call: String, after: Duration },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UsageError {
    pub fn backend(backend: Backend, err: impl fmt::Display) -> Self {
        Self::BackendUnavailable {
            backend,
            message: err.to_string(),
        }
    }
}

impl From<CatalogError> for UsageError {
    fn from(err: CatalogError) -> Self {
        Self::backend(Backend::Catalog, err)
    }
}

impl From<DbError> for UsageError {
    fn from(err: DbError) -> Self {
        Self::backend(Backend::Database, err)
    }
}

pub type Result<T> = std::result::Result<T, UsageError>;
