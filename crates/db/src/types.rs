use std::time::Duration;

use crate::error::{DbError, Result};

/// Physical size of one table, indexes and out-of-line storage included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSize {
    pub name: String,
    pub bytes: u64,
}

impl TableSize {
    pub(crate) fn from_row(name: String, size: i64) -> Result<Self> {
        let bytes = u64::try_from(size).map_err(|_| DbError::NegativeSize {
            table: name.clone(),
            size,
        })?;
        Ok(Self { name, bytes })
    }
}

/// Connection settings for [`crate::open_engine`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl EngineSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}
