use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use storage_core::{Component, UsageRecord};
use storage_db::{RelationalEngine, TABLE_METADATA, validate_identifier};
use tracing::debug;

use crate::bounded::bounded;
use crate::error::{Result, UsageError};

/// Table sizes of the datastore, restricted to registered resource tables.
pub struct RelationalProbe {
    engine: Arc<dyn RelationalEngine>,
    schema: String,
    call_timeout: Duration,
}

impl RelationalProbe {
    pub fn new(
        engine: Arc<dyn RelationalEngine>,
        schema: Option<String>,
        call_timeout: Duration,
    ) -> Result<Self> {
        let schema = schema.unwrap_or_else(|| engine.default_schema().to_string());
        validate_identifier(&schema)
            .map_err(|err| UsageError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            engine,
            schema,
            call_timeout,
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// One record per table that is both in the schema and in `registered`.
    /// The registry table itself never counts.
    pub async fn scan(&self, registered: &[String]) -> Result<Vec<UsageRecord>> {
        let registered: HashSet<&str> = registered
            .iter()
            .map(String::as_str)
            .filter(|name| *name != TABLE_METADATA)
            .collect();
        let sizes = bounded(
            self.call_timeout,
            "table sizes",
            self.engine.table_sizes(&self.schema),
        )
        .await?;

        let total = sizes.len();
        let records: Vec<UsageRecord> = sizes
            .into_iter()
            .filter(|table| registered.contains(table.name.as_str()))
            .map(|table| UsageRecord::new(table.name, Component::Database, table.bytes))
            .collect();
        debug!(
            schema = %self.schema,
            tables = total,
            registered = records.len(),
            "datastore tables measured"
        );
        Ok(records)
    }
}
