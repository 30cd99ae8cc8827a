use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use crate::error::Result;
use crate::{RelationalEngine, TableSize, validate_identifier};

// Datastore tables are named after resource ids, which contain hyphens, so the
// relation is addressed through a quoted, schema-qualified name.
const TABLE_SIZE_QUERY: &str = r#"
    SELECT
        table_name::text AS table_name,
        pg_total_relation_size(format('%I.%I', table_schema, table_name)::regclass) AS total_bytes
    FROM information_schema.tables
    WHERE table_schema = $1
    "#;

pub struct PostgresEngine {
    pool: PgPool,
}

impl PostgresEngine {
    pub fn connect_lazy(url: &str, max_connections: u32, acquire_timeout: Duration) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .connect_lazy(url)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RelationalEngine for PostgresEngine {
    fn default_schema(&self) -> &'static str {
        "public"
    }

    async fn table_sizes(&self, schema: &str) -> Result<Vec<TableSize>> {
        validate_identifier(schema)?;
        let rows: Vec<(String, i64)> = sqlx::query_as(TABLE_SIZE_QUERY)
            .bind(schema)
            .fetch_all(&self.pool)
            .await?;
        debug!(schema, tables = rows.len(), "postgres table sizes fetched");
        rows.into_iter()
            .map(|(name, size)| TableSize::from_row(name, size))
            .collect()
    }
}
