use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, params};
use tracing::debug;

use crate::error::{DbError, Result};
use crate::{RelationalEngine, TableSize, validate_identifier};

/// Datastore kept in a single SQLite file. Sizes come from the `dbstat` virtual
/// table: every page owned by a table or one of its indexes counts toward it.
pub struct SqliteEngine {
    path: PathBuf,
}

impl SqliteEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn open_read_only(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

pub(crate) fn table_sizes_on(conn: &Connection, schema: &str) -> Result<Vec<TableSize>> {
    validate_identifier(schema)?;
    let sql = format!(
        r#"
        SELECT m.tbl_name, SUM(s.pgsize)
        FROM "{schema}".sqlite_master AS m
        INNER JOIN dbstat(?1) AS s ON s.name = m.name
        WHERE m.type IN ('table', 'index')
        GROUP BY m.tbl_name
        ORDER BY m.tbl_name
        "#
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![schema], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;
    let mut sizes = Vec::new();
    for row in rows {
        let (name, size) = row?;
        sizes.push(TableSize::from_row(name, size)?);
    }
    Ok(sizes)
}

#[async_trait]
impl RelationalEngine for SqliteEngine {
    fn default_schema(&self) -> &'static str {
        "main"
    }

    async fn table_sizes(&self, schema: &str) -> Result<Vec<TableSize>> {
        let path = self.path.clone();
        let schema = schema.to_string();
        let sizes = tokio::task::spawn_blocking(move || {
            let conn = open_read_only(&path)?;
            table_sizes_on(&conn, &schema)
        })
        .await
        .map_err(|err| DbError::Task(err.to_string()))??;
        debug!(path = %self.path.display(), tables = sizes.len(), "sqlite table sizes fetched");
        Ok(sizes)
    }
}
