#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("postgres error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("invalid schema name {0:?}")]
    InvalidSchema(String),
    #[error("unsupported datastore url {0:?}")]
    UnsupportedUrl(String),
    #[error("table {table} reported a negative size ({size})")]
    NegativeSize { table: String, size: i64 },
    #[error("database task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, DbError>;
