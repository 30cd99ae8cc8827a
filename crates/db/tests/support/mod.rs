#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{Connection, params};
use tempfile::TempDir;

pub struct TestDatastore {
    pub _dir: TempDir,
    pub path: PathBuf,
}

/// Creates a datastore file holding one table per name, each with `rows` rows,
/// plus the `_table_metadata` registry listing them.
pub fn setup_datastore(tables: &[(&str, usize)]) -> TestDatastore {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("datastore.sqlite");
    let conn = Connection::open(&path).expect("open datastore");
    conn.execute_batch("CREATE TABLE _table_metadata (name TEXT NOT NULL);")
        .expect("create registry");
    for (name, rows) in tables {
        conn.execute_batch(&format!(
            r#"CREATE TABLE "{name}" (_id INTEGER PRIMARY KEY, payload TEXT);"#
        ))
        .expect("create table");
        for i in 0..*rows {
            conn.execute(
                &format!(r#"INSERT INTO "{name}" (payload) VALUES (?1)"#),
                params![format!("{name}-{i}-{}", "p".repeat(100))],
            )
            .expect("insert row");
        }
        conn.execute(
            "INSERT INTO _table_metadata (name) VALUES (?1)",
            params![name],
        )
        .expect("register table");
    }
    TestDatastore { _dir: dir, path }
}
