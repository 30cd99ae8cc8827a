mod support;

use storage_db::{EngineSettings, RelationalEngine, SqliteEngine, TABLE_METADATA, open_engine};

#[tokio::test]
async fn reports_every_table_in_the_main_schema() {
    let store = support::setup_datastore(&[
        ("0c1d2e3f-aaaa-bbbb-cccc-000000000001", 10),
        ("0c1d2e3f-aaaa-bbbb-cccc-000000000002", 400),
    ]);
    let engine = SqliteEngine::new(&store.path);

    let sizes = engine.table_sizes("main").await.expect("table sizes");

    let names: Vec<&str> = sizes.iter().map(|t| t.name.as_str()).collect();
    assert!(names.contains(&"0c1d2e3f-aaaa-bbbb-cccc-000000000001"));
    assert!(names.contains(&"0c1d2e3f-aaaa-bbbb-cccc-000000000002"));
    assert!(names.contains(&TABLE_METADATA));

    let small = sizes
        .iter()
        .find(|t| t.name.ends_with("0001"))
        .expect("small table");
    let large = sizes
        .iter()
        .find(|t| t.name.ends_with("0002"))
        .expect("large table");
    assert!(small.bytes > 0);
    assert!(large.bytes > small.bytes);
}

#[tokio::test]
async fn repeated_scans_are_identical() {
    let store = support::setup_datastore(&[("resource-table-1", 25)]);
    let url = format!("sqlite://{}", store.path.display());
    let engine = open_engine(&EngineSettings::new(url)).expect("engine");

    let first = engine.table_sizes("main").await.expect("first scan");
    let second = engine.table_sizes("main").await.expect("second scan");

    assert_eq!(first, second);
    assert_eq!(engine.default_schema(), "main");
}

#[tokio::test]
async fn missing_database_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let engine = SqliteEngine::new(dir.path().join("absent.sqlite"));

    let result = engine.table_sizes("main").await;

    assert!(matches!(result, Err(storage_db::DbError::Sqlite(_))));
}
