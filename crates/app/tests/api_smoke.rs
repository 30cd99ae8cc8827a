use std::path::Path;

use rusqlite::Connection;
use serde_json::json;
use storage_app::{ApiError, AppConfig, AppError, AppState};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "result": result }))
}

fn count(value: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "head": {"vars": ["count"]},
        "results": {"bindings": [{"count": {"type": "literal", "value": value.to_string()}}]}
    }))
}

fn query_contains(fragment: &'static str) -> impl Fn(&Request) -> bool {
    move |request: &Request| {
        url::form_urlencoded::parse(&request.body)
            .any(|(key, value)| key == "query" && value.contains(fragment))
    }
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/3/action/current_package_list_with_resources"))
        .respond_with(ok(json!([{
            "id": "pkg-1",
            "name": "air-quality",
            "organization": {"id": "org-1", "name": "org1"},
            "resources": [
                {"id": "a1b2c3d4e5f6", "url": format!("{}/dataset/pkg-1/resource/a1b2c3d4e5f6/download/a.csv", server.uri()), "url_type": "upload"},
                {"id": "res_table", "url": "", "url_type": "datastore"}
            ]
        }])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/3/action/organization_list"))
        .respond_with(ok(json!([{"id": "org-1", "name": "org1"}])))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/3/action/datastore_search"))
        .respond_with(ok(json!({"records": [{"name": "res_table"}], "total": 1})))
        .mount(server)
        .await;
}

async fn mount_graph(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(query_contains("AS ?count) WHERE { GRAPH ?g"))
        .respond_with(count(500))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(query_contains("SELECT DISTINCT ?g"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "head": {"vars": ["g"]},
            "results": {"bindings": [{"g": {"type": "uri", "value": "http://graphs.test/a"}}]}
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(query_contains("GRAPH <http://graphs.test/a>"))
        .respond_with(count(300))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sparql-auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "head": {"vars": ["principal"]},
            "results": {"bindings": [{"principal": {"type": "literal", "value": "org1"}}]}
        })))
        .mount(server)
        .await;
}

fn write_upload(storage: &Path, len: usize) {
    let dir = storage.join("resources").join("a1b").join("2c3");
    std::fs::create_dir_all(&dir).expect("upload dir");
    std::fs::write(dir.join("d4e5f6"), vec![0u8; len]).expect("upload");
}

fn write_datastore(path: &Path) {
    let conn = Connection::open(path).expect("datastore");
    conn.execute_batch(
        "CREATE TABLE _table_metadata (name TEXT NOT NULL);
         INSERT INTO _table_metadata (name) VALUES ('res_table');
         CREATE TABLE res_table (_id INTEGER PRIMARY KEY, payload TEXT);
         INSERT INTO res_table (payload) VALUES ('first'), ('second');",
    )
    .expect("tables");
}

fn config(server: &MockServer, storage: &Path, datastore: &Path) -> AppConfig {
    let contents = format!(
        r#"
[catalog]
url = "{uri}"

[filesystem]
storage_path = "{storage}"
site_url = "{uri}"

[datastore]
url = "sqlite://{datastore}"

[graph]
endpoint = "{uri}/sparql"

[graph.permissions]
endpoint = "{uri}/sparql-auth"
username = "dba"
password = "dba"

[limits]
call_timeout_secs = 5
"#,
        uri = server.uri(),
        storage = storage.display(),
        datastore = datastore.display(),
    );
    AppConfig::from_toml_str(&contents).expect("config")
}

#[tokio::test]
async fn usage_service_smoke() {
    let dir = tempdir().expect("temp dir");
    let storage = dir.path().join("storage");
    let datastore = dir.path().join("datastore.sqlite");
    write_upload(&storage, 1000);
    write_datastore(&datastore);

    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_graph(&server).await;

    let app_state = AppState::from_config(config(&server, &storage, &datastore)).expect("state");
    let usage = &app_state.services.usage;

    let global = usage.used_space().await.expect("global");
    assert_eq!(global.filesystem, 1000);
    assert!(global.database > 0);
    assert_eq!(global.triplestore, 500);

    let per_org = usage.used_space_per_org().await.expect("per org");
    assert_eq!(per_org.len(), 1);
    assert_eq!(per_org["org-1"].filesystem, 1000);
    assert_eq!(per_org["org-1"].database, global.database);
    assert_eq!(per_org["org-1"].triplestore, 300);

    let unattributed = usage.unattributed_space().await.expect("unattributed");
    assert_eq!(unattributed.totals.filesystem, 0);
    assert_eq!(unattributed.totals.database, 0);
    assert_eq!(unattributed.totals.triplestore, 200);
}

#[tokio::test]
async fn missing_upload_surfaces_as_server_error() {
    let dir = tempdir().expect("temp dir");
    let storage = dir.path().join("storage");
    let datastore = dir.path().join("datastore.sqlite");
    write_datastore(&datastore);

    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_graph(&server).await;

    let app_state = AppState::from_config(config(&server, &storage, &datastore)).expect("state");
    let err = app_state
        .services
        .usage
        .used_space()
        .await
        .expect_err("missing upload");

    let api = ApiError::from(err);
    assert_eq!(api.status, 500);
    assert_eq!(api.code.as_deref(), Some("missing_backing_object"));
}

#[tokio::test]
async fn catalog_outage_is_a_bad_gateway() {
    let dir = tempdir().expect("temp dir");
    let datastore = dir.path().join("datastore.sqlite");
    write_datastore(&datastore);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let app_state = AppState::from_config(config(&server, dir.path(), &datastore)).expect("state");
    let err = app_state
        .services
        .usage
        .used_space_per_org()
        .await
        .expect_err("outage");

    assert!(matches!(err, AppError::Usage(_)));
    assert_eq!(ApiError::from(err).status, 502);
}
