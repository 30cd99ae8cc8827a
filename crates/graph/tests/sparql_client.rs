use serde_json::json;
use storage_graph::{
    Credentials, GraphError, GraphStore, PermissionCatalog, SparqlClient, SparqlPermissionCatalog,
    SparqlSettings,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Matches requests whose form-encoded `query` parameter contains `fragment`.
fn query_contains(fragment: &'static str) -> impl Fn(&Request) -> bool {
    move |request: &Request| {
        url::form_urlencoded::parse(&request.body)
            .any(|(key, value)| key == "query" && value.contains(fragment))
    }
}

fn count(value: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "head": {"vars": ["count"]},
        "results": {"bindings": [
            {"count": {"type": "typed-literal", "datatype": "http://www.w3.org/2001/XMLSchema#integer", "value": value.to_string()}}
        ]}
    }))
}

fn client(server: &MockServer) -> SparqlClient {
    SparqlClient::new(SparqlSettings::new(format!("{}/sparql", server.uri()))).expect("client")
}

#[tokio::test]
async fn total_triples_uses_one_aggregate_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(header("accept", "application/sparql-results+json"))
        .and(query_contains("GRAPH ?g"))
        .respond_with(count(500))
        .expect(1)
        .mount(&server)
        .await;

    let total = client(&server).total_triples().await.expect("total");

    assert_eq!(total, 500);
}

#[tokio::test]
async fn named_graphs_and_per_graph_counts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(query_contains("SELECT DISTINCT ?g"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "head": {"vars": ["g"]},
            "results": {"bindings": [
                {"g": {"type": "uri", "value": "http://example.org/graph/a"}},
                {"g": {"type": "uri", "value": "http://example.org/graph/b"}}
            ]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .and(query_contains("GRAPH <http://example.org/graph/a>"))
        .respond_with(count(120))
        .mount(&server)
        .await;

    let client = client(&server);
    let graphs = client.named_graphs().await.expect("graphs");
    let triples = client
        .graph_triples("http://example.org/graph/a")
        .await
        .expect("count");

    assert_eq!(
        graphs,
        vec!["http://example.org/graph/a", "http://example.org/graph/b"]
    );
    assert_eq!(triples, 120);
}

#[tokio::test]
async fn invalid_graph_iri_never_reaches_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(count(1))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .graph_triples("http://example.org/a> } #")
        .await
        .expect_err("invalid iri");

    assert!(matches!(err, GraphError::InvalidIri(_)));
}

#[tokio::test]
async fn endpoint_errors_carry_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Virtuoso 37000 Error SP030"))
        .mount(&server)
        .await;

    let err = client(&server).total_triples().await.expect_err("500");

    match err {
        GraphError::Endpoint { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("SP030"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn permission_lookup_authenticates_and_dedupes() {
    let server = MockServer::start().await;
    // "dba:secret" in base64.
    Mock::given(method("POST"))
        .and(path("/sparql-auth"))
        .and(header("authorization", "Basic ZGJhOnNlY3JldA=="))
        .and(query_contains("acl:accessTo <http://example.org/graph/a>"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "head": {"vars": ["principal"]},
            "results": {"bindings": [
                {"principal": {"type": "literal", "value": "org1"}},
                {"principal": {"type": "literal", "value": "org1"}}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = SparqlSettings::new(format!("{}/sparql-auth", server.uri()));
    settings.credentials = Some(Credentials {
        username: "dba".to_string(),
        password: "secret".to_string(),
    });
    let catalog = SparqlPermissionCatalog::new(settings, None).expect("catalog");

    let principals = catalog
        .graph_principals("http://example.org/graph/a")
        .await
        .expect("principals");

    assert_eq!(principals, vec!["org1".to_string()]);
}
