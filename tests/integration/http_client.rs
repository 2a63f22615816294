//! HTTP client behaviour against a mock analysis service

use pagewatch::client::{Mutation, Pagination};
use pagewatch::config::ServerConfig;
use pagewatch::{
    ApiError, HttpRecordApi, QueryState, RecordApi, RecordId, RecordStatus, SortField, SortOrder,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "devtoken123";

pub fn create_api(base_url: &str) -> HttpRecordApi {
    HttpRecordApi::new(&ServerConfig {
        base_url: base_url.to_string(),
        token: TOKEN.to_string(),
        timeout_secs: 5,
    })
    .expect("Failed to build API client")
}

pub fn record_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "address": format!("https://site{}.test", id),
        "status": status,
        "title": "",
        "internalLinks": 3,
        "createdAt": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn test_list_sends_token_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .and(header("Authorization", "Bearer devtoken123"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "25"))
        .and(query_param("search", "example"))
        .and(query_param("sort", "internalLinks"))
        .and(query_param("order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "urls": [record_json(26, "done")],
            "total": 26,
            "page": 2,
            "limit": 25
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let mut query = QueryState::new(25, SortField::InternalLinks, SortOrder::Desc);
    query.set_search_term("example");
    query.set_page(2);

    let listing = api.list(&query).await.unwrap();
    assert_eq!(listing.pagination, Pagination::Server { total: 26 });
    assert_eq!(listing.records.len(), 1);

    let record = &listing.records[0];
    assert_eq!(record.id, RecordId(26));
    assert_eq!(record.status, RecordStatus::Done);
    assert_eq!(record.title, None);
    assert_eq!(record.internal_links, 3);
    assert_eq!(record.broken_links, 0);
}

#[tokio::test]
async fn test_empty_search_is_still_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .and(query_param("search", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let listing = api.list(&QueryState::default()).await.unwrap();
    assert!(listing.records.is_empty());
}

#[tokio::test]
async fn test_list_accepts_bare_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            record_json(1, "queued"),
            record_json(2, "running"),
        ])))
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let listing = api.list(&QueryState::default()).await.unwrap();

    assert_eq!(listing.pagination, Pagination::Local);
    assert_eq!(listing.records.len(), 2);
    assert_eq!(listing.records[1].status, RecordStatus::Running);
}

#[tokio::test]
async fn test_get_accepts_pascal_case_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ID": 7,
            "Address": "https://example.com",
            "Status": "completed",
            "Title": "Example Domain",
            "HTMLVersion": "HTML5",
            "H1": 1,
            "H2": 2,
            "InternalLinks": 4,
            "ExternalLinks": 1,
            "BrokenLinks": 1,
            "HasLoginForm": true,
            "CreatedAt": "2024-05-01T10:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let record = api.get(RecordId(7)).await.unwrap();

    assert_eq!(record.status, RecordStatus::Done);
    assert_eq!(record.title.as_deref(), Some("Example Domain"));
    assert_eq!(record.html_version.as_deref(), Some("HTML5"));
    assert_eq!(record.headings(), [1, 2, 0, 0, 0, 0]);
    assert_eq!(record.total_links(), 5);
    assert!(record.has_login_form);
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls/404"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "URL not found" })),
        )
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let error = api.get(RecordId(404)).await.unwrap_err();

    assert_eq!(
        error,
        ApiError::Server {
            status: 404,
            message: "URL not found".to_string()
        }
    );
    assert_eq!(error.to_string(), "URL not found");
}

#[tokio::test]
async fn test_error_without_body_is_opaque() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let error = api.list(&QueryState::default()).await.unwrap_err();

    assert_eq!(error, ApiError::ServerOpaque { status: 502 });
    assert_eq!(error.status(), Some(502));
}

#[tokio::test]
async fn test_unauthorized_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid token" })),
        )
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let error = api.list(&QueryState::default()).await.unwrap_err();
    assert_eq!(error.status(), Some(401));
    assert_eq!(error.to_string(), "Invalid token");
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let error = api.list(&QueryState::default()).await.unwrap_err();
    assert!(matches!(error, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    // Nothing listens on port 1
    let api = create_api("http://127.0.0.1:1");
    let error = api.list(&QueryState::default()).await.unwrap_err();

    assert!(matches!(error, ApiError::Network(_)));
    assert_eq!(error.status(), None);
}

#[tokio::test]
async fn test_submit_posts_trimmed_address() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/urls"))
        .and(header("Authorization", "Bearer devtoken123"))
        .and(body_json(json!({ "url": "https://example.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(record_json(12, "queued")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let id = api.submit("  https://example.com ").await.unwrap();
    assert_eq!(id, RecordId(12));
}

#[tokio::test]
async fn test_invalid_submit_never_reaches_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/urls"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    for address in ["", "example.com", "ftp://example.com", "http://"] {
        let error = api.submit(address).await.unwrap_err();
        assert!(error.is_validation(), "{} should be rejected", address);
    }
}

#[tokio::test]
async fn test_bulk_routes_and_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/urls/bulk-delete"))
        .and(header("Authorization", "Bearer devtoken123"))
        .and(body_json(json!({ "ids": [1, 4] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "deleted": 2 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/urls/bulk-rerun"))
        .and(body_json(json!({ "ids": [2] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    api.mutate(&Mutation::BulkDelete(vec![RecordId(1), RecordId(4)]))
        .await
        .unwrap();
    api.mutate(&Mutation::BulkRerun(vec![RecordId(2)]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_single_record_routes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/urls/5/analyze"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/urls/6"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    api.mutate(&Mutation::Analyze(RecordId(5))).await.unwrap();
    api.mutate(&Mutation::Delete(RecordId(6))).await.unwrap();
}

#[tokio::test]
async fn test_mutation_failure_carries_server_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/urls/9/analyze"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "Analysis already running" })),
        )
        .mount(&mock_server)
        .await;

    let api = create_api(&mock_server.uri());
    let error = api.mutate(&Mutation::Analyze(RecordId(9))).await.unwrap_err();
    assert_eq!(error.to_string(), "Analysis already running");
}
