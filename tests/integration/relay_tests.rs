//! Integration tests for the relay
//!
//! These tests use wiremock to stand in for the upstream site and drive the
//! real reqwest fetcher, the coordinator, the resolver, and the HTTP API.

use actix_web::{test, web, App};
use reclame_relay::api::{configure, AppState};
use reclame_relay::config::Config;
use reclame_relay::crawler::{build_fetcher, CompanyResolver, Coordinator};
use reclame_relay::model::{ComplaintQuery, ComplaintQueryResult, Status};
use reclame_relay::RelayError;
use serde_json::{json, Value};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration pointing at the mock upstream
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.upstream.base_url = base_url.to_string();
    config.upstream.timeout_secs = 5;
    config.upstream.connect_timeout_secs = 2;
    config.headers.user_agent = "TestBrowser/1.0".to_string();
    config
}

fn next_data(props: Value) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Upstream</title></head><body>
        <div id="__next"></div>
        <script id="__NEXT_DATA__" type="application/json">{}</script>
        </body></html>"#,
        json!({ "props": { "pageProps": props }, "buildId": "test" })
    )
}

fn html(props: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(next_data(props))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn complaints(page: u32, count: usize) -> Value {
    let statuses = ["SOLVED", "Não resolvida", "EVALUATED"];
    let records: Vec<Value> = (0..count)
        .map(|i| {
            let id = format!("{}{:02}", page, i);
            json!({
                "id": id,
                "title": format!("Reclamação {}", id),
                "description": "Texto da reclamação",
                "status": statuses[i % statuses.len()],
                "created": "05/02/2026 às 20:34",
                "userCity": "João Pessoa",
                "userState": "PB",
                "categories": ["Banco"],
                "url": format!("/acme/reclamacao_{}/", id)
            })
        })
        .collect();
    json!({ "complaints": records })
}

async fn mount_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/empresa/acme/"))
        .respond_with(html(json!({
            "company": { "companyName": "Acme S.A.", "shortname": "acme", "totalComplaints": 5120 }
        })))
        .mount(server)
        .await;
}

async fn mount_listing_page(server: &MockServer, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/empresa/acme/lista-reclamacoes/"))
        .and(query_param("pagina", page.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

fn coordinator(config: &Config) -> Coordinator {
    let fetcher = build_fetcher(&config.upstream, &config.headers).expect("Failed to build fetcher");
    Coordinator::from_config(fetcher, &config.upstream).expect("Failed to build coordinator")
}

#[tokio::test]
async fn test_limit_five_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;
    mount_listing_page(&mock_server, 1, html(complaints(1, 3))).await;
    mount_listing_page(&mock_server, 2, html(complaints(2, 3))).await;

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("acme", 5, None).unwrap();
    let result = coordinator(&config)
        .get_complaints(&query)
        .await
        .expect("Scrape failed");

    assert_eq!(result.company.name, "Acme S.A.");
    assert_eq!(result.company.total_complaints, 5120);
    assert_eq!(result.total_returned, 5);

    let ids: Vec<&str> = result.complaints.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["100", "101", "102", "200", "201"]);

    let first = &result.complaints[0];
    assert_eq!(first.title, "Reclamação 100");
    assert_eq!(first.status, Status::Solved);
    assert_eq!(first.location.as_deref(), Some("João Pessoa - PB"));
    assert_eq!(first.url, format!("{}/acme/reclamacao_100/", mock_server.uri()));
    assert_eq!(result.complaints[1].status, Status::NotSolved);
}

#[tokio::test]
async fn test_browser_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busca/"))
        .and(query_param("q", "acme"))
        .and(header("user-agent", "TestBrowser/1.0"))
        .and(header_exists("accept-language"))
        .and(header_exists("accept"))
        .respond_with(html(json!({
            "companies": [{ "companyName": "Acme S.A.", "shortname": "acme" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let fetcher = build_fetcher(&config.upstream, &config.headers).unwrap();
    let resolver = CompanyResolver::from_config(fetcher, &config.upstream).unwrap();

    let results = resolver.search_companies("acme").await.expect("Search failed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].slug, "acme");
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let mock_server = MockServer::start().await;
    // Unmatched requests get wiremock's default 404

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("ghost", 5, None).unwrap();
    let err = coordinator(&config).get_complaints(&query).await.unwrap_err();

    assert!(matches!(err, RelayError::CompanyNotFound { .. }));
}

#[tokio::test]
async fn test_first_page_503_is_terminal() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;
    mount_listing_page(&mock_server, 1, ResponseTemplate::new(503)).await;

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("acme", 5, None).unwrap();
    let err = coordinator(&config).get_complaints(&query).await.unwrap_err();

    match err {
        RelayError::Upstream(e) => {
            assert_eq!(e.status(), Some(503));
            assert!(e.is_blocking());
        }
        other => panic!("Expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_later_page_failure_returns_partial_results() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;
    mount_listing_page(&mock_server, 1, html(complaints(1, 10))).await;
    mount_listing_page(&mock_server, 2, ResponseTemplate::new(429)).await;

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("acme", 30, None).unwrap();
    let result = coordinator(&config).get_complaints(&query).await.unwrap();

    assert_eq!(result.total_returned, 10);
    assert_eq!(result.complaints.len(), 10);
}

#[tokio::test]
async fn test_fewer_complaints_than_limit() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;
    mount_listing_page(&mock_server, 1, html(complaints(1, 10))).await;
    mount_listing_page(&mock_server, 2, html(complaints(2, 2))).await;
    mount_listing_page(&mock_server, 3, html(json!({ "complaints": [] }))).await;

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("acme", 100, None).unwrap();
    let result = coordinator(&config).get_complaints(&query).await.unwrap();

    assert_eq!(result.total_returned, 12);
}

#[tokio::test]
async fn test_status_filter_is_forwarded_and_enforced() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;

    // Upstream ignores the filter; only evaluated complaints may come back
    Mock::given(method("GET"))
        .and(path("/empresa/acme/lista-reclamacoes/"))
        .and(query_param("status", "EVALUATED"))
        .and(query_param("pagina", "1"))
        .respond_with(html(complaints(1, 9)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empresa/acme/lista-reclamacoes/"))
        .and(query_param("status", "EVALUATED"))
        .and(query_param("pagina", "2"))
        .respond_with(html(json!({ "complaints": [] })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("acme", 10, Some(Status::Evaluated)).unwrap();
    let result = coordinator(&config).get_complaints(&query).await.unwrap();

    assert_eq!(result.total_returned, 3);
    assert!(result
        .complaints
        .iter()
        .all(|c| c.status == Status::Evaluated));
}

#[tokio::test]
async fn test_unrecognized_status_on_first_page_is_format_error() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;

    let mut page = complaints(1, 2);
    page["complaints"][1]["status"] = json!("Em análise");
    mount_listing_page(&mock_server, 1, html(page)).await;

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("acme", 5, None).unwrap();
    let err = coordinator(&config).get_complaints(&query).await.unwrap_err();

    match err {
        RelayError::Format(e) => assert_eq!(e.field, "complaints[1].status"),
        other => panic!("Expected format error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retry_wrapper_recovers_from_transient_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresa/acme/"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_profile(&mock_server).await;
    mount_listing_page(&mock_server, 1, html(complaints(1, 2))).await;
    mount_listing_page(&mock_server, 2, html(json!({ "complaints": [] }))).await;

    let mut config = create_test_config(&mock_server.uri());
    config.upstream.retries = 1;
    config.upstream.retry_backoff_ms = 10;

    let query = ComplaintQuery::new("acme", 5, None).unwrap();
    let result = coordinator(&config).get_complaints(&query).await.unwrap();
    assert_eq!(result.total_returned, 2);
}

#[tokio::test]
async fn test_single_attempt_without_retry_policy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/empresa/acme/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let query = ComplaintQuery::new("acme", 5, None).unwrap();
    let err = coordinator(&config).get_complaints(&query).await.unwrap_err();
    assert!(matches!(err, RelayError::Upstream(ref e) if e.status() == Some(502)));
}

#[actix_web::test]
async fn test_http_api_over_mock_upstream() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server).await;
    mount_listing_page(&mock_server, 1, html(complaints(1, 4))).await;
    mount_listing_page(&mock_server, 2, html(json!({ "complaints": [] }))).await;

    let config = create_test_config(&mock_server.uri());
    let fetcher = build_fetcher(&config.upstream, &config.headers).unwrap();
    let state = web::Data::new(AppState::new(fetcher, &config).unwrap());
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;

    let started = chrono::Utc::now();
    let req = test::TestRequest::get()
        .uri("/api/complaints/acme?limit=10")
        .to_request();
    let result: ComplaintQueryResult = test::call_and_read_body_json(&app, req).await;

    assert_eq!(result.total_returned, 4);
    assert!(result.scraped_at >= started);

    let req = test::TestRequest::get()
        .uri("/api/complaints/acme?limit=101")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
}
