//! Integration tests for the search tool
//!
//! Tests behavioral contracts against a mock Custom Search endpoint:
//! - configuration errors never reach the network
//! - result normalization and ordering
//! - result-count clamping
//! - upstream failures become error results

use research_agent::config::SearchSection;
use research_agent::error::ErrorKind;
use research_agent::tools::builtin::WebSearchTool;
use research_agent::tools::Tool;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings pointing at the mock server, with env var names unique to the test
fn settings(server: &MockServer, test_name: &str) -> SearchSection {
    SearchSection {
        api_key_env: format!("RESEARCH_AGENT_TEST_{test_name}_KEY"),
        engine_id_env: format!("RESEARCH_AGENT_TEST_{test_name}_CX"),
        base_url: format!("{}/customsearch/v1", server.uri()),
        timeout_secs: 5,
    }
}

fn set_credentials(settings: &SearchSection) {
    std::env::set_var(&settings.api_key_env, "test-api-key");
    std::env::set_var(&settings.engine_id_env, "test-engine");
}

fn items(n: usize) -> serde_json::Value {
    let items: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "kind": "customsearch#result",
                "title": format!("Result {i}"),
                "link": format!("https://example.com/{i}"),
                "snippet": format!("Snippet {i}"),
                "displayLink": "example.com",
                "pagemap": {"metatags": [{"og:type": "article"}]}
            })
        })
        .collect();
    json!({
        "searchInformation": {"totalResults": "4200"},
        "items": items
    })
}

#[tokio::test]
async fn test_missing_credentials_never_call_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(1)))
        .expect(0)
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(settings(&server, "MISSING_BOTH"));
    let result = tool.search("rust async", 5).await;

    let failure = result.failure().expect("missing credentials must be an error");
    assert_eq!(failure.kind, ErrorKind::Configuration);
    assert!(failure.message.contains("RESEARCH_AGENT_TEST_MISSING_BOTH_KEY"));
    assert!(failure.message.contains("RESEARCH_AGENT_TEST_MISSING_BOTH_CX"));
}

#[tokio::test]
async fn test_missing_engine_id_alone_is_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(1)))
        .expect(0)
        .mount(&server)
        .await;

    let settings = settings(&server, "MISSING_CX");
    std::env::set_var(&settings.api_key_env, "test-api-key");

    let result = WebSearchTool::new(settings).search("rust", 5).await;
    assert_eq!(result.failure().unwrap().kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_successful_search_normalizes_results_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "test-api-key"))
        .and(query_param("cx", "test-engine"))
        .and(query_param("q", "rust async"))
        .and(query_param("num", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(3)))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server, "SUCCESS");
    set_credentials(&settings);

    let value = WebSearchTool::new(settings)
        .execute(&json!({"query": "rust async", "num_results": 3}))
        .await
        .into_value();

    assert_eq!(value["status"], "success");
    assert_eq!(value["query"], "rust async");
    assert_eq!(value["count"], 3);
    assert_eq!(value["total_results"], 4200);
    assert!(value.get("message").is_none());

    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (i, item) in results.iter().enumerate() {
        let keys: Vec<&String> = item.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3, "only title/link/snippet are forwarded");
        assert_eq!(item["link"], format!("https://example.com/{i}"));
        assert_eq!(item["title"], format!("Result {i}"));
    }
}

#[tokio::test]
async fn test_default_result_count_is_five() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("num", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(5)))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server, "DEFAULT_COUNT");
    set_credentials(&settings);

    let value = WebSearchTool::new(settings)
        .execute(&json!({"query": "weather in Tokyo"}))
        .await
        .into_value();

    assert_eq!(value["count"], 5);
}

#[tokio::test]
async fn test_oversized_result_count_is_clamped_to_ten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(10)))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server, "CLAMP");
    set_credentials(&settings);

    let result = WebSearchTool::new(settings).search("rust", 50).await;
    assert!(result.payload().unwrap().results.len() <= 10);
}

#[tokio::test]
async fn test_zero_items_is_success_with_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchInformation": {"totalResults": "0"}
        })))
        .mount(&server)
        .await;

    let settings = settings(&server, "ZERO_ITEMS");
    set_credentials(&settings);

    let value = WebSearchTool::new(settings)
        .search("an extremely unlikely query", 5)
        .await
        .into_value();

    assert_eq!(value["status"], "success");
    assert_eq!(value["count"], 0);
    assert_eq!(value["results"], json!([]));
}

#[tokio::test]
async fn test_quota_error_is_reported_without_leaking_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Quota exceeded for quota metric 'Queries'"}
        })))
        .mount(&server)
        .await;

    let settings = settings(&server, "QUOTA");
    set_credentials(&settings);

    let value = WebSearchTool::new(settings).search("rust", 5).await.into_value();

    assert_eq!(value["status"], "error");
    assert_eq!(value["kind"], "transport");
    let message = value["message"].as_str().unwrap();
    assert!(message.contains("429"));
    assert!(message.contains("Quota exceeded"));
    assert!(!message.contains("test-api-key"));
    assert!(value.get("results").is_none());
}

#[tokio::test]
async fn test_malformed_response_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let settings = settings(&server, "MALFORMED");
    set_credentials(&settings);

    let result = WebSearchTool::new(settings).search("rust", 5).await;
    assert_eq!(result.failure().unwrap().kind, ErrorKind::Transport);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let server = MockServer::start().await;
    let mut settings = settings(&server, "UNREACHABLE");
    settings.base_url = "http://127.0.0.1:1/customsearch/v1".to_string();
    set_credentials(&settings);

    let value = WebSearchTool::new(settings).search("rust", 5).await.into_value();

    assert_eq!(value["status"], "error");
    assert_eq!(value["kind"], "transport");
    assert!(!value["message"].as_str().unwrap().contains("test-api-key"));
}

#[tokio::test]
async fn test_blank_query_is_rejected_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(1)))
        .expect(0)
        .mount(&server)
        .await;

    let settings = settings(&server, "BLANK_QUERY");
    set_credentials(&settings);

    let result = WebSearchTool::new(settings).search("   ", 5).await;
    assert_eq!(result.failure().unwrap().kind, ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_over_returned_items_are_capped_at_requested_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("num", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(5)))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server, "OVER_RETURN");
    set_credentials(&settings);

    let results = WebSearchTool::new(settings).search("rust", 2).await;
    let results = results.payload().unwrap();

    assert_eq!(results.count, 2);
    assert_eq!(results.results.len(), 2);
    assert_eq!(results.results[1].link, "https://example.com/1");
}

#[tokio::test]
async fn test_query_is_echoed_as_given_and_sent_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "rust async"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(1)))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings(&server, "ECHO_QUERY");
    set_credentials(&settings);

    let value = WebSearchTool::new(settings)
        .search("  rust async ", 1)
        .await
        .into_value();

    assert_eq!(value["status"], "success");
    assert_eq!(value["query"], "  rust async ");
}
