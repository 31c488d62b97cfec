//! Integration tests for `RefreshOrchestrator` using wiremock HTTP mocks.
//!
//! Each test stands up a local server and points the engine at it through
//! the settings `api_base` override, so no real network traffic is made.
//! Covers the happy path, every failure class the orchestrator can absorb,
//! the serial-delay backpressure, and the parallel settle-all behaviour.

use std::time::{Duration, Instant};

use serde_json::json;
use serpwatch_core::{Device, Keyword, ScrapeFailure, ScrapeSettings};
use serpwatch_scraper::{RefreshOrchestrator, RetryQueue};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn keyword(id: i64, text: &str) -> Keyword {
    Keyword {
        id,
        keyword: text.to_string(),
        domain: "example.com".to_string(),
        device: Device::Desktop,
        country: "US".to_string(),
        city: None,
        state: None,
    }
}

fn settings(provider: &str, base_url: &str) -> ScrapeSettings {
    ScrapeSettings {
        provider: Some(provider.to_string()),
        api_key: "test-key".to_string(),
        request_timeout_secs: 5,
        api_base: Some(base_url.to_string()),
        ..ScrapeSettings::default()
    }
}

fn queue_in(dir: &tempfile::TempDir) -> RetryQueue {
    RetryQueue::new(dir.path().join("failed_queue.json"))
}

/// SerpApi-shaped body with `example.com` ranked third.
fn serpapi_body() -> serde_json::Value {
    json!({
        "organic_results": [
            {"position": 1, "title": "Other", "link": "https://other.example/"},
            {"position": 2, "title": "Also other", "link": "https://unrelated.example/"},
            {"position": 3, "title": "Target", "link": "https://www.example.com/page"},
        ]
    })
}

/// ScrapingRobot-shaped envelope wrapping a one-result desktop SERP.
fn scrapingrobot_body() -> serde_json::Value {
    let page = r#"<div id="search"><div class="g"><a href="https://www.example.com/page"><h3>Target</h3></a></div></div>"#;
    json!({"status": "ok", "result": page})
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_resolves_rank_and_clears_the_retry_queue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&serpapi_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    // A previously failed keyword must be dequeued once it succeeds.
    queue.enqueue(1).await.expect("seed queue");

    let orchestrator =
        RefreshOrchestrator::new(settings("serpapi", &server.uri())).expect("orchestrator");
    let results = orchestrator.refresh(&[keyword(1, "best coffee beans")], &queue).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].keyword_id, 1);
    assert_eq!(results[0].position(), Some(3));
    let success = results[0].outcome.as_ref().expect("scrape should succeed");
    assert_eq!(success.rank.url, "https://www.example.com/page");
    assert_eq!(success.serp.len(), 3);
    assert!(queue.list_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn unranked_domain_is_a_success_with_position_zero() {
    let server = MockServer::start().await;
    let body = json!({
        "organic_results": [
            {"position": 1, "title": "Other", "link": "https://other.example/"},
        ]
    });
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let orchestrator =
        RefreshOrchestrator::new(settings("serpapi", &server.uri())).expect("orchestrator");
    let results = orchestrator.refresh(&[keyword(1, "niche query")], &queue).await;

    assert_eq!(results[0].position(), Some(0), "not-found must be a success, not a failure");
    assert!(queue.list_all().await.expect("list").is_empty(), "zero rank must not be queued");
}

// ---------------------------------------------------------------------------
// Failure classes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transport_failure_is_absorbed_and_enqueued() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let orchestrator =
        RefreshOrchestrator::new(settings("serpapi", &server.uri())).expect("orchestrator");
    let results = orchestrator.refresh(&[keyword(7, "flaky")], &queue).await;

    assert_eq!(results.len(), 1);
    match &results[0].outcome {
        Err(ScrapeFailure::Transport { message }) => {
            assert!(message.contains("500"), "original status preserved: {message}");
        }
        other => panic!("expected Transport failure, got {other:?}"),
    }
    assert_eq!(queue.list_all().await.expect("list"), vec![7]);
}

#[tokio::test]
async fn malformed_provider_json_reports_extraction_naming_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let orchestrator =
        RefreshOrchestrator::new(settings("serpapi", &server.uri())).expect("orchestrator");
    let results = orchestrator.refresh(&[keyword(2, "broken")], &queue).await;

    assert!(matches!(
        results[0].outcome,
        Err(ScrapeFailure::Extraction { ref provider, .. }) if provider == "serpapi"
    ));
    assert_eq!(queue.list_all().await.expect("list"), vec![2]);
}

#[tokio::test]
async fn empty_listing_is_a_failure_not_a_zero_rank() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(&json!({"organic_results": []})),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let orchestrator =
        RefreshOrchestrator::new(settings("serpapi", &server.uri())).expect("orchestrator");
    let results = orchestrator.refresh(&[keyword(3, "no results")], &queue).await;

    assert!(matches!(results[0].outcome, Err(ScrapeFailure::EmptyResults)));
    assert_eq!(queue.list_all().await.expect("list"), vec![3]);
}

#[tokio::test]
async fn missing_credentials_fail_fast_without_sending_anything() {
    let server = MockServer::start().await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let mut settings = settings("serpapi", &server.uri());
    settings.api_key = String::new();
    let orchestrator = RefreshOrchestrator::new(settings).expect("orchestrator");
    let results = orchestrator.refresh(&[keyword(4, "unconfigured")], &queue).await;

    assert!(matches!(
        results[0].outcome,
        Err(ScrapeFailure::NotConfigured { .. })
    ));
    assert_eq!(queue.list_all().await.expect("list"), vec![4]);
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty(), "no request may be sent when construction fails");
}

// ---------------------------------------------------------------------------
// Serial path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn serial_refresh_applies_the_inter_request_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&scrapingrobot_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let mut settings = settings("scrapingrobot", &server.uri());
    settings.scrape_delay_ms = 500;
    let orchestrator = RefreshOrchestrator::new(settings).expect("orchestrator");

    let started = Instant::now();
    let results = orchestrator
        .refresh(&[keyword(1, "first"), keyword(2, "second")], &queue)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(serpwatch_core::RefreshResult::is_success));
    assert!(
        elapsed >= Duration::from_millis(500),
        "delay must separate serial dispatches, elapsed {elapsed:?}"
    );
}

#[tokio::test]
async fn serial_batch_continues_past_a_failing_keyword() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "alive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&scrapingrobot_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "dead"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let orchestrator =
        RefreshOrchestrator::new(settings("scrapingrobot", &server.uri())).expect("orchestrator");
    let results = orchestrator
        .refresh(&[keyword(1, "dead"), keyword(2, "alive")], &queue)
        .await;

    assert_eq!(results.len(), 2, "the failing first keyword must not stop the batch");
    assert!(matches!(results[0].outcome, Err(ScrapeFailure::Transport { .. })));
    assert!(results[1].is_success());
    assert_eq!(queue.list_all().await.expect("list"), vec![1]);
}

// ---------------------------------------------------------------------------
// Parallel path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn parallel_refresh_settles_every_keyword_in_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "alpha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&serpapi_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "beta"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "gamma"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&serpapi_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let orchestrator =
        RefreshOrchestrator::new(settings("serpapi", &server.uri())).expect("orchestrator");
    let batch = [keyword(1, "alpha"), keyword(2, "beta"), keyword(3, "gamma")];
    let results = orchestrator.refresh(&batch, &queue).await;

    // One transport failure must not collapse the batch: every keyword
    // settles with its own result, positionally matching the input.
    assert_eq!(results.len(), 3);
    assert_eq!(
        results.iter().map(|r| r.keyword_id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(results[0].is_success());
    assert!(matches!(results[1].outcome, Err(ScrapeFailure::Transport { .. })));
    assert!(results[2].is_success());
    assert_eq!(queue.list_all().await.expect("list"), vec![2]);
}

// ---------------------------------------------------------------------------
// Direct path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn direct_path_parses_raw_html_and_resolves_rank() {
    let server = MockServer::start().await;
    let page = r#"
        <html><body><div id="search">
            <div class="g"><a href="https://other.example/a"><h3>Other</h3></a></div>
            <div class="g"><a href="/url?q=https%3A%2F%2Fwww.example.com%2Flanding&sa=U"><h3>Target</h3></a></div>
        </div></body></html>
    "#;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "best coffee beans"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let queue = queue_in(&dir);
    let settings = ScrapeSettings {
        provider: None,
        request_timeout_secs: 5,
        api_base: Some(server.uri()),
        ..ScrapeSettings::default()
    };
    let orchestrator = RefreshOrchestrator::new(settings).expect("orchestrator");
    let results = orchestrator.refresh(&[keyword(9, "best coffee beans")], &queue).await;

    let success = results[0].outcome.as_ref().expect("scrape should succeed");
    assert_eq!(success.rank.position, 2);
    assert_eq!(success.rank.url, "https://www.example.com/landing");
}
