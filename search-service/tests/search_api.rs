//! Router-level tests for the standalone server with mock collaborators.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use search_service::config::SERVER_DEFAULT_MODEL;
use search_service::services::log_store::mock::MockLogStore;
use search_service::services::providers::mock::MockCompletionProvider;
use search_service::services::relay::MAX_BODY_BYTES;
use search_service::services::{CompletionProvider, LogDispatch, SearchRelay};
use search_service::startup::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn static_dir() -> String {
    format!("{}/public", env!("CARGO_MANIFEST_DIR"))
}

fn app_with(relay: SearchRelay) -> Router {
    build_router(AppState { relay }, &static_dir())
}

fn app_answering(answer: &str) -> (Router, Arc<MockCompletionProvider>) {
    let provider = Arc::new(MockCompletionProvider::answering(answer));
    let relay = SearchRelay::new(
        Some(provider.clone() as Arc<dyn CompletionProvider>),
        SERVER_DEFAULT_MODEL,
    );
    (app_with(relay), provider)
}

fn search_request(method: Method, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri("/api/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn post_json(body: Value) -> Request<Body> {
    search_request(Method::POST, body.to_string())
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn answers_query_from_provider() {
    let (app, provider) = app_answering("hi there");

    let response = app.oneshot(post_json(json!({ "query": "hello" }))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "answer": "hi there" }));

    let sent = provider.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].model, SERVER_DEFAULT_MODEL);
}

#[tokio::test]
async fn non_post_methods_are_rejected() {
    for method in [
        Method::GET,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::HEAD,
    ] {
        let (app, provider) = app_answering("unused");
        let response = app
            .oneshot(search_request(method.clone(), Body::empty()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers()[header::ALLOW], "POST", "{method}");
        assert!(provider.requests().is_empty());
    }
}

#[tokio::test]
async fn get_reports_method_not_allowed_body() {
    let (app, _) = app_answering("unused");
    let response = app
        .oneshot(search_request(Method::GET, Body::empty()))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await,
        json!({ "error": "Method not allowed" })
    );
}

#[tokio::test]
async fn invalid_queries_are_bad_requests() {
    for body in [
        json!({}),
        json!({ "query": 123 }),
        json!({ "query": "" }),
        json!({ "query": null }),
        json!({ "query": { "text": "hello" } }),
        json!(["hello"]),
    ] {
        let (app, provider) = app_answering("unused");
        let response = app.oneshot(post_json(body.clone())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body_json(response).await, json!({ "error": "Missing query" }));
        assert!(provider.requests().is_empty());
    }
}

#[tokio::test]
async fn malformed_json_is_a_missing_query() {
    let (app, _) = app_answering("unused");
    let response = app
        .oneshot(search_request(Method::POST, "{\"query\": "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Missing query" }));
}

#[tokio::test]
async fn missing_credential_is_server_misconfiguration() {
    let app = app_with(SearchRelay::new(None, SERVER_DEFAULT_MODEL));

    for query in ["hello", "anything else", "  "] {
        let response = app
            .clone()
            .oneshot(post_json(json!({ "query": query })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Missing GROQ_API_KEY on server" })
        );
    }
}

#[tokio::test]
async fn provider_failure_message_is_returned() {
    let provider = Arc::new(MockCompletionProvider::failing("rate limited"));
    let app = app_with(SearchRelay::new(Some(provider), SERVER_DEFAULT_MODEL));

    let response = app.oneshot(post_json(json!({ "query": "hello" }))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "rate limited" }));
}

#[tokio::test]
async fn provider_failure_without_message_is_unexpected_error() {
    let provider = Arc::new(MockCompletionProvider::failing(""));
    let app = app_with(SearchRelay::new(Some(provider), SERVER_DEFAULT_MODEL));

    let response = app.oneshot(post_json(json!({ "query": "hello" }))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "Unexpected error" }));
}

#[tokio::test]
async fn request_options_reach_the_provider() {
    let (app, provider) = app_answering("ok");

    let response = app
        .oneshot(post_json(json!({
            "query": "hello",
            "system": "Answer in French.",
            "model": "llama-3.3-70b",
            "temperature": "5"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = provider.requests();
    assert_eq!(sent[0].model, "llama-3.3-70b");
    assert_eq!(sent[0].temperature, 1.0);
    assert_eq!(sent[0].messages[0].content, "Answer in French.");
    assert_eq!(sent[0].messages[1].content, "hello");
}

#[tokio::test]
async fn failing_log_store_is_invisible() {
    for store in [MockLogStore::rejecting(), MockLogStore::hanging()] {
        let relay = SearchRelay::new(
            Some(Arc::new(MockCompletionProvider::answering("hi there"))),
            SERVER_DEFAULT_MODEL,
        )
        .with_log_store(Arc::new(store))
        .with_dispatch(LogDispatch::Detached);

        let response = tokio::time::timeout(
            Duration::from_secs(2),
            app_with(relay).oneshot(post_json(json!({ "query": "hello" }))),
        )
        .await
        .expect("response blocked on logging")
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "answer": "hi there" }));
    }
}

#[tokio::test]
async fn detached_insert_eventually_lands() {
    let store = Arc::new(MockLogStore::accepting());
    let relay = SearchRelay::new(
        Some(Arc::new(MockCompletionProvider::answering("hi there"))),
        SERVER_DEFAULT_MODEL,
    )
    .with_log_store(store.clone());

    let response = app_with(relay)
        .oneshot(post_json(json!({ "query": "hello", "temperature": 0.9 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::timeout(Duration::from_secs(2), async {
        while store.records().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("log insert never ran");

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].prompt, "hello");
    assert_eq!(records[0].answer, "hi there");
    assert_eq!(records[0].model, SERVER_DEFAULT_MODEL);
    assert_eq!(records[0].temperature, 0.9);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, provider) = app_answering("unused");
    let query = "a".repeat(MAX_BODY_BYTES);

    let response = app
        .oneshot(post_json(json!({ "query": query })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Request body too large" })
    );
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn health_reports_configuration() {
    let (app, _) = app_answering("unused");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "search-service");
    assert_eq!(body["provider_configured"], true);
    assert_eq!(body["logging_enabled"], false);
}

#[tokio::test]
async fn serves_bundled_ui() {
    let (app, _) = app_answering("unused");

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&bytes).contains("/api/search"));
}

#[tokio::test]
async fn responses_carry_request_id_and_cors() {
    let (app, _) = app_answering("hi");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/search")
                .header(header::ORIGIN, "http://example.com")
                .header("x-request-id", "req-42")
                .body(Body::from(json!({ "query": "hello" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (app, _) = app_answering("unused");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/search")
                .header(header::ORIGIN, "http://example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}
