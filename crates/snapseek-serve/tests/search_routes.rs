//! Search routes against a fake intent resolver and a mock index service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use snapseek_core::{DEFAULT_URL_TEMPLATE, IndexClient, IndexConfig, SigV4Signer};
use snapseek_serve::{AppState, Config, IntentError, IntentResolver, router};

/// Resolver with a canned answer that counts its calls.
struct FakeResolver {
    answer: Result<Vec<&'static str>, &'static str>,
    calls: AtomicUsize,
}

impl FakeResolver {
    fn answering(values: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(values),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: Err("bot unavailable"),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IntentResolver for FakeResolver {
    async fn resolve(&self, _text: &str) -> Result<Vec<String>, IntentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Ok(values) => Ok(values.iter().map(|v| v.to_string()).collect()),
            Err(msg) => Err(IntentError(msg.to_string())),
        }
    }
}

fn app(server: &MockServer, resolver: Arc<FakeResolver>) -> axum::Router {
    let index = IndexConfig {
        endpoint: server.uri(),
        index: "photos".to_string(),
        region: "us-east-1".to_string(),
        service: "es".to_string(),
        timeout: Duration::from_secs(5),
    };
    let creds = Credentials::new("AKIDEXAMPLE", "secret", None, None, "test");
    let signer = SigV4Signer::new(
        SharedCredentialsProvider::new(creds),
        &index.service,
        &index.region,
    );
    let client = IndexClient::new(&index.endpoint, signer, index.timeout).expect("client builds");

    let config = Config {
        bind_addr: "127.0.0.1:0".to_string(),
        index,
        bot_id: "BOT".to_string(),
        bot_alias_id: "ALIAS".to_string(),
        locale_id: "en_US".to_string(),
        session_id: "test".to_string(),
        url_template: DEFAULT_URL_TEMPLATE.to_string(),
    };

    router(AppState::new(config, client, resolver))
}

async fn json_body(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must be collected")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response is JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builder must not fail")
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builder must not fail")
}

fn assert_allows_any_origin(response: &Response) {
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

async fn expect_no_index_calls(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(server)
        .await;
}

fn hits(sources: &[Value]) -> Value {
    let hits: Vec<Value> = sources.iter().map(|s| json!({"_source": s})).collect();
    json!({"hits": {"total": {"value": hits.len()}, "hits": hits}})
}

#[tokio::test]
async fn missing_q_returns_400_without_upstream_calls() {
    let server = MockServer::start().await;
    expect_no_index_calls(&server).await;
    let resolver = FakeResolver::answering(vec!["dog"]);

    let response = app(&server, resolver.clone())
        .oneshot(get("/search"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_allows_any_origin(&response);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Missing query parameter q"})
    );
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn empty_q_returns_400() {
    let server = MockServer::start().await;
    expect_no_index_calls(&server).await;

    let response = app(&server, FakeResolver::answering(vec![]))
        .oneshot(get("/search?q="))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resolver_outage_falls_back_to_tokenizer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/photos/_search"))
        .and(body_json(
            json!({"query": {"terms": {"labels.keyword": ["dog", "park"]}}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&[json!({
            "objectKey": "a b.jpg",
            "bucket": "b1",
            "createdTimestamp": "2024-05-01T00:00:00.000000Z",
            "labels": ["dog", "park", "sunny"]
        })])))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = FakeResolver::failing();
    let response = app(&server, resolver.clone())
        .oneshot(get("/search?q=show%20me%20photos%20with%20dog%20and%20park"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_allows_any_origin(&response);
    assert_eq!(
        json_body(response).await,
        json!({"results": [{
            "objectKey": "a b.jpg",
            "bucket": "b1",
            "labels": ["dog", "park", "sunny"],
            "url": "https://b1.s3.amazonaws.com/a%20b.jpg"
        }]})
    );
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn resolver_slots_drive_the_terms_filter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/photos/_search"))
        .and(body_json(
            json!({"query": {"terms": {"labels.keyword": ["cat", "snow"]}}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server, FakeResolver::answering(vec!["Cat", "snow", "cat"]))
        .oneshot(get("/search?q=kitties+playing+outside"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"results": []}));
}

#[tokio::test]
async fn repeated_q_uses_last_value() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/photos/_search"))
        .and(body_json(
            json!({"query": {"terms": {"labels.keyword": ["cat"]}}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server, FakeResolver::failing())
        .oneshot(get("/search?q=dog&q=cat"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_allows_any_origin(&response);
    assert_eq!(json_body(response).await, json!({"results": []}));
}

#[tokio::test]
async fn only_stop_words_short_circuits_without_index_call() {
    let server = MockServer::start().await;
    expect_no_index_calls(&server).await;

    let response = app(&server, FakeResolver::answering(vec![]))
        .oneshot(get("/search?q=show+me+photos"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_allows_any_origin(&response);
    assert_eq!(json_body(response).await, json!({"results": []}));
}

#[tokio::test]
async fn index_failure_returns_500_with_empty_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/photos/_search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server, FakeResolver::answering(vec!["dog"]))
        .oneshot(get("/search?q=dog"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_allows_any_origin(&response);
    assert_eq!(json_body(response).await, json!({"results": []}));
}

#[tokio::test]
async fn malformed_index_response_returns_500() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/photos/_search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"hits": {"hits": [{"_source": {"bucket": "b1"}}]}})),
        )
        .mount(&server)
        .await;

    let response = app(&server, FakeResolver::answering(vec!["dog"]))
        .oneshot(get("/search?q=dog"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({"results": []}));
}

#[tokio::test]
async fn post_body_field_takes_precedence() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/photos/_search"))
        .and(body_json(
            json!({"query": {"terms": {"labels.keyword": ["beach"]}}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(hits(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server, FakeResolver::failing())
        .oneshot(post("/search?q=mountains", json!({"q": "photos with beach"})))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_without_q_returns_400() {
    let server = MockServer::start().await;
    expect_no_index_calls(&server).await;

    let response = app(&server, FakeResolver::answering(vec!["dog"]))
        .oneshot(post("/search", json!({"text": "dog"})))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_allows_any_origin(&response);
}

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start().await;

    let response = app(&server, FakeResolver::answering(vec![]))
        .oneshot(get("/health"))
        .await
        .expect("handler should respond");

    assert_eq!(response.status(), StatusCode::OK);
    assert_allows_any_origin(&response);
    assert_eq!(json_body(response).await["status"], "ok");
}
