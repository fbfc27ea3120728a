use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request as HttpRequest, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wm_access::LicenseRegistry;
use wm_flows::FlowRegistry;
use wm_gate::rate_limit::{FixedSampler, ManualClock};
use wm_gate::{ProxyGate, RateLimitConfig, RateLimiter, http};
use wm_llm::{LlmError, ProviderAdapter, Request, Response, Usage};

struct EchoProvider;

#[async_trait]
impl ProviderAdapter for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: Request) -> Result<Response, LlmError> {
        let last = request
            .messages
            .last()
            .map(|m| m.text.clone())
            .unwrap_or_default();
        Ok(Response {
            provider: "echo".into(),
            model: "echo-1".into(),
            text: format!("echo: {last}"),
            finish_reason: None,
            usage: Usage::default(),
        })
    }
}

fn gate(limit: u32) -> Arc<ProxyGate> {
    let limiter = RateLimiter::with_parts(
        RateLimitConfig {
            limit,
            window: Duration::from_secs(3600),
        },
        Arc::new(ManualClock::at(1_000)),
        Arc::new(FixedSampler(false)),
    );
    Arc::new(ProxyGate::new(
        LicenseRegistry::builtin(),
        Arc::new(limiter),
        Arc::new(FlowRegistry::builtin().unwrap()),
        Some(Arc::new(EchoProvider)),
    ))
}

async fn spawn(gate: Arc<ProxyGate>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = http::router(gate);
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, server)
}

#[tokio::test]
async fn chat_flow_round_trip_over_http() {
    let (addr, server) = spawn(gate(5)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/flow"))
        .header("x-forwarded-for", "198.51.100.9")
        .json(&json!({
            "flow": "wealthChat",
            "licenseKey": "WHP-2024-PREMIUM-001",
            "payload": { "message": "Should I pay off debt first?" }
        }))
        .send()
        .await
        .expect("post flow");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.expect("decode json");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["reply"], "echo: Should I pay off debt first?");

    let health: Value = client
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .expect("get health")
        .json()
        .await
        .expect("decode health");
    assert_eq!(health["ok"], true);
    assert_eq!(health["flows"].as_array().map(Vec::len), Some(3));

    server.abort();
    let _ = server.await;
}

#[tokio::test]
async fn rejected_requests_carry_error_bodies() {
    let (addr, server) = spawn(gate(1)).await;
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/api/flow");

    let unauthorized = client
        .post(&url)
        .json(&json!({ "flow": "wealthCoach", "payload": { "userName": "Ana" } }))
        .send()
        .await
        .expect("post");
    assert_eq!(unauthorized.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = unauthorized.json().await.expect("json");
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let body = json!({
        "flow": "wealthCoach",
        "licenseKey": "WHP-TEST-KEY-12345",
        "payload": { "userName": "Ana" }
    });
    let ok = client.post(&url).json(&body).send().await.expect("post");
    assert_eq!(ok.status(), reqwest::StatusCode::OK);

    let limited = client.post(&url).json(&body).send().await.expect("post");
    assert_eq!(limited.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    let limited: Value = limited.json().await.expect("json");
    assert_eq!(limited["remainingRequests"], 0);
    assert_eq!(limited["resetTime"], 1_000 + 3_600_000);

    server.abort();
    let _ = server.await;
}

#[tokio::test]
async fn unknown_flow_and_bad_payload_are_bad_requests() {
    let app = http::router(gate(10));

    let unknown = app
        .clone()
        .oneshot(
            HttpRequest::post("/api/flow")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"flow":"exportSecrets","licenseKey":"WHP-TEST-KEY-12345","payload":{}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

    let invalid = app
        .clone()
        .oneshot(
            HttpRequest::post("/api/flow")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"flow":"predictiveInsights","licenseKey":"WHP-TEST-KEY-12345","payload":{"goals":[]}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(invalid.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "invalid_payload");
    assert!(body["details"].as_array().is_some_and(|d| !d.is_empty()));

    let malformed = app
        .oneshot(
            HttpRequest::post("/api/flow")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}
