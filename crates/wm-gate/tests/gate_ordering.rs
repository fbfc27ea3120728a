use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use wm_access::LicenseRegistry;
use wm_flows::FlowRegistry;
use wm_gate::rate_limit::{FixedSampler, ManualClock};
use wm_gate::{FlowRequest, GateError, ProxyGate, RateLimitConfig, RateLimiter};
use wm_llm::{DynProvider, LlmError, ProviderAdapter, Request, Response, Usage};

const KEY: &str = "WHP-TEST-KEY-12345";
const CLIENT: &str = "203.0.113.7";

enum Behaviour {
    Reply(&'static str),
    Fail,
    Stall,
}

struct StubProvider {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl StubProvider {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProviderAdapter for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _request: Request) -> Result<Response, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = match self.behaviour {
            Behaviour::Reply(text) => text,
            Behaviour::Fail => return Err(LlmError::Network("connection reset by peer".into())),
            Behaviour::Stall => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "too late"
            }
        };
        Ok(Response {
            provider: "stub".into(),
            model: "stub-1".into(),
            text: text.into(),
            finish_reason: None,
            usage: Usage::default(),
        })
    }
}

fn gate(limit: u32, provider: Option<DynProvider>) -> ProxyGate {
    let limiter = RateLimiter::with_parts(
        RateLimitConfig {
            limit,
            window: Duration::from_secs(3600),
        },
        Arc::new(ManualClock::at(1_700_000_000_000)),
        Arc::new(FixedSampler(false)),
    );
    ProxyGate::new(
        LicenseRegistry::builtin(),
        Arc::new(limiter),
        Arc::new(FlowRegistry::builtin().unwrap()),
        provider,
    )
}

fn request(flow: &str, payload: Value, key: Option<&str>) -> FlowRequest {
    FlowRequest {
        flow: flow.into(),
        payload,
        license_key: key.map(Into::into),
    }
}

fn coach_payload() -> Value {
    json!({ "userName": "Ana" })
}

#[tokio::test]
async fn license_is_checked_before_anything_else() {
    let gate = gate(1, None);
    for key in [None, Some(""), Some("WHP-FAKE-0000")] {
        let err = gate
            .handle(request("noSuchFlow", json!("garbage"), key), CLIENT)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized), "{key:?}: {err:?}");
    }
}

#[tokio::test]
async fn padded_license_key_is_not_normalized() {
    let provider = StubProvider::new(Behaviour::Reply("ok"));
    let gate = gate(1, Some(provider.clone() as DynProvider));
    for padded in [" WHP-TEST-KEY-12345\n", "WHP-TEST-KEY-12345 "] {
        let err = gate
            .handle(request("wealthCoach", coach_payload(), Some(padded)), CLIENT)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Unauthorized), "{padded:?}: {err:?}");
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

    // Rejected padded keys spent none of the exact key's single request.
    let data = gate
        .handle(request("wealthCoach", coach_payload(), Some(KEY)), CLIENT)
        .await
        .unwrap();
    assert_eq!(data, json!({ "advice": "ok" }));
}

#[tokio::test]
async fn rate_limit_is_checked_before_flow_lookup() {
    let gate = gate(1, None);
    let first = gate
        .handle(request("noSuchFlow", json!({}), Some(KEY)), CLIENT)
        .await
        .unwrap_err();
    assert!(matches!(first, GateError::UnknownFlow(name) if name == "noSuchFlow"));

    let second = gate
        .handle(request("noSuchFlow", json!({}), Some(KEY)), CLIENT)
        .await
        .unwrap_err();
    match second {
        GateError::RateLimited {
            remaining,
            reset_time_ms,
        } => {
            assert_eq!(remaining, 0);
            assert_eq!(reset_time_ms, 1_700_000_000_000 + 3_600_000);
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn schema_violation_lists_field_paths() {
    let gate = gate(10, None);
    let err = gate
        .handle(
            request("wealthChat", json!({ "message": "", "history": "no" }), Some(KEY)),
            CLIENT,
        )
        .await
        .unwrap_err();
    match err {
        GateError::InvalidPayload(details) => {
            let paths: Vec<_> = details.iter().map(|d| d.path.as_str()).collect();
            assert!(paths.contains(&"/message"), "{paths:?}");
            assert!(paths.contains(&"/history"), "{paths:?}");
        }
        other => panic!("expected invalid payload, got {other:?}"),
    }
}

#[tokio::test]
async fn valid_request_without_secret_is_a_server_error() {
    let gate = gate(10, None);
    let err = gate
        .handle(request("wealthCoach", coach_payload(), Some(KEY)), CLIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::MissingSecret));
}

#[tokio::test]
async fn successful_flow_returns_shaped_output() {
    let provider = StubProvider::new(Behaviour::Reply("Pay yourself first."));
    let gate = gate(10, Some(provider.clone() as DynProvider));
    let data = gate
        .handle(request("wealthCoach", coach_payload(), Some(KEY)), CLIENT)
        .await
        .unwrap();
    assert_eq!(data, json!({ "advice": "Pay yourself first." }));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_upstream_call_still_consumes_quota() {
    let provider = StubProvider::new(Behaviour::Fail);
    let gate = gate(2, Some(provider.clone() as DynProvider));
    for _ in 0..2 {
        let err = gate
            .handle(request("wealthCoach", coach_payload(), Some(KEY)), CLIENT)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::Upstream(_)), "{err:?}");
    }
    let err = gate
        .handle(request("wealthCoach", coach_payload(), Some(KEY)), CLIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::RateLimited { .. }));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn stalled_upstream_surfaces_as_timeout() {
    let provider = StubProvider::new(Behaviour::Stall);
    let gate = gate(10, Some(provider as DynProvider))
        .with_upstream_timeout(Duration::from_millis(50));
    let err = gate
        .handle(request("wealthCoach", coach_payload(), Some(KEY)), CLIENT)
        .await
        .unwrap_err();
    assert!(matches!(err, GateError::UpstreamTimeout));
}
