//! The checks every proxied request passes through, in a fixed order:
//! license, rate limit, flow lookup, payload schema, provider, invocation.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use wm_access::LicenseRegistry;
use wm_flows::{FieldError, FlowError, FlowRegistry};
use wm_llm::{DynProvider, LlmError};

use crate::error::GateError;
use crate::rate_limit::RateLimiter;

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRequest {
    #[serde(default)]
    pub flow: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub license_key: Option<String>,
}

/// First `x-forwarded-for` entry, then `x-real-ip`, then [`UNKNOWN_CLIENT`].
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| {
            raw.split(',').find_map(|part| {
                let trimmed = part.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
        });
    if let Some(ip) = forwarded {
        return ip;
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub struct ProxyGate {
    licenses: LicenseRegistry,
    limiter: Arc<RateLimiter>,
    flows: Arc<FlowRegistry>,
    provider: Option<DynProvider>,
    upstream_timeout: Duration,
}

impl std::fmt::Debug for ProxyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyGate")
            .field("licenses", &self.licenses.len())
            .field("limiter", &self.limiter)
            .field("flows", &self.flows.names().collect::<Vec<_>>())
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl ProxyGate {
    pub fn new(
        licenses: LicenseRegistry,
        limiter: Arc<RateLimiter>,
        flows: Arc<FlowRegistry>,
        provider: Option<DynProvider>,
    ) -> Self {
        Self {
            licenses,
            limiter,
            flows,
            provider,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    pub fn flows(&self) -> &FlowRegistry {
        &self.flows
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn handle(&self, request: FlowRequest, client: &str) -> Result<Value, GateError> {
        let license = request
            .license_key
            .as_deref()
            .filter(|key| self.licenses.is_valid(key))
            .ok_or(GateError::Unauthorized)?;

        let decision = self.limiter.check(license, client);
        if !decision.allowed {
            tracing::info!(client, flow = %request.flow, "rate limited");
            return Err(GateError::RateLimited {
                remaining: decision.remaining,
                reset_time_ms: decision.reset_time_ms,
            });
        }

        let flow = self
            .flows
            .get(&request.flow)
            .ok_or_else(|| GateError::UnknownFlow(request.flow.clone()))?;

        flow.validate(&request.payload)
            .map_err(GateError::InvalidPayload)?;

        let provider = self.provider.as_ref().ok_or_else(|| {
            tracing::error!("flow requested but no AI provider secret is configured");
            GateError::MissingSecret
        })?;

        tracing::info!(
            client,
            flow = flow.name(),
            remaining = decision.remaining,
            "invoking flow"
        );
        match tokio::time::timeout(
            self.upstream_timeout,
            flow.run(provider.as_ref(), request.payload),
        )
        .await
        {
            Err(_) => {
                tracing::warn!(flow = flow.name(), timeout = ?self.upstream_timeout, "upstream timed out");
                Err(GateError::UpstreamTimeout)
            }
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) => Err(map_flow_error(flow.name(), err)),
        }
    }
}

fn map_flow_error(flow: &str, err: FlowError) -> GateError {
    match err {
        FlowError::Llm(err) if err.is_timeout() => {
            tracing::warn!(flow, "upstream timed out: {err}");
            GateError::UpstreamTimeout
        }
        FlowError::Decode { source, .. } => GateError::InvalidPayload(vec![FieldError {
            path: "/".into(),
            message: source.to_string(),
        }]),
        FlowError::Llm(LlmError::Provider(err)) => {
            tracing::error!(flow, kind = ?err.kind, status = ?err.status_code, "provider error: {}", err.message);
            GateError::Upstream(err.message)
        }
        other => {
            tracing::error!(flow, "flow failed: {other}");
            GateError::Upstream(other.to_string())
        }
    }
}
