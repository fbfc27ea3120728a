use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use wm_access::{LicenseError, LicenseRegistry};
use wm_flows::{FlowError, FlowRegistry};
use wm_llm::{GeminiAdapter, GeminiAdapterConfig, LlmError};

use crate::gate::{DEFAULT_UPSTREAM_TIMEOUT, ProxyGate};
use crate::rate_limit::{RateLimitConfig, RateLimiter};

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

#[derive(Debug, Clone)]
pub struct GateConfig {
    pub bind: SocketAddr,
    pub rate_limit: RateLimitConfig,
    pub upstream_timeout: Duration,
    /// Allowlist file; the built-in keys are used when unset.
    pub license_file: Option<PathBuf>,
    /// None means the server has no provider secret and will not start.
    pub gemini: Option<GeminiAdapterConfig>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            rate_limit: RateLimitConfig::default(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            license_file: None,
            gemini: GeminiAdapterConfig::from_env(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("GEMINI_API_KEY is not set; refusing to start without a provider secret")]
    MissingSecret,
    #[error("rate limit must be at least 1 request per window")]
    ZeroRateLimit,
    #[error(transparent)]
    Licenses(#[from] LicenseError),
    #[error(transparent)]
    Flows(#[from] FlowError),
    #[error(transparent)]
    Provider(#[from] LlmError),
    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("serve: {0}")]
    Serve(#[source] std::io::Error),
}

impl GateConfig {
    pub fn licenses(&self) -> Result<LicenseRegistry, LicenseError> {
        match &self.license_file {
            Some(path) => LicenseRegistry::from_file(path),
            None => Ok(LicenseRegistry::builtin()),
        }
    }

    /// Assembles a gate with the Gemini provider. Fails instead of producing a
    /// gate that would answer every flow with a missing-secret error.
    pub fn build_gate(&self) -> Result<ProxyGate, StartupError> {
        if self.rate_limit.limit == 0 {
            return Err(StartupError::ZeroRateLimit);
        }
        let gemini = self.gemini.clone().ok_or(StartupError::MissingSecret)?;
        let provider = GeminiAdapter::new(gemini)?;
        let licenses = self.licenses()?;
        tracing::info!(
            licenses = licenses.len(),
            model = provider.model(),
            limit = self.rate_limit.limit,
            "proxy gate configured"
        );
        Ok(ProxyGate::new(
            licenses,
            Arc::new(RateLimiter::new(self.rate_limit)),
            Arc::new(FlowRegistry::builtin()?),
            Some(Arc::new(provider)),
        )
        .with_upstream_timeout(self.upstream_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_refuses_to_build() {
        let config = GateConfig {
            gemini: None,
            ..GateConfig::default()
        };
        assert!(matches!(
            config.build_gate(),
            Err(StartupError::MissingSecret)
        ));
    }

    #[test]
    fn configured_secret_builds_gate() {
        let config = GateConfig {
            gemini: Some(GeminiAdapterConfig::new("test-secret")),
            ..GateConfig::default()
        };
        let gate = config.build_gate().unwrap();
        assert!(gate.has_provider());
        assert_eq!(gate.flows().len(), 3);
    }

    #[test]
    fn default_bind_matches_constant() {
        assert_eq!(GateConfig::default().bind.to_string(), DEFAULT_BIND);
    }
}
