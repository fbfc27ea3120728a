//! `wealthmap serve`: run the license-gated AI proxy.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use wm_gate::{GateConfig, RateLimitConfig};
use wm_llm::GeminiAdapterConfig;

use crate::opts::GlobalOpts;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (env: WEALTHMAP_BIND)
    #[arg(long, env = "WEALTHMAP_BIND", default_value = wm_gate::config::DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Requests per license and client per hour (env: WEALTHMAP_RATE_LIMIT)
    #[arg(long, env = "WEALTHMAP_RATE_LIMIT", default_value_t = wm_gate::rate_limit::DEFAULT_LIMIT)]
    pub rate_limit: u32,

    /// Outbound AI call timeout in milliseconds (env: WEALTHMAP_UPSTREAM_TIMEOUT_MS)
    #[arg(long, env = "WEALTHMAP_UPSTREAM_TIMEOUT_MS", default_value_t = 60_000)]
    pub upstream_timeout_ms: u64,
}

pub async fn cmd_serve(opts: &GlobalOpts, args: &ServeArgs) -> Result<()> {
    let config = GateConfig {
        bind: args.bind,
        rate_limit: RateLimitConfig {
            limit: args.rate_limit,
            ..RateLimitConfig::default()
        },
        upstream_timeout: Duration::from_millis(args.upstream_timeout_ms),
        license_file: opts.license_file.clone(),
        gemini: GeminiAdapterConfig::from_env(),
    };
    let gate = config.build_gate().context("configure proxy")?;
    wm_gate::http::serve(config.bind, Arc::new(gate))
        .await
        .context("run proxy")
}
