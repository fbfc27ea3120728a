//! License-gated proxy in front of the AI flows.

pub mod config;
mod error;
pub mod gate;
pub mod http;
pub mod rate_limit;

pub use config::{GateConfig, StartupError};
pub use error::GateError;
pub use gate::{FlowRequest, ProxyGate, client_ip};
pub use rate_limit::{RateLimitConfig, RateLimitDecision, RateLimiter};
