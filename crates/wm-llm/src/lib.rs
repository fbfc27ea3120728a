//! Generative-AI client used by the proxy flows.
//!
//! A [`ProviderAdapter`] turns a provider-neutral [`Request`] into one HTTP
//! call. There is no retry layer: every failure reaches the caller.

pub mod errors;
pub mod gemini;
pub mod provider;
pub mod types;

pub use errors::*;
pub use gemini::{GeminiAdapter, GeminiAdapterConfig};
pub use provider::{DynProvider, ProviderAdapter};
pub use types::*;
