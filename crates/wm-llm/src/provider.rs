use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::LlmError;
use crate::types::{Request, Response};

pub type DynProvider = Arc<dyn ProviderAdapter>;

/// One generative-AI backend.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: Request) -> Result<Response, LlmError>;
}
