use serde::Serialize;
use thiserror::Error;
use wm_llm::LlmError;

/// One schema violation, addressed by JSON pointer into the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("schema for flow '{flow}' does not compile: {message}")]
    Schema { flow: &'static str, message: String },
    #[error("payload does not match flow '{flow}': {source}")]
    Decode {
        flow: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Llm(#[from] LlmError),
}
