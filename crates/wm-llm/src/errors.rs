//! Error taxonomy for provider calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider error classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Authentication,
    AccessDenied,
    NotFound,
    InvalidRequest,
    RateLimit,
    Server,
    ContentFilter,
    ContextLength,
    Other,
}

/// Error reported by the provider, with the metadata needed to log it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderError {
    pub message: String,
    pub provider: String,
    pub kind: ProviderErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ProviderError {
    pub fn new(
        provider: impl Into<String>,
        kind: ProviderErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            provider: provider.into(),
            kind,
            status_code: None,
            error_code: None,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "{} ({status}): {}", self.provider, self.message),
            None => write!(f, "{}: {}", self.provider, self.message),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum LlmError {
    #[error("{0}")]
    Provider(ProviderError),
    #[error("request timed out: {0}")]
    RequestTimeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::RequestTimeout(_))
    }

    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            LlmError::RequestTimeout(error.to_string())
        } else {
            LlmError::Network(error.to_string())
        }
    }
}

/// HTTP status classification result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpErrorClassification {
    Provider(ProviderErrorKind),
    RequestTimeout,
}

/// Map HTTP status codes to error classification.
pub fn map_http_status(status: u16) -> Option<HttpErrorClassification> {
    use HttpErrorClassification::Provider;
    match status {
        400 | 422 => Some(Provider(ProviderErrorKind::InvalidRequest)),
        401 => Some(Provider(ProviderErrorKind::Authentication)),
        403 => Some(Provider(ProviderErrorKind::AccessDenied)),
        404 => Some(Provider(ProviderErrorKind::NotFound)),
        408 => Some(HttpErrorClassification::RequestTimeout),
        413 => Some(Provider(ProviderErrorKind::ContextLength)),
        429 => Some(Provider(ProviderErrorKind::RateLimit)),
        500 | 502 | 503 => Some(Provider(ProviderErrorKind::Server)),
        504 => Some(HttpErrorClassification::RequestTimeout),
        _ => None,
    }
}

/// Map the `status` string of a Google API error body.
pub fn map_grpc_status(code: &str) -> Option<HttpErrorClassification> {
    use HttpErrorClassification::Provider;
    match code.to_ascii_uppercase().as_str() {
        "INVALID_ARGUMENT" | "FAILED_PRECONDITION" => {
            Some(Provider(ProviderErrorKind::InvalidRequest))
        }
        "UNAUTHENTICATED" => Some(Provider(ProviderErrorKind::Authentication)),
        "PERMISSION_DENIED" => Some(Provider(ProviderErrorKind::AccessDenied)),
        "NOT_FOUND" => Some(Provider(ProviderErrorKind::NotFound)),
        "RESOURCE_EXHAUSTED" => Some(Provider(ProviderErrorKind::RateLimit)),
        "UNAVAILABLE" | "INTERNAL" => Some(Provider(ProviderErrorKind::Server)),
        "DEADLINE_EXCEEDED" => Some(HttpErrorClassification::RequestTimeout),
        _ => None,
    }
}

/// Classify error kind from message content when status codes are ambiguous.
pub fn classify_message(message: &str) -> Option<ProviderErrorKind> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("api key not valid") || lower.contains("invalid key") {
        return Some(ProviderErrorKind::Authentication);
    }
    if lower.contains("not found") || lower.contains("does not exist") {
        return Some(ProviderErrorKind::NotFound);
    }
    if lower.contains("context length") || lower.contains("too many tokens") {
        return Some(ProviderErrorKind::ContextLength);
    }
    if lower.contains("safety") || lower.contains("blocked") {
        return Some(ProviderErrorKind::ContentFilter);
    }
    None
}

/// Adapter-level timeouts for HTTP operations, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdapterTimeout {
    pub connect: f64,
    pub request: f64,
}

impl Default for AdapterTimeout {
    fn default() -> Self {
        Self {
            connect: 10.0,
            request: 120.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_http_status_classifies_common_codes() {
        assert_eq!(
            map_http_status(401),
            Some(HttpErrorClassification::Provider(
                ProviderErrorKind::Authentication
            ))
        );
        assert_eq!(
            map_http_status(429),
            Some(HttpErrorClassification::Provider(ProviderErrorKind::RateLimit))
        );
        assert_eq!(
            map_http_status(504),
            Some(HttpErrorClassification::RequestTimeout)
        );
        assert_eq!(map_http_status(499), None);
    }

    #[test]
    fn grpc_status_strings() {
        assert_eq!(
            map_grpc_status("resource_exhausted"),
            Some(HttpErrorClassification::Provider(ProviderErrorKind::RateLimit))
        );
        assert_eq!(
            map_grpc_status("DEADLINE_EXCEEDED"),
            Some(HttpErrorClassification::RequestTimeout)
        );
        assert_eq!(map_grpc_status("WHATEVER"), None);
    }

    #[test]
    fn classify_message_detects_signals() {
        assert_eq!(
            classify_message("API key not valid. Please pass a valid API key."),
            Some(ProviderErrorKind::Authentication)
        );
        assert_eq!(
            classify_message("Response was blocked due to SAFETY"),
            Some(ProviderErrorKind::ContentFilter)
        );
        assert_eq!(classify_message("Unknown"), None);
    }
}
