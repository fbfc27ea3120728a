use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use wm_flows::FieldError;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("missing or invalid license key")]
    Unauthorized,
    #[error("rate limit exceeded")]
    RateLimited { remaining: u32, reset_time_ms: u64 },
    #[error("unknown flow '{0}'")]
    UnknownFlow(String),
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error("payload failed validation")]
    InvalidPayload(Vec<FieldError>),
    #[error("AI provider is not configured")]
    MissingSecret,
    #[error("AI provider did not answer in time")]
    UpstreamTimeout,
    /// Detail is logged when the error is created, never sent to the client.
    #[error("AI request failed")]
    Upstream(String),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::Unauthorized => StatusCode::UNAUTHORIZED,
            GateError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::UnknownFlow(_) | GateError::BadRequest(_) | GateError::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            GateError::MissingSecret | GateError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GateError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GateError::Unauthorized => "unauthorized",
            GateError::RateLimited { .. } => "rate_limited",
            GateError::UnknownFlow(_) => "unknown_flow",
            GateError::BadRequest(_) => "bad_request",
            GateError::InvalidPayload(_) => "invalid_payload",
            GateError::MissingSecret => "missing_secret",
            GateError::UpstreamTimeout => "upstream_timeout",
            GateError::Upstream(_) => "upstream_error",
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        });
        match &self {
            GateError::RateLimited {
                remaining,
                reset_time_ms,
            } => {
                body["remainingRequests"] = json!(remaining);
                body["resetTime"] = json!(reset_time_ms);
            }
            GateError::InvalidPayload(details) => {
                body["details"] = json!(details);
            }
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}
