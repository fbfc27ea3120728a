//! Google Gemini adapter using the `generateContent` REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::errors::{
    AdapterTimeout, HttpErrorClassification, LlmError, ProviderError, ProviderErrorKind,
    classify_message, map_grpc_status, map_http_status,
};
use crate::provider::ProviderAdapter;
use crate::types::{Request, Response, Role, Usage};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const PROVIDER: &str = "gemini";

#[derive(Clone, Debug)]
pub struct GeminiAdapterConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: AdapterTimeout,
}

impl GeminiAdapterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: AdapterTimeout::default(),
        }
    }

    /// `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), plus optional
    /// `GEMINI_BASE_URL` and `GEMINI_MODEL`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        Some(config)
    }
}

#[derive(Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
    config: GeminiAdapterConfig,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

impl GeminiAdapter {
    pub fn new(config: GeminiAdapterConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("Gemini API key is empty".into()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&config.api_key).map_err(|error| {
                LlmError::Configuration(format!("invalid Gemini API key header: {error}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs_f64(config.timeout.connect))
            .timeout(Duration::from_secs_f64(config.timeout.request))
            .default_headers(headers)
            .build()
            .map_err(|error| LlmError::Configuration(error.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: Request) -> Result<Response, LlmError> {
        let body = build_generate_body(&request);
        tracing::debug!(model = %self.config.model, messages = request.messages.len(), "gemini generateContent");

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let raw = response.text().await.unwrap_or_default();
            return Err(build_provider_error(status, &raw));
        }

        let raw_json = response
            .json::<Value>()
            .await
            .map_err(LlmError::from_reqwest)?;

        parse_generate_response(raw_json, &self.config.model)
    }
}

pub(crate) fn build_generate_body(request: &Request) -> Value {
    let contents: Vec<Value> = request
        .messages
        .iter()
        .map(|message| {
            let role = match message.role {
                Role::User => "user",
                Role::Model => "model",
            };
            json!({ "role": role, "parts": [{ "text": message.text }] })
        })
        .collect();

    let mut body = json!({ "contents": contents });
    if let Some(system) = &request.system {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }

    let mut generation = serde_json::Map::new();
    if let Some(temperature) = request.temperature {
        generation.insert("temperature".into(), json!(temperature));
    }
    if let Some(max) = request.max_output_tokens {
        generation.insert("maxOutputTokens".into(), json!(max));
    }
    if request.json_output {
        generation.insert("responseMimeType".into(), json!("application/json"));
    }
    if !generation.is_empty() {
        body["generationConfig"] = Value::Object(generation);
    }
    body
}

pub(crate) fn parse_generate_response(raw_json: Value, model: &str) -> Result<Response, LlmError> {
    let candidate = raw_json
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first());

    let Some(candidate) = candidate else {
        // No candidates means the prompt itself was blocked.
        let reason = raw_json
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .unwrap_or("no candidates returned");
        return Err(LlmError::Provider(ProviderError::new(
            PROVIDER,
            ProviderErrorKind::ContentFilter,
            reason,
        )));
    };

    let text = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let finish_reason = candidate
        .get("finishReason")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    if text.is_empty() {
        return Err(LlmError::InvalidResponse(format!(
            "candidate has no text (finish reason {})",
            finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let usage = raw_json
        .get("usageMetadata")
        .map(|meta| {
            let count = |field: &str| meta.get(field).and_then(Value::as_u64).unwrap_or(0);
            Usage {
                input_tokens: count("promptTokenCount"),
                output_tokens: count("candidatesTokenCount"),
                total_tokens: count("totalTokenCount"),
            }
        })
        .unwrap_or_default();

    let model = raw_json
        .get("modelVersion")
        .and_then(Value::as_str)
        .unwrap_or(model)
        .to_string();

    Ok(Response {
        provider: PROVIDER.to_string(),
        model,
        text,
        finish_reason,
        usage,
    })
}

fn build_provider_error(status: u16, body_text: &str) -> LlmError {
    let raw_json = serde_json::from_str::<Value>(body_text).ok();
    let error = raw_json.as_ref().and_then(|json| json.get("error"));
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(body_text)
        .to_string();
    let status_name = error
        .and_then(|e| e.get("status"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let classification = map_http_status(status)
        .or_else(|| status_name.as_deref().and_then(map_grpc_status))
        .or_else(|| classify_message(&message).map(HttpErrorClassification::Provider));

    match classification {
        Some(HttpErrorClassification::RequestTimeout) => LlmError::RequestTimeout(message),
        Some(HttpErrorClassification::Provider(kind)) => LlmError::Provider(ProviderError {
            message,
            provider: PROVIDER.to_string(),
            kind,
            status_code: Some(status),
            error_code: status_name,
        }),
        None => LlmError::Provider(ProviderError {
            message,
            provider: PROVIDER.to_string(),
            kind: ProviderErrorKind::Other,
            status_code: Some(status),
            error_code: status_name,
        }),
    }
}
