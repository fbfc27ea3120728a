use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonschema::{JSONSchema, paths::JSONPointer};
use serde_json::Value;
use wm_llm::ProviderAdapter;

use crate::error::{FieldError, FlowError};

/// A single named operation exposed through the proxy.
#[async_trait]
pub trait FlowHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// JSON schema every payload must satisfy before the model is called.
    fn input_schema(&self) -> Value;

    /// Runs against an already validated payload.
    async fn run(&self, provider: &dyn ProviderAdapter, payload: Value)
    -> Result<Value, FlowError>;
}

pub struct RegisteredFlow {
    handler: Arc<dyn FlowHandler>,
    schema: JSONSchema,
}

impl std::fmt::Debug for RegisteredFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredFlow")
            .field("name", &self.handler.name())
            .finish()
    }
}

impl RegisteredFlow {
    pub fn compile(handler: Arc<dyn FlowHandler>) -> Result<Self, FlowError> {
        let flow = handler.name();
        let schema_value = handler.input_schema();
        let schema = JSONSchema::options()
            .compile(&schema_value)
            .map_err(|err| FlowError::Schema {
                flow,
                message: err.to_string(),
            })?;
        Ok(Self { handler, schema })
    }

    pub fn name(&self) -> &'static str {
        self.handler.name()
    }

    /// Collects every violation instead of stopping at the first.
    pub fn validate(&self, payload: &Value) -> Result<(), Vec<FieldError>> {
        match self.schema.validate(payload) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .map(|err| FieldError {
                    path: format_pointer(&err.instance_path),
                    message: err.to_string(),
                })
                .collect()),
        }
    }

    pub async fn run(
        &self,
        provider: &dyn ProviderAdapter,
        payload: Value,
    ) -> Result<Value, FlowError> {
        tracing::debug!(flow = self.name(), provider = provider.name(), "running flow");
        self.handler.run(provider, payload).await
    }
}

fn format_pointer(pointer: &JSONPointer) -> String {
    let text = pointer.to_string();
    if text.is_empty() { "/".into() } else { text }
}

/// Closed set of flows the proxy will dispatch to.
#[derive(Debug, Default)]
pub struct FlowRegistry {
    flows: BTreeMap<&'static str, RegisteredFlow>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The coach, chat and predictive insight flows.
    pub fn builtin() -> Result<Self, FlowError> {
        let mut registry = Self::new();
        registry.register(Arc::new(crate::coach::WealthCoach))?;
        registry.register(Arc::new(crate::chat::WealthChat))?;
        registry.register(Arc::new(crate::insights::PredictiveInsights))?;
        Ok(registry)
    }

    pub fn register(&mut self, handler: Arc<dyn FlowHandler>) -> Result<(), FlowError> {
        let flow = RegisteredFlow::compile(handler)?;
        self.flows.insert(flow.name(), flow);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredFlow> {
        self.flows.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.flows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
