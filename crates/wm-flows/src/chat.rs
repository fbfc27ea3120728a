//! `wealthChat`: a multi-turn conversation, optionally grounded in a snapshot.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use wm_llm::{Message, ProviderAdapter, Request, Role};
use wm_model::records::Language;
use wm_model::snapshot::FinancialSnapshot;

use crate::error::FlowError;
use crate::prompt::{describe_snapshot, system_prompt};
use crate::registry::FlowHandler;

#[derive(Debug, Deserialize)]
struct ChatTurn {
    role: Role,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatPayload {
    message: String,
    #[serde(default)]
    history: Vec<ChatTurn>,
    language: Option<Language>,
    context: Option<FinancialSnapshot>,
}

pub struct WealthChat;

#[async_trait]
impl FlowHandler for WealthChat {
    fn name(&self) -> &'static str {
        crate::WEALTH_CHAT
    }

    fn input_schema(&self) -> Value {
        crate::schema::chat()
    }

    async fn run(
        &self,
        provider: &dyn ProviderAdapter,
        payload: Value,
    ) -> Result<Value, FlowError> {
        let payload: ChatPayload =
            serde_json::from_value(payload).map_err(|source| FlowError::Decode {
                flow: crate::WEALTH_CHAT,
                source,
            })?;

        // An explicit language wins over the one carried in the context.
        let language = payload
            .language
            .or_else(|| payload.context.as_ref().map(|c| c.language))
            .unwrap_or_default();
        let mood = payload.context.as_ref().and_then(|c| c.mood);

        let mut system = system_prompt(language, mood);
        if let Some(context) = &payload.context {
            system.push_str("\n\nWhat you know about the user:\n");
            system.push_str(&describe_snapshot(context));
        }

        let mut messages: Vec<Message> = payload
            .history
            .into_iter()
            .filter(|turn| !turn.content.trim().is_empty())
            .map(|turn| Message {
                role: turn.role,
                text: turn.content,
            })
            .collect();
        messages.push(Message::user(payload.message));

        let request = Request::new(messages)
            .with_system(system)
            .with_temperature(0.8);
        let response = provider.complete(request).await?;
        Ok(json!({ "reply": response.text.trim() }))
    }
}
