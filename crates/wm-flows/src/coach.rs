//! `wealthCoach`: one round of personalised advice from a full snapshot.

use async_trait::async_trait;
use serde_json::{Value, json};
use wm_llm::{Message, ProviderAdapter, Request};
use wm_model::snapshot::FinancialSnapshot;

use crate::error::FlowError;
use crate::prompt::{describe_snapshot, system_prompt};
use crate::registry::FlowHandler;

const INSTRUCTIONS: &str = "Review this financial picture and give three to five concrete, \
prioritised next steps. Mention the weakest wealth wheel area and at least one goal by name.";

pub struct WealthCoach;

#[async_trait]
impl FlowHandler for WealthCoach {
    fn name(&self) -> &'static str {
        crate::WEALTH_COACH
    }

    fn input_schema(&self) -> Value {
        crate::schema::snapshot()
    }

    async fn run(
        &self,
        provider: &dyn ProviderAdapter,
        payload: Value,
    ) -> Result<Value, FlowError> {
        let snapshot: FinancialSnapshot =
            serde_json::from_value(payload).map_err(|source| FlowError::Decode {
                flow: crate::WEALTH_COACH,
                source,
            })?;

        let prompt = format!("{INSTRUCTIONS}\n\n{}", describe_snapshot(&snapshot));
        let request = Request::new(vec![Message::user(prompt)])
            .with_system(system_prompt(snapshot.language, snapshot.mood))
            .with_temperature(0.7);

        let response = provider.complete(request).await?;
        Ok(json!({ "advice": response.text.trim() }))
    }
}
