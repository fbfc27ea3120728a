//! `wealthmap ask coach|chat|predict`: send the local snapshot through the
//! proxy and cache what comes back.
//!
//! `ask chat` is a running conversation: recent turns are stored locally and
//! sent along as history until `--new` starts over.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::Subcommand;
use serde_json::{Value, json};
use wm_model::keys;

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;
use crate::util::guarded;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Subcommand, Debug)]
pub enum AskCommand {
    /// Personalised advice from the whole financial picture
    Coach,
    /// Ask the coach a question
    Chat {
        message: String,
        /// Forget earlier turns and start a new conversation
        #[arg(long)]
        new: bool,
    },
    /// Goal projections with commentary
    Predict,
}

struct Prepared {
    flow: &'static str,
    route: &'static str,
    cache_key: Option<&'static str>,
}

impl AskCommand {
    fn prepared(&self) -> Prepared {
        match self {
            AskCommand::Coach => Prepared {
                flow: "wealthCoach",
                route: "/coach",
                cache_key: Some(keys::COACH_INSIGHTS),
            },
            AskCommand::Chat { .. } => Prepared {
                flow: "wealthChat",
                route: "/chat",
                cache_key: None,
            },
            AskCommand::Predict => Prepared {
                flow: "predictiveInsights",
                route: "/insights",
                cache_key: Some(keys::PREDICTIVE_INSIGHTS),
            },
        }
    }
}

pub async fn cmd_ask(opts: &GlobalOpts, cmd: &AskCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    let prepared = cmd.prepared();

    let (license_key, payload) = guarded(&ws.session, prepared.route, || {
        let license_key = ws
            .session
            .license_key()
            .ok_or_else(|| anyhow!("no license key stored"))?;
        let snapshot = ws.ledger.snapshot();
        let payload = match cmd {
            AskCommand::Coach => serde_json::to_value(&snapshot)?,
            AskCommand::Chat { message, new } => {
                if *new {
                    ws.ledger.clear_chat_history();
                }
                json!({
                    "message": message,
                    "history": ws.ledger.chat_history(),
                    "language": snapshot.language,
                    "context": snapshot,
                })
            }
            AskCommand::Predict => json!({
                "goals": snapshot.goals,
                "transactions": snapshot.transactions,
                "investments": snapshot.investments,
                "language": snapshot.language,
            }),
        };
        Ok((license_key, payload))
    })?;

    let data = call_flow(&opts.proxy_url, prepared.flow, &license_key, payload).await?;

    let mut warnings = vec![];
    if let AskCommand::Chat { message, .. } = cmd {
        let reply = data["reply"].as_str().unwrap_or_default();
        if let Err(err) = ws.ledger.record_chat_exchange(message, reply) {
            tracing::warn!("saving chat history failed: {err}");
            warnings.push(format!("conversation not saved: {err}"));
        }
    }
    if let Some(key) = prepared.cache_key {
        if let Err(err) = ws.ledger.cache_insight(key, &data) {
            tracing::warn!("caching {key} failed: {err}");
            warnings.push(format!("result not cached: {err}"));
        }
    }
    print_success(opts, data, warnings)
}

async fn call_flow(proxy_url: &str, flow: &str, license_key: &str, payload: Value) -> Result<Value> {
    let url = format!("{}/api/flow", proxy_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("build http client")?;
    tracing::debug!(%url, flow, "calling proxy");
    let response = client
        .post(&url)
        .json(&json!({ "flow": flow, "payload": payload, "licenseKey": license_key }))
        .send()
        .await
        .with_context(|| format!("reach proxy at {url}"))?;

    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("decode proxy response ({status})"))?;
    if status.is_success() && body["success"] == true {
        return Ok(body["data"].clone());
    }

    let error = body["error"].as_str().unwrap_or("request failed");
    match status.as_u16() {
        429 => bail!(
            "{error}: quota resets at {} (epoch ms)",
            body["resetTime"].as_u64().unwrap_or_default()
        ),
        400 if body["details"].is_array() => {
            let details: Vec<String> = body["details"]
                .as_array()
                .into_iter()
                .flatten()
                .map(|d| {
                    format!(
                        "{}: {}",
                        d["path"].as_str().unwrap_or("/"),
                        d["message"].as_str().unwrap_or_default()
                    )
                })
                .collect();
            bail!("{error} ({status}): {}", details.join("; "))
        }
        _ => bail!("{error} ({status})"),
    }
}
