//! `predictiveInsights`: goal projections computed from the ledger, with the
//! model asked only for commentary on the numbers.
//!
//! Monthly net is the average of `income - expense` over the calendar months
//! that have at least one transaction. Each goal is projected against the
//! whole monthly net on its own; goals do not compete for savings.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use wm_llm::{Message, ProviderAdapter, Request};
use wm_model::records::{Goal, Investment, Language, Transaction, parse_iso_date};

use crate::error::FlowError;
use crate::prompt::system_prompt;
use crate::registry::FlowHandler;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightsPayload {
    goals: Vec<Goal>,
    transactions: Vec<Transaction>,
    #[serde(default)]
    investments: Vec<Investment>,
    #[serde(default)]
    language: Language,
    as_of: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProjection {
    pub goal_id: String,
    pub goal_name: String,
    /// `None` when the monthly net is not positive and the goal is unmet.
    pub months_to_goal: Option<u32>,
    pub on_track: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projections {
    pub monthly_net: f64,
    pub projections: Vec<GoalProjection>,
    /// Sum of every investment grown for one year at its expected return.
    pub investments_next_year: f64,
}

/// Calendar month as `year * 12 + (month - 1)`.
type MonthIndex = i64;

fn month_of(date: NaiveDate) -> MonthIndex {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Month of a stored `YYYY-MM-DD` date; `None` for dates not on the calendar.
fn month_index(date: &str) -> Option<MonthIndex> {
    parse_iso_date(date).map(month_of)
}

/// Current UTC month.
fn current_month() -> MonthIndex {
    month_of(Utc::now().date_naive())
}

pub fn monthly_net(transactions: &[Transaction]) -> f64 {
    let mut by_month: BTreeMap<MonthIndex, f64> = BTreeMap::new();
    for tx in transactions {
        if let Some(month) = month_index(&tx.date) {
            *by_month.entry(month).or_default() += tx.signed_amount();
        }
    }
    if by_month.is_empty() {
        return 0.0;
    }
    by_month.values().sum::<f64>() / by_month.len() as f64
}

pub fn project(
    goals: &[Goal],
    transactions: &[Transaction],
    investments: &[Investment],
    as_of: MonthIndex,
) -> Projections {
    let net = monthly_net(transactions);
    let projections = goals
        .iter()
        .map(|goal| {
            let remaining = goal.remaining();
            let months_to_goal = if remaining <= 0.0 {
                Some(0)
            } else if net > 0.0 {
                Some((remaining / net).ceil().min(f64::from(u32::MAX)) as u32)
            } else {
                None
            };
            let months_left = month_index(&goal.target_date).map(|target| target - as_of);
            let on_track = match (months_to_goal, months_left) {
                (Some(0), _) => true,
                (Some(needed), Some(left)) => i64::from(needed) <= left,
                _ => false,
            };
            GoalProjection {
                goal_id: goal.id.clone(),
                goal_name: goal.name.clone(),
                months_to_goal,
                on_track,
            }
        })
        .collect();
    let investments_next_year = investments
        .iter()
        .map(|inv| inv.amount * (1.0 + inv.expected_return / 100.0))
        .sum();
    Projections {
        monthly_net: net,
        projections,
        investments_next_year,
    }
}

fn describe(projections: &Projections) -> String {
    let mut lines = vec![format!(
        "Average monthly net cash flow: {:.2}.",
        projections.monthly_net
    )];
    for p in &projections.projections {
        let eta = match p.months_to_goal {
            Some(0) => "already reached".to_string(),
            Some(months) => format!("about {months} months away"),
            None => "not reachable at the current cash flow".to_string(),
        };
        let track = if p.on_track { "on track" } else { "behind" };
        lines.push(format!("- {}: {eta}, {track} for its target date.", p.goal_name));
    }
    if projections.investments_next_year > 0.0 {
        lines.push(format!(
            "Investments projected one year out: {:.2}.",
            projections.investments_next_year
        ));
    }
    lines.join("\n")
}

pub struct PredictiveInsights;

#[async_trait]
impl FlowHandler for PredictiveInsights {
    fn name(&self) -> &'static str {
        crate::PREDICTIVE_INSIGHTS
    }

    fn input_schema(&self) -> Value {
        crate::schema::insights()
    }

    async fn run(
        &self,
        provider: &dyn ProviderAdapter,
        payload: Value,
    ) -> Result<Value, FlowError> {
        let payload: InsightsPayload =
            serde_json::from_value(payload).map_err(|source| FlowError::Decode {
                flow: crate::PREDICTIVE_INSIGHTS,
                source,
            })?;
        let as_of = payload
            .as_of
            .as_deref()
            .and_then(month_index)
            .unwrap_or_else(current_month);
        let projections = project(
            &payload.goals,
            &payload.transactions,
            &payload.investments,
            as_of,
        );

        let prompt = format!(
            "These projections were computed from the user's own records:\n{}\n\n\
             In one short paragraph, explain what they mean and the single most useful \
             change the user could make. Do not recompute the numbers.",
            describe(&projections)
        );
        let request = Request::new(vec![Message::user(prompt)])
            .with_system(system_prompt(payload.language, None))
            .with_temperature(0.5);
        let response = provider.complete(request).await?;

        Ok(json!({
            "commentary": response.text.trim(),
            "monthlyNet": projections.monthly_net,
            "projections": projections.projections,
            "investmentsNextYear": projections.investments_next_year,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_model::records::{Importance, InvestmentKind, TransactionKind};

    fn tx(amount: f64, kind: TransactionKind, date: &str) -> Transaction {
        Transaction {
            id: date.into(),
            description: "x".into(),
            amount,
            kind,
            date: date.into(),
        }
    }

    fn goal(id: &str, target: f64, current: f64, date: &str) -> Goal {
        Goal {
            id: id.into(),
            name: format!("goal {id}"),
            target_amount: target,
            current_amount: current,
            target_date: date.into(),
            importance: Importance::Medium,
        }
    }

    #[test]
    fn monthly_net_averages_over_active_months() {
        let txs = vec![
            tx(3000.0, TransactionKind::Income, "2026-01-05"),
            tx(2000.0, TransactionKind::Expense, "2026-01-20"),
            tx(3000.0, TransactionKind::Income, "2026-03-05"),
            tx(2600.0, TransactionKind::Expense, "2026-03-09"),
        ];
        assert_eq!(monthly_net(&txs), 700.0);
        assert_eq!(monthly_net(&[]), 0.0);
    }

    #[test]
    fn goals_are_projected_against_their_target_month() {
        let txs = vec![
            tx(1500.0, TransactionKind::Income, "2026-01-01"),
            tx(1000.0, TransactionKind::Expense, "2026-01-02"),
        ];
        let goals = vec![
            goal("a", 3000.0, 500.0, "2026-12-31"),
            goal("b", 3000.0, 500.0, "2026-03-01"),
            goal("c", 100.0, 150.0, "2020-01-01"),
        ];
        let as_of = month_index("2026-01-15").unwrap();
        let result = project(&goals, &txs, &[], as_of);
        assert_eq!(result.monthly_net, 500.0);
        assert_eq!(result.projections[0].months_to_goal, Some(5));
        assert!(result.projections[0].on_track);
        assert_eq!(result.projections[1].months_to_goal, Some(5));
        assert!(!result.projections[1].on_track);
        assert_eq!(result.projections[2].months_to_goal, Some(0));
        assert!(result.projections[2].on_track);
    }

    #[test]
    fn negative_cash_flow_leaves_goal_unreachable() {
        let txs = vec![tx(200.0, TransactionKind::Expense, "2026-02-01")];
        let result = project(&[goal("a", 1000.0, 0.0, "2030-01-01")], &txs, &[], 0);
        assert_eq!(result.projections[0].months_to_goal, None);
        assert!(!result.projections[0].on_track);
    }

    #[test]
    fn investments_grow_by_expected_return() {
        let investments = vec![Investment {
            id: "1".into(),
            name: "Index fund".into(),
            kind: InvestmentKind::Funds,
            amount: 1000.0,
            expected_return: 7.0,
        }];
        let result = project(&[], &[], &investments, 0);
        assert!((result.investments_next_year - 1070.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_dates_are_ignored() {
        assert_eq!(month_index("2026-13-01"), None);
        assert_eq!(month_index("20260101"), None);
        assert_eq!(month_index("2026-02-30"), None);
        assert_eq!(month_index("2025-02-29"), None);
        assert_eq!(month_index("2024-02-29"), Some(2024 * 12 + 1));
    }

    #[test]
    fn transactions_on_impossible_days_do_not_count_toward_net() {
        let net = monthly_net(&[
            tx(300.0, TransactionKind::Income, "2026-01-10"),
            tx(900.0, TransactionKind::Income, "2026-02-31"),
        ]);
        assert!((net - 300.0).abs() < 1e-9);
    }

    #[test]
    fn current_month_is_plausible() {
        assert!(current_month() >= 2024 * 12);
    }
}
