//! Persisted record shapes. Field names follow the camelCase JSON the client
//! has always stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Stored date format for goal targets and transactions.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a stored `YYYY-MM-DD` date. Calendar-impossible days such as
/// `2026-02-31` and unpadded months are rejected.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    /// ISO date, `YYYY-MM-DD`.
    pub target_date: String,
    pub importance: Importance,
}

impl Goal {
    /// Completion percentage clamped to `[0, 100]`; 0 when the target is 0.
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        (self.current_amount / self.target_amount * 100.0).clamp(0.0, 100.0)
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: String,
}

impl Transaction {
    /// Amount with sign: income positive, expense negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

pub const WHEEL_MIN: f64 = 0.0;
pub const WHEEL_MAX: f64 = 10.0;
pub const WHEEL_DEFAULT: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WealthWheelData {
    pub id: String,
    pub label: String,
    pub value: f64,
    pub description: String,
}

const WHEEL_CATEGORIES: &[(&str, &str, &str)] = &[
    ("income", "Income", "How steady and sufficient your earnings feel"),
    ("spending", "Spending", "How intentional your day-to-day spending is"),
    ("saving", "Saving", "How consistently you set money aside"),
    ("investing", "Investing", "How well your money works for you over time"),
    ("debt", "Debt", "How in control you are of what you owe"),
    ("protection", "Protection", "Insurance, emergency fund and safety nets"),
    ("giving", "Giving", "How generosity fits into your finances"),
    ("knowledge", "Knowledge", "How confident you are about money matters"),
];

/// The fixed category set, each at the default score.
pub fn default_wealth_wheel() -> Vec<WealthWheelData> {
    WHEEL_CATEGORIES
        .iter()
        .map(|(id, label, description)| WealthWheelData {
            id: (*id).to_string(),
            label: (*label).to_string(),
            value: WHEEL_DEFAULT,
            description: (*description).to_string(),
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One stored chat message, in the shape the chat flow takes as history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: String,
    pub prompt: String,
    pub content: String,
}

const REFLECTION_PROMPTS: &[(&str, &str)] = &[
    ("wins", "What financial win are you proudest of this month?"),
    ("money_story", "What belief about money did you grow up with?"),
    ("worries", "What worries you most about your financial future?"),
    ("vision", "What would financial freedom look like for you?"),
];

pub fn default_reflections() -> Vec<Reflection> {
    REFLECTION_PROMPTS
        .iter()
        .map(|(id, prompt)| Reflection {
            id: (*id).to_string(),
            prompt: (*prompt).to_string(),
            content: String::new(),
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvestmentKind {
    Stocks,
    Bonds,
    Funds,
    RealEstate,
    Crypto,
    Cash,
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub name: String,
    pub kind: InvestmentKind,
    pub amount: f64,
    /// Expected annual return, percent.
    pub expected_return: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Neutral,
    Low,
    Stressed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

macro_rules! impl_from_str_via_serde {
    ($ty:ty, $kind:literal) => {
        impl FromStr for $ty {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                serde_json::from_value(serde_json::Value::String(s.trim().to_string())).map_err(
                    |_| ModelError::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    },
                )
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match serde_json::to_value(self) {
                    Ok(serde_json::Value::String(s)) => f.write_str(&s),
                    _ => Err(fmt::Error),
                }
            }
        }
    };
}

impl_from_str_via_serde!(Importance, "importance");
impl_from_str_via_serde!(TransactionKind, "transaction type");
impl_from_str_via_serde!(InvestmentKind, "investment kind");
impl_from_str_via_serde!(Mood, "mood");
impl_from_str_via_serde!(Language, "language");
