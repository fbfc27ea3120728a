use serde::{Deserialize, Serialize};

use crate::records::{
    Goal, Investment, Language, Mood, Reflection, Transaction, WealthWheelData,
};

/// Everything the AI-backed features send along with a request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    pub user_name: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub wealth_wheel: Vec<WealthWheelData>,
    #[serde(default)]
    pub reflections: Vec<Reflection>,
    #[serde(default)]
    pub investments: Vec<Investment>,
}
