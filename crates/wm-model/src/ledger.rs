use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wm_store::StoreAdapter;

use crate::ids::{IdGenerator, max_numeric_id};
use crate::keys;
use crate::records::{
    Goal, Importance, Investment, InvestmentKind, Language, Mood, Reflection, Transaction,
    ChatRole, ChatTurn, TransactionKind, WHEEL_MAX, WHEEL_MIN, WealthWheelData, default_reflections,
    default_wealth_wheel, parse_iso_date,
};
use crate::snapshot::FinancialSnapshot;
use crate::ModelError;

/// Most chat turns kept, matching the chat flow's history bound.
pub const CHAT_HISTORY_LIMIT: usize = 50;

/// Goal form input, validated on creation.
#[derive(Clone, Debug)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: String,
    pub importance: Importance,
}

#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub date: String,
}

#[derive(Clone, Debug)]
pub struct NewInvestment {
    pub name: String,
    pub kind: InvestmentKind,
    pub amount: f64,
    pub expected_return: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionTotals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Dashboard operations over the persisted collections.
///
/// Each collection is read, modified and written back as a whole. Nothing
/// coordinates writers in other processes: the last write wins.
#[derive(Debug)]
pub struct Ledger {
    store: StoreAdapter,
    ids: IdGenerator,
}

impl Ledger {
    pub fn new(store: StoreAdapter) -> Self {
        Self {
            store,
            ids: IdGenerator::new(),
        }
    }

    pub fn store(&self) -> &StoreAdapter {
        &self.store
    }

    pub fn username(&self) -> Option<String> {
        self.store
            .read_opt::<String>(keys::USERNAME)
            .filter(|name| !name.trim().is_empty())
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.store.read(keys::GOALS, Vec::new())
    }

    pub fn add_goal(&self, new: NewGoal) -> Result<Goal, ModelError> {
        let name = required_text("name", &new.name)?;
        non_negative("targetAmount", new.target_amount)?;
        non_negative("currentAmount", new.current_amount)?;
        iso_date("targetDate", &new.target_date)?;

        let mut goals = self.goals();
        let goal = Goal {
            id: self.next_id(goals.iter().map(|g| g.id.as_str())),
            name,
            target_amount: new.target_amount,
            current_amount: new.current_amount,
            target_date: new.target_date,
            importance: new.importance,
        };
        goals.push(goal.clone());
        self.persist(keys::GOALS, &goals)?;
        Ok(goal)
    }

    /// Returns false when no goal has `id`.
    pub fn remove_goal(&self, id: &str) -> Result<bool, ModelError> {
        self.remove_by_id(keys::GOALS, id, |g: &Goal| g.id.as_str())
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.store.read(keys::TRANSACTIONS, Vec::new())
    }

    pub fn add_transaction(&self, new: NewTransaction) -> Result<Transaction, ModelError> {
        let description = required_text("description", &new.description)?;
        non_negative("amount", new.amount)?;
        iso_date("date", &new.date)?;

        let mut transactions = self.transactions();
        let tx = Transaction {
            id: self.next_id(transactions.iter().map(|t| t.id.as_str())),
            description,
            amount: new.amount,
            kind: new.kind,
            date: new.date,
        };
        transactions.push(tx.clone());
        self.persist(keys::TRANSACTIONS, &transactions)?;
        Ok(tx)
    }

    pub fn remove_transaction(&self, id: &str) -> Result<bool, ModelError> {
        self.remove_by_id(keys::TRANSACTIONS, id, |t: &Transaction| t.id.as_str())
    }

    pub fn totals(&self) -> TransactionTotals {
        totals(&self.transactions())
    }

    /// Always the full fixed category set. Stored scores replace defaults
    /// when in range; unknown stored categories are dropped.
    pub fn wealth_wheel(&self) -> Vec<WealthWheelData> {
        let stored: Vec<WealthWheelData> = self.store.read(keys::WEALTH_WHEEL, Vec::new());
        default_wealth_wheel()
            .into_iter()
            .map(|mut category| {
                if let Some(saved) = stored.iter().find(|s| s.id == category.id) {
                    if (WHEEL_MIN..=WHEEL_MAX).contains(&saved.value) {
                        category.value = saved.value;
                    }
                }
                category
            })
            .collect()
    }

    pub fn set_wheel_value(&self, id: &str, value: f64) -> Result<WealthWheelData, ModelError> {
        if !value.is_finite() || !(WHEEL_MIN..=WHEEL_MAX).contains(&value) {
            return Err(ModelError::invalid(
                "value",
                format!("{value} is outside {WHEEL_MIN}..={WHEEL_MAX}"),
            ));
        }
        let mut wheel = self.wealth_wheel();
        let category = wheel
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ModelError::UnknownId {
                kind: "wheel category",
                id: id.to_string(),
            })?;
        category.value = value;
        let updated = category.clone();
        self.persist(keys::WEALTH_WHEEL, &wheel)?;
        Ok(updated)
    }

    pub fn wheel_average(&self) -> f64 {
        let wheel = self.wealth_wheel();
        wheel.iter().map(|c| c.value).sum::<f64>() / wheel.len() as f64
    }

    pub fn reflections(&self) -> Vec<Reflection> {
        let stored: Vec<Reflection> = self.store.read(keys::REFLECTIONS, Vec::new());
        default_reflections()
            .into_iter()
            .map(|mut reflection| {
                if let Some(saved) = stored.iter().find(|s| s.id == reflection.id) {
                    reflection.content = saved.content.clone();
                }
                reflection
            })
            .collect()
    }

    pub fn set_reflection(&self, id: &str, content: &str) -> Result<Reflection, ModelError> {
        let mut reflections = self.reflections();
        let reflection = reflections
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ModelError::UnknownId {
                kind: "reflection",
                id: id.to_string(),
            })?;
        reflection.content = content.to_string();
        let updated = reflection.clone();
        self.persist(keys::REFLECTIONS, &reflections)?;
        Ok(updated)
    }

    pub fn investments(&self) -> Vec<Investment> {
        self.store.read(keys::INVESTMENTS, Vec::new())
    }

    pub fn add_investment(&self, new: NewInvestment) -> Result<Investment, ModelError> {
        let name = required_text("name", &new.name)?;
        non_negative("amount", new.amount)?;
        if !new.expected_return.is_finite() {
            return Err(ModelError::invalid("expectedReturn", "must be a finite number"));
        }

        let mut investments = self.investments();
        let investment = Investment {
            id: self.next_id(investments.iter().map(|i| i.id.as_str())),
            name,
            kind: new.kind,
            amount: new.amount,
            expected_return: new.expected_return,
        };
        investments.push(investment.clone());
        self.persist(keys::INVESTMENTS, &investments)?;
        Ok(investment)
    }

    pub fn remove_investment(&self, id: &str) -> Result<bool, ModelError> {
        self.remove_by_id(keys::INVESTMENTS, id, |i: &Investment| i.id.as_str())
    }

    pub fn mood(&self) -> Option<Mood> {
        self.store.read_opt(keys::MOOD)
    }

    pub fn set_mood(&self, mood: Mood) -> Result<(), ModelError> {
        self.persist(keys::MOOD, &mood)
    }

    pub fn language(&self) -> Language {
        self.store.read(keys::LANGUAGE, Language::default())
    }

    pub fn set_language(&self, language: Language) -> Result<(), ModelError> {
        self.persist(keys::LANGUAGE, &language)
    }

    pub fn coach_insights(&self) -> Option<Value> {
        self.store.read_opt(keys::COACH_INSIGHTS)
    }

    pub fn predictive_insights(&self) -> Option<Value> {
        self.store.read_opt(keys::PREDICTIVE_INSIGHTS)
    }

    /// Caches generated text under one of the AI cache keys.
    pub fn cache_insight(&self, key: &'static str, value: &Value) -> Result<(), ModelError> {
        self.persist(key, value)
    }

    pub fn chat_history(&self) -> Vec<ChatTurn> {
        self.store.read(keys::CHAT_HISTORY, Vec::new())
    }

    /// Appends a question and its reply, keeping the newest
    /// [`CHAT_HISTORY_LIMIT`] turns.
    pub fn record_chat_exchange(&self, message: &str, reply: &str) -> Result<(), ModelError> {
        let mut history = self.chat_history();
        history.push(ChatTurn {
            role: ChatRole::User,
            content: message.to_string(),
        });
        history.push(ChatTurn {
            role: ChatRole::Model,
            content: reply.to_string(),
        });
        let excess = history.len().saturating_sub(CHAT_HISTORY_LIMIT);
        history.drain(..excess);
        self.persist(keys::CHAT_HISTORY, &history)
    }

    pub fn clear_chat_history(&self) -> bool {
        self.store.remove(keys::CHAT_HISTORY)
    }

    pub fn snapshot(&self) -> FinancialSnapshot {
        FinancialSnapshot {
            user_name: self.username().unwrap_or_default(),
            language: self.language(),
            mood: self.mood(),
            goals: self.goals(),
            transactions: self.transactions(),
            wealth_wheel: self.wealth_wheel(),
            reflections: self
                .reflections()
                .into_iter()
                .filter(|r| !r.content.trim().is_empty())
                .collect(),
            investments: self.investments(),
        }
    }

    fn next_id<'a>(&self, existing: impl IntoIterator<Item = &'a str>) -> String {
        self.ids.next(max_numeric_id(existing))
    }

    fn remove_by_id<T>(
        &self,
        key: &'static str,
        id: &str,
        id_of: impl Fn(&T) -> &str,
    ) -> Result<bool, ModelError>
    where
        T: Serialize + DeserializeOwned,
    {
        let items: Vec<T> = self.store.read(key, Vec::new());
        let before = items.len();
        let kept: Vec<T> = items.into_iter().filter(|item| id_of(item) != id).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.persist(key, &kept)?;
        Ok(true)
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), ModelError> {
        if self.store.write(key, value) {
            Ok(())
        } else {
            Err(ModelError::Persist(key.to_string()))
        }
    }
}

pub fn totals(transactions: &[Transaction]) -> TransactionTotals {
    let mut totals = TransactionTotals::default();
    for tx in transactions {
        match tx.kind {
            TransactionKind::Income => totals.income += tx.amount,
            TransactionKind::Expense => totals.expense += tx.amount,
        }
    }
    totals.balance = totals.income - totals.expense;
    totals
}

fn required_text(field: &'static str, value: &str) -> Result<String, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::invalid(
            field,
            format!("{value} must be a non-negative number"),
        ));
    }
    Ok(())
}

fn iso_date(field: &'static str, value: &str) -> Result<(), ModelError> {
    if parse_iso_date(value).is_some() {
        Ok(())
    } else {
        Err(ModelError::invalid(field, format!("'{value}' is not a YYYY-MM-DD date")))
    }
}
