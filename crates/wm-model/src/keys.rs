//! Storage key names shared by every client component.

pub const LICENSE_KEY: &str = "license_key";
pub const USERNAME: &str = "username";
pub const GOALS: &str = "goals";
pub const TRANSACTIONS: &str = "transactions";
pub const WEALTH_WHEEL: &str = "wealth_wheel";
pub const REFLECTIONS: &str = "reflections";
pub const MOOD: &str = "mood";
pub const LANGUAGE: &str = "language";
pub const COACH_INSIGHTS: &str = "coach_insights";
pub const PREDICTIVE_INSIGHTS: &str = "predictive_insights";
pub const INVESTMENTS: &str = "investments";
/// Recent `ask chat` turns. Not part of backups.
pub const CHAT_HISTORY: &str = "chat_history";

/// Keys carried by a backup file. The license key is deliberately absent:
/// restoring data never changes activation.
pub const BACKUP_KEYS: &[&str] = &[
    USERNAME,
    GOALS,
    TRANSACTIONS,
    WEALTH_WHEEL,
    REFLECTIONS,
    MOOD,
    LANGUAGE,
    COACH_INSIGHTS,
    PREDICTIVE_INSIGHTS,
    INVESTMENTS,
];

pub fn is_backup_key(key: &str) -> bool {
    BACKUP_KEYS.contains(&key)
}
