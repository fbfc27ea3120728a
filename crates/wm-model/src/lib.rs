//! Wealth Map records and the operations the dashboard performs on them.
//!
//! Collections are plain ordered vectors persisted as JSON arrays through
//! [`wm_store::StoreAdapter`]; lookups and deletes are linear scans by id.

pub mod backup;
pub mod csv_export;
mod error;
pub mod ids;
pub mod keys;
pub mod ledger;
pub mod records;
pub mod snapshot;

pub use backup::{Backup, RestoreReport, export_backup, import_backup};
pub use csv_export::transactions_csv;
pub use error::ModelError;
pub use ids::IdGenerator;
pub use ledger::{
    CHAT_HISTORY_LIMIT, Ledger, NewGoal, NewInvestment, NewTransaction, TransactionTotals,
};
pub use records::*;
pub use snapshot::FinancialSnapshot;
