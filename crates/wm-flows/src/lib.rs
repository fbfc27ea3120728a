//! Named, schema-validated operations that turn a client snapshot into a
//! prompt, call the model and shape its answer.

pub mod chat;
pub mod coach;
mod error;
pub mod insights;
mod prompt;
pub mod registry;
pub mod schema;

pub use error::{FieldError, FlowError};
pub use registry::{FlowHandler, FlowRegistry, RegisteredFlow};

pub const WEALTH_COACH: &str = "wealthCoach";
pub const WEALTH_CHAT: &str = "wealthChat";
pub const PREDICTIVE_INSIGHTS: &str = "predictiveInsights";
