use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("unknown {kind} '{id}'")]
    UnknownId { kind: &'static str, id: String },
    #[error("storage write for '{0}' failed")]
    Persist(String),
    #[error("backup file is not a JSON object: {0}")]
    BackupFormat(#[source] serde_json::Error),
    #[error("csv export failed: {0}")]
    Csv(String),
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl ModelError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ModelError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
