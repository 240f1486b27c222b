use thiserror::Error;

/// Failures surfaced by the ledger, the history log and the engines on top of them.
///
/// Every variant renders to a message that can be shown to a visitor as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// The store could not apply an atomic update because of contention.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn user_not_found(id: impl ToString) -> Self {
        Self::not_found("User", id)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
