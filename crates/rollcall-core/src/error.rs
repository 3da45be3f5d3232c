//! Error types for the rollcall system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollcallError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    #[error("Session {id} has ended")]
    InactiveSession { id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Wrong or expired code. Deliberately not split further.
    #[error("Incorrect or expired code")]
    VerificationFailed,

    #[error("Too many attempts (limit {max_attempts})")]
    TooManyAttempts { max_attempts: u32 },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// Persistence failure. Callers must surface this, never swallow it.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RollcallError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether the user can retry after seeing this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::TooManyAttempts { .. } | Self::Storage(_) | Self::Internal(_)
        )
    }
}

pub type RollcallResult<T> = Result<T, RollcallError>;
