//! Storage-specific error types and conversions.

use rollcall_core::error::RollcallError;

/// Storage-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity} with id {id}")]
    AlreadyExists { entity: String, id: String },

    #[error("Session {id} has ended")]
    SessionEnded { id: String },

    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<DbError> for RollcallError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RollcallError::NotFound { entity, id },
            DbError::AlreadyExists { entity, id } => RollcallError::AlreadyExists { entity, id },
            DbError::SessionEnded { id } => RollcallError::InactiveSession { id },
            DbError::Poisoned => RollcallError::Internal(err.to_string()),
            other => RollcallError::Storage(other.to_string()),
        }
    }
}
