//! Attendance error types.

use rollcall_core::error::RollcallError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("code must be exactly 6 digits")]
    MalformedCode,

    #[error("not a join link: {0}")]
    InvalidJoinLink(String),

    #[error("session {0} has ended")]
    SessionEnded(Uuid),

    #[error("incorrect or expired code")]
    VerificationFailed,

    #[error("maximum of {max_attempts} attempts reached")]
    TooManyAttempts { max_attempts: u32 },

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("no instructor is logged in")]
    NotAuthenticated,

    #[error("code source unavailable")]
    CodeSourcePoisoned,
}

impl From<AttendanceError> for RollcallError {
    fn from(err: AttendanceError) -> Self {
        match err {
            AttendanceError::MissingField { .. } | AttendanceError::MalformedCode => {
                RollcallError::Validation {
                    message: err.to_string(),
                }
            }
            AttendanceError::InvalidJoinLink(link) => RollcallError::NotFound {
                entity: "session".into(),
                id: link,
            },
            AttendanceError::SessionEnded(id) => RollcallError::InactiveSession { id: id.to_string() },
            AttendanceError::VerificationFailed => RollcallError::VerificationFailed,
            AttendanceError::TooManyAttempts { max_attempts } => {
                RollcallError::TooManyAttempts { max_attempts }
            }
            AttendanceError::InvalidCredentials | AttendanceError::NotAuthenticated => {
                RollcallError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AttendanceError::CodeSourcePoisoned => RollcallError::Internal(err.to_string()),
        }
    }
}
