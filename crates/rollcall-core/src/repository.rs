//! Repository trait definitions for data access abstraction.
//!
//! All operations are synchronous and apply atomically in call order.
//! Implementations sharing one backing store must make every committed
//! write visible to the next read through any handle.

use uuid::Uuid;

use crate::error::RollcallResult;
use crate::models::{
    claim::{AttendanceClaim, CreateClaim},
    session::{ActiveOtp, CreateSession, Session},
    teacher::AuthState,
};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> RollcallResult<Session>;
    fn get_by_id(&self, id: Uuid) -> RollcallResult<Session>;
    /// All sessions in creation order, ended ones included.
    fn list(&self) -> RollcallResult<Vec<Session>>;
    /// Overwrite the armed code, replacing any previous one. Fails with
    /// `InactiveSession` once the session has ended, checked under the
    /// same write.
    fn set_otp(&self, id: Uuid, otp: ActiveOtp) -> RollcallResult<Session>;
    /// Clear the active flag. Returns `false` if it was already clear.
    fn deactivate(&self, id: Uuid) -> RollcallResult<bool>;
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

pub trait ClaimRepository: Send + Sync {
    fn create(&self, input: CreateClaim) -> RollcallResult<AttendanceClaim>;
    fn get_by_id(&self, id: Uuid) -> RollcallResult<AttendanceClaim>;
    /// Claims for one session in submission order.
    fn list_by_session(&self, session_id: Uuid) -> RollcallResult<Vec<AttendanceClaim>>;
    fn mark_verified(&self, id: Uuid) -> RollcallResult<AttendanceClaim>;
}

// ---------------------------------------------------------------------------
// Login flags
// ---------------------------------------------------------------------------

pub trait AuthStateRepository: Send + Sync {
    fn get(&self) -> RollcallResult<AuthState>;
    fn set(&self, state: AuthState) -> RollcallResult<()>;
}
