//! Attendance ledger: claim submission and OTP verification.
//!
//! A claim is checked against whatever code the session holds at the
//! moment of verification, never against the code live when the claim
//! was filed. Reissuing a code therefore invalidates every copy of the
//! old one without touching claims already on file.

use std::sync::Arc;

use rollcall_core::clock::Clock;
use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::claim::{AttendanceClaim, CreateClaim};
use rollcall_core::repository::{ClaimRepository, SessionRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AttendanceError;

/// Details a student types into the claim form.
#[derive(Debug, Clone)]
pub struct SubmitClaim {
    pub session_id: Uuid,
    pub student_name: String,
    pub roll_number: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Success,
    /// Wrong code, expired code or no code armed. Not distinguished.
    Failure,
}

impl VerificationOutcome {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterSummary {
    pub total: usize,
    pub verified: usize,
}

fn required(field: &'static str, value: &str) -> Result<String, AttendanceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AttendanceError::MissingField { field });
    }
    Ok(value.to_string())
}

/// Attendance ledger service.
///
/// Sole writer of claims. Sessions are only ever read.
pub struct AttendanceLedger<C: ClaimRepository, S: SessionRepository> {
    claims: C,
    sessions: S,
    clock: Arc<dyn Clock>,
}

impl<C: ClaimRepository, S: SessionRepository> AttendanceLedger<C, S> {
    pub fn new(claims: C, sessions: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            claims,
            sessions,
            clock,
        }
    }

    /// File an unverified claim against a running session.
    pub fn submit_claim(&self, input: SubmitClaim) -> RollcallResult<AttendanceClaim> {
        // 1. Check the session now, not whatever the caller saw earlier.
        let session = self.sessions.get_by_id(input.session_id)?;
        if !session.active {
            return Err(AttendanceError::SessionEnded(session.id).into());
        }

        // 2. Presence only; roll number and student id are free text.
        let student_name = required("name", &input.student_name)?;
        let roll_number = required("roll number", &input.roll_number)?;
        let student_id = required("student id", &input.student_id)?;

        // 3. Record it.
        let claim = self.claims.create(CreateClaim {
            id: Uuid::new_v4(),
            session_id: session.id,
            student_name,
            roll_number,
            student_id,
            submitted_at: self.clock.now(),
        })?;

        info!(claim_id = %claim.id, session_id = %claim.session_id, "Claim submitted");
        Ok(claim)
    }

    /// Check `supplied_code` against the session's live code and mark the
    /// claim verified on a match.
    ///
    /// An unknown claim is a plain `Failure`. An ended session is
    /// `InactiveSession`.
    pub fn verify(&self, claim_id: Uuid, supplied_code: &str) -> RollcallResult<VerificationOutcome> {
        // 1. Resolve the claim.
        let claim = match self.claims.get_by_id(claim_id) {
            Ok(claim) => claim,
            Err(RollcallError::NotFound { .. }) => {
                warn!(claim_id = %claim_id, "Verification for unknown claim");
                return Ok(VerificationOutcome::Failure);
            }
            Err(e) => return Err(e),
        };

        // 2. Resolve its session.
        let session = match self.sessions.get_by_id(claim.session_id) {
            Ok(session) => session,
            Err(RollcallError::NotFound { .. }) => {
                warn!(claim_id = %claim_id, session_id = %claim.session_id, "Claim references unknown session");
                return Ok(VerificationOutcome::Failure);
            }
            Err(e) => return Err(e),
        };
        if !session.active {
            return Err(AttendanceError::SessionEnded(session.id).into());
        }

        // 3-4. Exact match against a code that has not yet expired.
        let now = self.clock.now();
        let accepted = session
            .otp
            .as_ref()
            .is_some_and(|otp| otp.code == supplied_code && otp.is_live_at(now));

        if !accepted {
            info!(claim_id = %claim_id, session_id = %session.id, "Verification rejected");
            return Ok(VerificationOutcome::Failure);
        }

        // 5. One-way transition.
        if !claim.verified {
            self.claims.mark_verified(claim_id)?;
        }
        info!(claim_id = %claim_id, session_id = %session.id, "Claim verified");
        Ok(VerificationOutcome::Success)
    }

    pub fn get_claim(&self, claim_id: Uuid) -> RollcallResult<AttendanceClaim> {
        self.claims.get_by_id(claim_id)
    }

    /// Claims for `session_id` in submission order.
    pub fn list_by_session(&self, session_id: Uuid) -> RollcallResult<Vec<AttendanceClaim>> {
        self.claims.list_by_session(session_id)
    }

    pub fn summary(&self, session_id: Uuid) -> RollcallResult<RosterSummary> {
        let claims = self.claims.list_by_session(session_id)?;
        Ok(RosterSummary {
            total: claims.len(),
            verified: claims.iter().filter(|c| c.verified).count(),
        })
    }
}
