//! Session registry: opening sessions, arming one-time codes and
//! ending sessions.
//!
//! The registry is the only writer of a session's OTP fields and active
//! flag. It holds no notion of a "current" session; which session an
//! instructor is looking at is controller state.

use std::sync::{Arc, Mutex};

use rollcall_core::clock::Clock;
use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::claim::AttendanceClaim;
use rollcall_core::models::session::{CreateSession, Session};
use rollcall_core::repository::{ClaimRepository, SessionRepository};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AttendanceConfig;
use crate::error::AttendanceError;
use crate::join;
use crate::ledger::AttendanceLedger;
use crate::otp::{self, CodeSource, RandomCodes};

/// Session registry service.
///
/// Generic over the repository so it has no dependency on the storage
/// crate.
pub struct SessionRegistry<S: SessionRepository> {
    sessions: S,
    clock: Arc<dyn Clock>,
    codes: Mutex<Box<dyn CodeSource>>,
    config: AttendanceConfig,
}

impl<S: SessionRepository> SessionRegistry<S> {
    pub fn new(sessions: S, clock: Arc<dyn Clock>, config: AttendanceConfig) -> Self {
        Self {
            sessions,
            clock,
            codes: Mutex::new(Box::new(RandomCodes::from_os_rng())),
            config,
        }
    }

    /// Replace the random source codes are drawn from.
    pub fn with_code_source(mut self, source: impl CodeSource + 'static) -> Self {
        self.codes = Mutex::new(Box::new(source));
        self
    }

    pub fn config(&self) -> &AttendanceConfig {
        &self.config
    }

    /// Open a new session owned by `teacher_id`, active and without a
    /// code.
    pub fn create_session(&self, teacher_id: &str) -> RollcallResult<Session> {
        let teacher_id = teacher_id.trim();
        if teacher_id.is_empty() {
            return Err(AttendanceError::MissingField { field: "teacher id" }.into());
        }

        let id = Uuid::new_v4();
        let session = self.sessions.create(CreateSession {
            id,
            teacher_id: teacher_id.to_string(),
            created_at: self.clock.now(),
            join_link: join::build_join_link(&self.config.join_base_url, id),
        })?;

        info!(session_id = %session.id, teacher_id = %session.teacher_id, "Session created");
        Ok(session)
    }

    /// Arm a fresh code on `session_id` and return it.
    ///
    /// The previous code, if any, stops matching the moment this
    /// returns.
    pub fn issue_otp(&self, session_id: Uuid) -> RollcallResult<String> {
        // 1. Mint the code.
        let issued = {
            let mut codes = self
                .codes
                .lock()
                .map_err(|_| AttendanceError::CodeSourcePoisoned)?;
            otp::generate(&mut **codes, self.clock.now(), self.config.otp_validity())
        };

        // 2. Overwrite code, issue time and expiry in one write. The
        // repository refuses ended and unknown sessions under that write.
        let updated = self.sessions.set_otp(session_id, issued)?;
        let code = updated
            .otp_code()
            .map(str::to_owned)
            .ok_or_else(|| RollcallError::Internal("OTP missing after write".into()))?;

        info!(
            session_id = %session_id,
            expires_at = ?updated.otp_expires_at(),
            "OTP issued"
        );
        Ok(code)
    }

    /// Close `session_id` for good. Ending an ended session is a no-op.
    pub fn end_session(&self, session_id: Uuid) -> RollcallResult<()> {
        if self.sessions.deactivate(session_id)? {
            info!(session_id = %session_id, "Session ended");
        } else {
            debug!(session_id = %session_id, "Session already ended");
        }
        Ok(())
    }

    /// Lookup for the student flow: only running sessions are returned.
    pub fn find_active_by_id(&self, session_id: Uuid) -> RollcallResult<Option<Session>> {
        match self.sessions.get_by_id(session_id) {
            Ok(session) if session.active => Ok(Some(session)),
            Ok(_) | Err(RollcallError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolve a join link to its running session.
    pub fn find_active_by_link(&self, link: &str) -> RollcallResult<Option<Session>> {
        let session_id = join::extract_session_id(link)?;
        self.find_active_by_id(session_id)
    }

    pub fn get(&self, session_id: Uuid) -> RollcallResult<Session> {
        self.sessions.get_by_id(session_id)
    }

    /// Every session, ended ones included, in creation order.
    pub fn list_sessions(&self) -> RollcallResult<Vec<Session>> {
        self.sessions.list()
    }

    pub fn list_by_teacher(&self, teacher_id: &str) -> RollcallResult<Vec<Session>> {
        let mut sessions = self.sessions.list()?;
        sessions.retain(|s| s.teacher_id == teacher_id);
        Ok(sessions)
    }

    /// The earliest-created session that is still running.
    pub fn first_active(&self) -> RollcallResult<Option<Session>> {
        Ok(self.sessions.list()?.into_iter().find(|s| s.active))
    }

    /// Roster read path for instructors: fails with `NotFound` for an
    /// unknown session instead of returning an empty list.
    pub fn list_by_session<C, L>(
        &self,
        ledger: &AttendanceLedger<C, L>,
        session_id: Uuid,
    ) -> RollcallResult<Vec<AttendanceClaim>>
    where
        C: ClaimRepository,
        L: SessionRepository,
    {
        self.sessions.get_by_id(session_id)?;
        ledger.list_by_session(session_id)
    }

    /// Seconds left on the session's code for the countdown display.
    pub fn otp_seconds_remaining(&self, session: &Session) -> i64 {
        otp::seconds_remaining(session.otp.as_ref(), self.clock.now())
    }
}
