//! Instructor dashboard: login, the focused session, codes and roster.

use rollcall_attendance::RosterSummary;
use rollcall_attendance::export::{self, RosterRow};
use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::claim::AttendanceClaim;
use rollcall_core::models::session::Session;
use rollcall_core::models::teacher::Teacher;
use tracing::info;
use uuid::Uuid;

use crate::app::Services;

/// Dashboard state for one instructor.
///
/// The focused session lives here, not in the registry. Several
/// sessions may be active at once; the dashboard works on one.
pub struct InstructorController<'a> {
    services: &'a Services,
    focused: Option<Uuid>,
}

impl<'a> InstructorController<'a> {
    pub fn new(services: &'a Services) -> Self {
        Self {
            services,
            focused: None,
        }
    }

    pub fn focused_session_id(&self) -> Option<Uuid> {
        self.focused
    }

    fn focused_id(&self) -> RollcallResult<Uuid> {
        self.focused.ok_or_else(|| RollcallError::Validation {
            message: "no session selected; start one first".into(),
        })
    }

    pub fn login(&mut self, email: &str, password: &str) -> RollcallResult<Teacher> {
        self.focused = None;
        self.services.write(|s| s.login.login(email, password))
    }

    /// Logging out also drops the focused session.
    pub fn logout(&mut self) -> RollcallResult<()> {
        self.focused = None;
        self.services.write(|s| s.login.logout())
    }

    pub fn teacher(&self) -> RollcallResult<Teacher> {
        self.services.read(|s| s.login.require_teacher())
    }

    /// Focus one of the logged-in instructor's sessions, ended or not.
    pub fn focus(&mut self, session_id: Uuid) -> RollcallResult<Session> {
        let session = self.services.read(|s| {
            let teacher = s.login.require_teacher()?;
            let session = s.registry.get(session_id)?;
            if session.teacher_id != teacher.id {
                return Err(RollcallError::not_found("session", session_id));
            }
            Ok(session)
        })?;
        self.focused = Some(session.id);
        Ok(session)
    }

    /// Focus the instructor's most recently created active session.
    pub fn resume(&mut self) -> RollcallResult<Option<Session>> {
        let latest = self.services.read(|s| {
            let teacher = s.login.require_teacher()?;
            Ok(s.registry
                .list_by_teacher(&teacher.id)?
                .into_iter()
                .rev()
                .find(|session| session.active))
        })?;
        self.focused = latest.as_ref().map(|s| s.id);
        Ok(latest)
    }

    /// Open a new session owned by the logged-in instructor and focus it.
    pub fn start_session(&mut self) -> RollcallResult<Session> {
        let session = self.services.write(|s| {
            let teacher = s.login.require_teacher()?;
            s.registry.create_session(&teacher.id)
        })?;
        self.focused = Some(session.id);
        Ok(session)
    }

    pub fn focused_session(&self) -> RollcallResult<Session> {
        let id = self.focused_id()?;
        self.services.read(|s| {
            s.login.require_teacher()?;
            s.registry.get(id)
        })
    }

    pub fn issue_otp(&self) -> RollcallResult<String> {
        let id = self.focused_id()?;
        self.services.write(|s| {
            s.login.require_teacher()?;
            s.registry.issue_otp(id)
        })
    }

    /// End the focused session. It stays focused so its roster can still
    /// be read and exported.
    pub fn end_session(&self) -> RollcallResult<Session> {
        let id = self.focused_id()?;
        self.services.write(|s| {
            s.login.require_teacher()?;
            s.registry.end_session(id)?;
            s.registry.get(id)
        })
    }

    /// Whole seconds left on the focused session's code.
    pub fn countdown(&self) -> RollcallResult<i64> {
        let id = self.focused_id()?;
        self.services.read(|s| {
            s.login.require_teacher()?;
            let session = s.registry.get(id)?;
            Ok(s.registry.otp_seconds_remaining(&session))
        })
    }

    /// Instructor's own sessions in creation order.
    pub fn sessions(&self) -> RollcallResult<Vec<Session>> {
        self.services.read(|s| {
            let teacher = s.login.require_teacher()?;
            s.registry.list_by_teacher(&teacher.id)
        })
    }

    pub fn roster(&self) -> RollcallResult<Vec<AttendanceClaim>> {
        let id = self.focused_id()?;
        self.services.read(|s| {
            s.login.require_teacher()?;
            s.registry.list_by_session(&s.ledger, id)
        })
    }

    pub fn summary(&self) -> RollcallResult<RosterSummary> {
        let id = self.focused_id()?;
        self.services.read(|s| {
            s.login.require_teacher()?;
            s.ledger.summary(id)
        })
    }

    pub fn export_rows(&self) -> RollcallResult<Vec<RosterRow>> {
        let claims = self.roster()?;
        info!(
            session_id = ?self.focused,
            rows = claims.len(),
            "Exporting roster"
        );
        Ok(export::roster_rows(&claims))
    }
}
