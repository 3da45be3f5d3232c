//! Instructor login.
//!
//! This is a placeholder lookup against a fixed directory, not a
//! security boundary. It only decides which instructor owns the
//! sessions opened from this client.

use rollcall_core::error::RollcallResult;
use rollcall_core::models::teacher::{AuthState, Teacher};
use rollcall_core::repository::AuthStateRepository;
use tracing::{info, warn};

use crate::error::AttendanceError;

#[derive(Debug, Clone)]
struct TeacherAccount {
    teacher: Teacher,
    password: String,
}

/// Known instructors.
#[derive(Debug, Clone)]
pub struct TeacherDirectory {
    accounts: Vec<TeacherAccount>,
}

impl TeacherDirectory {
    pub fn empty() -> Self {
        Self {
            accounts: Vec::new(),
        }
    }

    pub fn with_account(mut self, teacher: Teacher, password: impl Into<String>) -> Self {
        self.accounts.push(TeacherAccount {
            teacher,
            password: password.into(),
        });
        self
    }

    pub fn find(&self, email: &str, password: &str) -> Option<&Teacher> {
        self.accounts
            .iter()
            .find(|a| a.teacher.email.eq_ignore_ascii_case(email.trim()) && a.password == password)
            .map(|a| &a.teacher)
    }

    pub fn get(&self, teacher_id: &str) -> Option<&Teacher> {
        self.accounts
            .iter()
            .map(|a| &a.teacher)
            .find(|t| t.id == teacher_id)
    }
}

impl Default for TeacherDirectory {
    /// The single demo instructor.
    fn default() -> Self {
        Self::empty().with_account(
            Teacher {
                id: "1".into(),
                name: "Professor Smith".into(),
                email: "prof@example.com".into(),
            },
            "password123",
        )
    }
}

/// Login service over the persisted login flags.
pub struct LoginService<A: AuthStateRepository> {
    auth: A,
    directory: TeacherDirectory,
}

impl<A: AuthStateRepository> LoginService<A> {
    pub fn new(auth: A, directory: TeacherDirectory) -> Self {
        Self { auth, directory }
    }

    pub fn login(&self, email: &str, password: &str) -> RollcallResult<Teacher> {
        let Some(teacher) = self.directory.find(email, password).cloned() else {
            warn!("Login rejected");
            return Err(AttendanceError::InvalidCredentials.into());
        };

        self.auth.set(AuthState {
            current_teacher_id: Some(teacher.id.clone()),
        })?;
        info!(teacher_id = %teacher.id, "Instructor logged in");
        Ok(teacher)
    }

    pub fn logout(&self) -> RollcallResult<()> {
        let previous = self.auth.get()?;
        self.auth.set(AuthState::default())?;
        if let Some(teacher_id) = previous.current_teacher_id {
            info!(teacher_id = %teacher_id, "Instructor logged out");
        }
        Ok(())
    }

    /// The logged-in instructor, if any. A stale id that no longer
    /// matches the directory counts as logged out.
    pub fn current_teacher(&self) -> RollcallResult<Option<Teacher>> {
        let state = self.auth.get()?;
        Ok(state
            .current_teacher_id
            .and_then(|id| self.directory.get(&id).cloned()))
    }

    pub fn require_teacher(&self) -> RollcallResult<Teacher> {
        self.current_teacher()?
            .ok_or_else(|| AttendanceError::NotAuthenticated.into())
    }
}
