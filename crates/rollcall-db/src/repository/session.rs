//! In-memory implementation of [`SessionRepository`].

use rollcall_core::error::RollcallResult;
use rollcall_core::models::session::{ActiveOtp, CreateSession, Session};
use rollcall_core::repository::SessionRepository;
use uuid::Uuid;

use super::MemoryDb;
use crate::error::DbError;

fn session_not_found(id: Uuid) -> DbError {
    DbError::NotFound {
        entity: "session".into(),
        id: id.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct MemorySessionRepository {
    db: MemoryDb,
}

impl MemorySessionRepository {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

impl SessionRepository for MemorySessionRepository {
    fn create(&self, input: CreateSession) -> RollcallResult<Session> {
        let mut tables = self.db.write()?;
        if tables.sessions.iter().any(|s| s.id == input.id) {
            return Err(DbError::AlreadyExists {
                entity: "session".into(),
                id: input.id.to_string(),
            }
            .into());
        }

        let session = Session {
            id: input.id,
            teacher_id: input.teacher_id,
            created_at: input.created_at,
            join_link: input.join_link,
            otp: None,
            active: true,
        };
        tables.sessions.push(session.clone());
        Ok(session)
    }

    fn get_by_id(&self, id: Uuid) -> RollcallResult<Session> {
        let tables = self.db.read()?;
        tables
            .sessions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| session_not_found(id).into())
    }

    fn list(&self) -> RollcallResult<Vec<Session>> {
        Ok(self.db.read()?.sessions.clone())
    }

    fn set_otp(&self, id: Uuid, otp: ActiveOtp) -> RollcallResult<Session> {
        let mut tables = self.db.write()?;
        let session = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| session_not_found(id))?;
        if !session.active {
            return Err(DbError::SessionEnded { id: id.to_string() }.into());
        }
        session.otp = Some(otp);
        Ok(session.clone())
    }

    fn deactivate(&self, id: Uuid) -> RollcallResult<bool> {
        let mut tables = self.db.write()?;
        let session = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| session_not_found(id))?;
        let was_active = session.active;
        session.active = false;
        Ok(was_active)
    }
}
