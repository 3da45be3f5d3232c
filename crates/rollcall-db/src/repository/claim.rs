//! In-memory implementation of [`ClaimRepository`].

use rollcall_core::error::RollcallResult;
use rollcall_core::models::claim::{AttendanceClaim, CreateClaim};
use rollcall_core::repository::ClaimRepository;
use uuid::Uuid;

use super::MemoryDb;
use crate::error::DbError;

fn claim_not_found(id: Uuid) -> DbError {
    DbError::NotFound {
        entity: "attendance_claim".into(),
        id: id.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct MemoryClaimRepository {
    db: MemoryDb,
}

impl MemoryClaimRepository {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

impl ClaimRepository for MemoryClaimRepository {
    fn create(&self, input: CreateClaim) -> RollcallResult<AttendanceClaim> {
        let mut tables = self.db.write()?;
        if tables.claims.iter().any(|c| c.id == input.id) {
            return Err(DbError::AlreadyExists {
                entity: "attendance_claim".into(),
                id: input.id.to_string(),
            }
            .into());
        }

        let claim = AttendanceClaim {
            id: input.id,
            session_id: input.session_id,
            student_name: input.student_name,
            roll_number: input.roll_number,
            student_id: input.student_id,
            submitted_at: input.submitted_at,
            verified: false,
        };
        tables.claims.push(claim.clone());
        Ok(claim)
    }

    fn get_by_id(&self, id: Uuid) -> RollcallResult<AttendanceClaim> {
        let tables = self.db.read()?;
        tables
            .claims
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| claim_not_found(id).into())
    }

    fn list_by_session(&self, session_id: Uuid) -> RollcallResult<Vec<AttendanceClaim>> {
        let tables = self.db.read()?;
        Ok(tables
            .claims
            .iter()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect())
    }

    fn mark_verified(&self, id: Uuid) -> RollcallResult<AttendanceClaim> {
        let mut tables = self.db.write()?;
        let claim = tables
            .claims
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| claim_not_found(id))?;
        claim.verified = true;
        Ok(claim.clone())
    }
}
