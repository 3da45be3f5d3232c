//! In-memory repository implementations.
//!
//! Every repository handle wraps a clone of one [`MemoryDb`], so a write
//! through one handle is visible to the next read through any other.

mod auth;
mod claim;
mod session;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rollcall_core::models::claim::AttendanceClaim;
use rollcall_core::models::session::Session;
use rollcall_core::models::teacher::AuthState;

pub use auth::MemoryAuthStateRepository;
pub use claim::MemoryClaimRepository;
pub use session::MemorySessionRepository;

use crate::error::DbError;
use crate::schema::{SCHEMA_VERSION, Snapshot};

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) sessions: Vec<Session>,
    pub(crate) claims: Vec<AttendanceClaim>,
    pub(crate) auth: AuthState,
}

/// Shared in-memory backing store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                sessions: snapshot.sessions,
                claims: snapshot.claims,
                auth: snapshot.auth,
            })),
        }
    }

    pub fn to_snapshot(&self, storage_key: &str) -> Result<Snapshot, DbError> {
        let tables = self.read()?;
        Ok(Snapshot {
            schema_version: SCHEMA_VERSION,
            storage_key: storage_key.to_string(),
            sessions: tables.sessions.clone(),
            claims: tables.claims.clone(),
            auth: tables.auth.clone(),
        })
    }

    /// Swap the whole contents for `snapshot`. Every repository handle
    /// sees the new state on its next call.
    pub fn replace(&self, snapshot: Snapshot) -> Result<(), DbError> {
        let mut tables = self.write()?;
        *tables = Tables {
            sessions: snapshot.sessions,
            claims: snapshot.claims,
            auth: snapshot.auth,
        };
        Ok(())
    }

    pub fn sessions(&self) -> MemorySessionRepository {
        MemorySessionRepository::new(self.clone())
    }

    pub fn claims(&self) -> MemoryClaimRepository {
        MemoryClaimRepository::new(self.clone())
    }

    pub fn auth_state(&self) -> MemoryAuthStateRepository {
        MemoryAuthStateRepository::new(self.clone())
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DbError> {
        self.tables.read().map_err(|_| DbError::Poisoned)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DbError> {
        self.tables.write().map_err(|_| DbError::Poisoned)
    }
}
