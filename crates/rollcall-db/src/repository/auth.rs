//! In-memory implementation of [`AuthStateRepository`].

use rollcall_core::error::RollcallResult;
use rollcall_core::models::teacher::AuthState;
use rollcall_core::repository::AuthStateRepository;

use super::MemoryDb;

#[derive(Debug, Clone)]
pub struct MemoryAuthStateRepository {
    db: MemoryDb,
}

impl MemoryAuthStateRepository {
    pub fn new(db: MemoryDb) -> Self {
        Self { db }
    }
}

impl AuthStateRepository for MemoryAuthStateRepository {
    fn get(&self) -> RollcallResult<AuthState> {
        Ok(self.db.read()?.auth.clone())
    }

    fn set(&self, state: AuthState) -> RollcallResult<()> {
        self.db.write()?.auth = state;
        Ok(())
    }
}
