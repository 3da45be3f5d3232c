//! Service wiring over one in-memory store and, optionally, its
//! snapshot file.

use std::sync::Arc;

use rollcall_attendance::{
    AttendanceConfig, AttendanceLedger, LoginService, SessionRegistry, TeacherDirectory,
};
use rollcall_core::clock::Clock;
use rollcall_core::error::RollcallResult;
use rollcall_db::repository::{
    MemoryAuthStateRepository, MemoryClaimRepository, MemorySessionRepository,
};
use rollcall_db::{DbError, MemoryDb, SnapshotStore, StoreConfig};

pub type Registry = SessionRegistry<MemorySessionRepository>;
pub type Ledger = AttendanceLedger<MemoryClaimRepository, MemorySessionRepository>;
pub type Login = LoginService<MemoryAuthStateRepository>;

struct Backing {
    store: SnapshotStore,
    db: MemoryDb,
}

/// The three services, all sharing one store and one clock.
///
/// When opened from a snapshot file, work goes through [`read`](Self::read)
/// and [`write`](Self::write) so that other processes sharing the file
/// are seen and never overwritten. Neither may be called from inside the
/// other's closure.
pub struct Services {
    pub registry: Registry,
    pub ledger: Ledger,
    pub login: Login,
    backing: Option<Backing>,
}

impl Services {
    /// Services over `db` alone. Nothing reaches disk.
    pub fn new(db: &MemoryDb, clock: Arc<dyn Clock>, config: AttendanceConfig) -> Self {
        Self {
            registry: SessionRegistry::new(db.sessions(), clock.clone(), config),
            ledger: AttendanceLedger::new(db.claims(), db.sessions(), clock),
            login: LoginService::new(db.auth_state(), TeacherDirectory::default()),
            backing: None,
        }
    }

    /// Services backed by the snapshot file named in `store_config`.
    pub fn open(
        store_config: StoreConfig,
        config: AttendanceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DbError> {
        let store = SnapshotStore::new(store_config);
        let db = store.open()?;
        let mut services = Self::new(&db, clock, config);
        services.backing = Some(Backing { store, db });
        Ok(services)
    }

    pub fn config(&self) -> &AttendanceConfig {
        self.registry.config()
    }

    /// Run `f` against the latest committed state.
    pub fn read<T>(&self, f: impl FnOnce(&Self) -> RollcallResult<T>) -> RollcallResult<T> {
        if let Some(backing) = &self.backing {
            backing.store.refresh(&backing.db)?;
        }
        f(self)
    }

    /// Run `f` against the latest committed state and commit what it
    /// changed before any other writer starts. Nothing is committed if
    /// `f` fails.
    pub fn write<T>(&self, f: impl FnOnce(&Self) -> RollcallResult<T>) -> RollcallResult<T> {
        match &self.backing {
            Some(backing) => backing.store.transaction(&backing.db, || f(self)),
            None => f(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rollcall_attendance::{SubmitClaim, VerificationOutcome};
    use rollcall_core::clock::{ManualClock, SystemClock};
    use rollcall_core::error::RollcallError;

    use super::*;

    fn open_with(path: &std::path::Path, clock: Arc<dyn Clock>) -> Services {
        let store = StoreConfig {
            path: path.to_path_buf(),
            ..StoreConfig::default()
        };
        Services::open(store, AttendanceConfig::default(), clock).unwrap()
    }

    fn open(path: &std::path::Path) -> Services {
        open_with(path, Arc::new(SystemClock))
    }

    fn claim_for(session_id: uuid::Uuid, name: &str) -> SubmitClaim {
        SubmitClaim {
            session_id,
            student_name: name.into(),
            roll_number: "7".into(),
            student_id: format!("S-{name}"),
        }
    }

    #[test]
    fn writes_land_without_an_explicit_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("attendance.json");

        let services = open(&path);
        services
            .write(|s| s.login.login("prof@example.com", "password123"))
            .unwrap();
        let session = services.write(|s| s.registry.create_session("1")).unwrap();
        let code = services.write(|s| s.registry.issue_otp(session.id)).unwrap();

        let reopened = open(&path);
        let teacher = reopened.read(|s| s.login.current_teacher()).unwrap();
        assert_eq!(teacher.map(|t| t.id), Some("1".to_string()));

        let stored = reopened.read(|s| s.registry.get(session.id)).unwrap();
        assert!(stored.active);
        assert_eq!(stored.otp.map(|o| o.code), Some(code));
    }

    #[test]
    fn changes_outside_write_are_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.json");

        let services = open(&path);
        services.registry.create_session("1").unwrap();

        let reopened = open(&path);
        assert!(reopened.read(|s| s.registry.list_sessions()).unwrap().is_empty());
    }

    #[test]
    fn failed_write_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.json");

        let services = open(&path);
        let result: RollcallResult<()> = services.write(|s| {
            s.registry.create_session("1")?;
            Err(RollcallError::Validation {
                message: "rejected".into(),
            })
        });
        assert!(result.is_err());

        let reopened = open(&path);
        assert!(reopened.read(|s| s.registry.list_sessions()).unwrap().is_empty());
    }

    #[test]
    fn student_verifies_against_code_issued_by_another_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.json");
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());

        let instructor = open_with(&path, Arc::new(clock.clone()));
        let student = open_with(&path, Arc::new(clock.clone()));
        let bob = open_with(&path, Arc::new(clock.clone()));

        let session = instructor
            .write(|s| s.registry.create_session("1"))
            .unwrap();

        // Student files first, before any code exists.
        let claim = student
            .write(|s| s.ledger.submit_claim(claim_for(session.id, "Ada")))
            .unwrap();

        let code = instructor
            .write(|s| s.registry.issue_otp(session.id))
            .unwrap();
        let bobs = bob
            .write(|s| s.ledger.submit_claim(claim_for(session.id, "Bob")))
            .unwrap();

        let outcome = student.write(|s| s.ledger.verify(claim.id, &code)).unwrap();
        assert_eq!(outcome, VerificationOutcome::Success);

        let latest = open_with(&path, Arc::new(clock));
        let stored = latest.read(|s| s.registry.get(session.id)).unwrap();
        assert_eq!(stored.otp.map(|o| o.code), Some(code));

        let claims = latest.read(|s| s.ledger.list_by_session(session.id)).unwrap();
        assert_eq!(claims.len(), 2);
        assert!(claims.iter().any(|c| c.id == claim.id && c.verified));
        assert!(claims.iter().any(|c| c.id == bobs.id && !c.verified));
    }

    #[test]
    fn unwritable_store_reports_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let services = Services::new(
            &MemoryDb::new(),
            Arc::new(SystemClock),
            AttendanceConfig::default(),
        );
        assert!(services.read(|s| s.registry.list_sessions()).unwrap().is_empty());

        let store = StoreConfig {
            path: blocker.join("attendance.json"),
            ..StoreConfig::default()
        };
        let services = Services::open(store, AttendanceConfig::default(), Arc::new(SystemClock))
            .unwrap();
        assert!(matches!(
            services.write(|s| s.registry.create_session("1")),
            Err(RollcallError::Storage(_))
        ));
    }
}
