//! Snapshot file management.
//!
//! Several processes may share one snapshot file. Writers go through
//! [`SnapshotStore::transaction`], which holds an exclusive lock on a
//! sidecar `.lock` file while it reloads, mutates and writes back.
//! Readers reload under a shared lock.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::DbError;
use crate::repository::MemoryDb;
use crate::schema::{self, Snapshot};

/// Configuration for the persisted snapshot.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// JSON file holding the snapshot.
    pub path: PathBuf,
    /// Storage identifier recorded inside the snapshot.
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("attendance-app-storage.json"),
            storage_key: "attendance-app-storage".into(),
        }
    }
}

/// Loads and saves the snapshot behind a [`MemoryDb`].
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    config: StoreConfig,
}

impl SnapshotStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn sidecar(&self, suffix: &str) -> PathBuf {
        let mut path = self.config.path.as_os_str().to_owned();
        path.push(suffix);
        PathBuf::from(path)
    }

    /// Open the lock file. The lock is released when the file is dropped.
    fn lock_file(&self) -> Result<File, DbError> {
        if let Some(parent) = self.config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.sidecar(".lock"))?;
        Ok(file)
    }

    /// Read the snapshot, upgrading older layouts.
    ///
    /// A missing file yields an empty snapshot.
    pub fn load(&self) -> Result<Snapshot, DbError> {
        let path = &self.config.path;
        if !path.exists() {
            debug!(path = %path.display(), "No snapshot on disk, starting empty");
            return Ok(Snapshot::empty(&self.config.storage_key));
        }

        let raw = fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let snapshot = schema::migrate(value, &self.config.storage_key)?;

        debug!(
            path = %path.display(),
            sessions = snapshot.sessions.len(),
            claims = snapshot.claims.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Load straight into a fresh in-memory store.
    pub fn open(&self) -> Result<MemoryDb, DbError> {
        self.load().map(MemoryDb::from_snapshot)
    }

    /// Reload `db` from disk so it reflects every committed write.
    pub fn refresh(&self, db: &MemoryDb) -> Result<(), DbError> {
        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock)?;
        db.replace(self.load()?)
    }

    /// Run `op` against the latest state on disk and write the result
    /// back before any other writer can start.
    ///
    /// Nothing is written if `op` fails.
    pub fn transaction<T, E>(&self, db: &MemoryDb, op: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let lock = self.lock_file()?;
        FileExt::lock_exclusive(&lock).map_err(DbError::from)?;
        db.replace(self.load()?)?;

        let value = op()?;
        self.save(db)?;
        Ok(value)
    }

    /// Write the full contents of `db`, replacing the file atomically.
    ///
    /// Callers sharing the file with other processes should use
    /// [`transaction`](Self::transaction) instead.
    pub fn save(&self, db: &MemoryDb) -> Result<(), DbError> {
        let snapshot = db.to_snapshot(&self.config.storage_key)?;
        let path = &self.config.path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.sidecar(".tmp");

        let body = serde_json::to_vec_pretty(&snapshot)?;
        fs::write(&tmp, body)?;
        fs::rename(&tmp, path)?;

        debug!(
            path = %path.display(),
            sessions = snapshot.sessions.len(),
            claims = snapshot.claims.len(),
            "Saved snapshot"
        );
        Ok(())
    }
}
