//! Persisted snapshot layout and migrations.
//!
//! A snapshot is one JSON document holding every session, every claim
//! and the login flags. Documents carry an explicit `schema_version`;
//! the version-less layout written by earlier browser clients is
//! upgraded on load.

use chrono::{DateTime, Utc};
use rollcall_core::models::claim::AttendanceClaim;
use rollcall_core::models::session::{ActiveOtp, Session};
use rollcall_core::models::teacher::AuthState;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;

/// Current snapshot layout version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub storage_key: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub claims: Vec<AttendanceClaim>,
    #[serde(default)]
    pub auth: AuthState,
}

impl Snapshot {
    pub fn empty(storage_key: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            storage_key: storage_key.to_string(),
            sessions: Vec::new(),
            claims: Vec::new(),
            auth: AuthState::default(),
        }
    }
}

// -----------------------------------------------------------------------
// Legacy (version 0) layout
// -----------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LegacyEnvelope {
    state: LegacyState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyState {
    #[serde(default)]
    current_teacher: Option<LegacyTeacher>,
    #[serde(default)]
    is_authenticated: bool,
    #[serde(default)]
    sessions: Vec<LegacySession>,
    #[serde(default)]
    attendance_records: Vec<LegacyRecord>,
}

#[derive(Debug, Deserialize)]
struct LegacyTeacher {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacySession {
    id: String,
    teacher_id: String,
    created_at: DateTime<Utc>,
    qr_code: String,
    otp: Option<String>,
    otp_generated_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord {
    id: String,
    session_id: String,
    student_id: String,
    student_name: String,
    roll_number: String,
    timestamp: DateTime<Utc>,
    verified: bool,
}

fn parse_id(kind: &str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Migration(format!("invalid {kind} id {raw:?}: {e}")))
}

impl LegacySession {
    fn upgrade(self) -> Result<Session, DbError> {
        let id = parse_id("session", &self.id)?;
        let otp = match (self.otp, self.otp_generated_at, self.expires_at) {
            (Some(code), Some(issued_at), Some(expires_at)) => Some(ActiveOtp {
                code,
                issued_at,
                expires_at,
            }),
            (None, None, None) => None,
            _ => {
                warn!(session_id = %id, "Dropping partially set legacy OTP fields");
                None
            }
        };
        Ok(Session {
            id,
            teacher_id: self.teacher_id,
            created_at: self.created_at,
            join_link: self.qr_code,
            otp,
            active: self.is_active,
        })
    }
}

impl LegacyRecord {
    fn upgrade(self) -> Result<AttendanceClaim, DbError> {
        Ok(AttendanceClaim {
            id: parse_id("attendance record", &self.id)?,
            session_id: parse_id("session", &self.session_id)?,
            student_name: self.student_name,
            roll_number: self.roll_number,
            student_id: self.student_id,
            submitted_at: self.timestamp,
            verified: self.verified,
        })
    }
}

fn migrate_legacy(value: serde_json::Value, storage_key: &str) -> Result<Snapshot, DbError> {
    let envelope: LegacyEnvelope = serde_json::from_value(value)?;
    info!(
        legacy_version = envelope.version,
        target_version = SCHEMA_VERSION,
        "Migrating legacy snapshot"
    );

    let state = envelope.state;
    let sessions = state
        .sessions
        .into_iter()
        .map(LegacySession::upgrade)
        .collect::<Result<Vec<_>, _>>()?;
    let claims = state
        .attendance_records
        .into_iter()
        .map(LegacyRecord::upgrade)
        .collect::<Result<Vec<_>, _>>()?;
    let current_teacher_id = match (state.is_authenticated, state.current_teacher) {
        (true, Some(teacher)) => Some(teacher.id),
        _ => None,
    };

    Ok(Snapshot {
        schema_version: SCHEMA_VERSION,
        storage_key: storage_key.to_string(),
        sessions,
        claims,
        auth: AuthState { current_teacher_id },
    })
}

/// Bring any supported snapshot document up to [`SCHEMA_VERSION`].
pub fn migrate(value: serde_json::Value, storage_key: &str) -> Result<Snapshot, DbError> {
    let version = value.get("schema_version").and_then(serde_json::Value::as_u64);
    match version {
        Some(v) if v == u64::from(SCHEMA_VERSION) => {
            let snapshot: Snapshot = serde_json::from_value(value)?;
            if snapshot.storage_key != storage_key {
                return Err(DbError::Migration(format!(
                    "snapshot belongs to {:?}, expected {storage_key:?}",
                    snapshot.storage_key
                )));
            }
            Ok(snapshot)
        }
        Some(v) => Err(DbError::Migration(format!(
            "unsupported schema_version {v} (this build reads {SCHEMA_VERSION})"
        ))),
        None if value.get("state").is_some() => migrate_legacy(value, storage_key),
        None => Err(DbError::Migration("unrecognized snapshot layout".into())),
    }
}
