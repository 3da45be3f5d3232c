//! Attendance claim domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student's self-reported presence against one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceClaim {
    pub id: Uuid,
    pub session_id: Uuid,
    pub student_name: String,
    pub roll_number: String,
    /// Externally issued student id, as typed by the student.
    pub student_id: String,
    pub submitted_at: DateTime<Utc>,
    pub verified: bool,
}

impl AttendanceClaim {
    pub fn status_label(&self) -> &'static str {
        if self.verified { "Verified" } else { "Pending" }
    }
}

#[derive(Debug, Clone)]
pub struct CreateClaim {
    pub id: Uuid,
    pub session_id: Uuid,
    pub student_name: String,
    pub roll_number: String,
    pub student_id: String,
    pub submitted_at: DateTime<Utc>,
}
