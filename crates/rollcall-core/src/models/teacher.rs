//! Instructor domain model and persisted login flags.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Who is logged in on this client, if anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub current_teacher_id: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.current_teacher_id.is_some()
    }
}
