//! Attendance session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The code currently armed on a session.
///
/// Grouping the three values keeps them all-present or all-absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveOtp {
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ActiveOtp {
    /// Expired at exactly `expires_at`, not one instant later.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub teacher_id: String,
    pub created_at: DateTime<Utc>,
    /// URL a student follows to reach the claim form for this session.
    pub join_link: String,
    pub otp: Option<ActiveOtp>,
    pub active: bool,
}

impl Session {
    pub fn otp_code(&self) -> Option<&str> {
        self.otp.as_ref().map(|otp| otp.code.as_str())
    }

    pub fn otp_issued_at(&self) -> Option<DateTime<Utc>> {
        self.otp.as_ref().map(|otp| otp.issued_at)
    }

    pub fn otp_expires_at(&self) -> Option<DateTime<Utc>> {
        self.otp.as_ref().map(|otp| otp.expires_at)
    }
}

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub id: Uuid,
    pub teacher_id: String,
    pub created_at: DateTime<Utc>,
    pub join_link: String,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn otp_is_dead_at_exact_expiry() {
        let issued_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let otp = ActiveOtp {
            code: "123456".into(),
            issued_at,
            expires_at: issued_at + Duration::seconds(20),
        };
        assert!(otp.is_live_at(issued_at + Duration::seconds(19)));
        assert!(!otp.is_live_at(otp.expires_at));
        assert!(!otp.is_live_at(otp.expires_at + Duration::milliseconds(1)));
    }
}
