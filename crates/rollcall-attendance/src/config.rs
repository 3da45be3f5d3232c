//! Attendance configuration.

use chrono::Duration;

const MAX_OTP_VALIDITY_SECS: u64 = 86_400;

/// Configuration for the attendance services and controllers.
#[derive(Debug, Clone)]
pub struct AttendanceConfig {
    /// Lifetime of a one-time code in seconds (default: 20).
    pub otp_validity_secs: u64,
    /// Total verification tries a student gets per OTP-entry step
    /// (default: 3).
    pub max_verification_attempts: u32,
    /// Delay before a locked-out student is sent away (default: 3).
    pub lockout_redirect_delay_secs: u64,
    /// Delay before a student holding a dead join link is sent away
    /// (default: 3).
    pub invalid_session_redirect_delay_secs: u64,
    /// Origin that join links are built against.
    pub join_base_url: String,
}

impl AttendanceConfig {
    /// Code lifetime, capped at one day.
    pub fn otp_validity(&self) -> Duration {
        Duration::seconds(self.otp_validity_secs.min(MAX_OTP_VALIDITY_SECS) as i64)
    }

    pub fn lockout_redirect_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.lockout_redirect_delay_secs)
    }

    pub fn invalid_session_redirect_delay(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.invalid_session_redirect_delay_secs)
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            otp_validity_secs: 20,
            max_verification_attempts: 3,
            lockout_redirect_delay_secs: 3,
            invalid_session_redirect_delay_secs: 3,
            join_base_url: "http://localhost:8080".into(),
        }
    }
}
