//! Rollcall Attendance: session lifecycle, one-time codes, claim
//! verification and the instructor-facing read paths.

pub mod config;
pub mod error;
pub mod export;
pub mod join;
pub mod ledger;
pub mod login;
pub mod otp;
pub mod registry;
pub mod throttle;

pub use config::AttendanceConfig;
pub use error::AttendanceError;
pub use ledger::{AttendanceLedger, RosterSummary, SubmitClaim, VerificationOutcome};
pub use login::{LoginService, TeacherDirectory};
pub use registry::SessionRegistry;
pub use throttle::{AttemptState, AttemptThrottle};
