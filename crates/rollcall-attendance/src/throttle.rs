//! Per-claim attempt throttle for the OTP-entry step.
//!
//! Lives with the student-facing controller, not the ledger, and is
//! never persisted: reloading resets it. The bound counts total tries,
//! so with the default of 3 the student sees 2, then 1 remaining, and
//! the third miss locks them out.

use crate::config::AttendanceConfig;
use crate::error::AttendanceError;
use crate::ledger::VerificationOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Verified,
    Retry { remaining: u32 },
    LockedOut,
}

#[derive(Debug, Clone)]
pub struct AttemptThrottle {
    max_attempts: u32,
    failures: u32,
}

impl AttemptThrottle {
    /// A bound below 1 is raised to 1.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            failures: 0,
        }
    }

    pub fn from_config(config: &AttendanceConfig) -> Self {
        Self::new(config.max_verification_attempts)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.failures)
    }

    pub fn is_locked_out(&self) -> bool {
        self.failures >= self.max_attempts
    }

    /// Gate to call before each attempt.
    pub fn check(&self) -> Result<(), AttendanceError> {
        if self.is_locked_out() {
            return Err(AttendanceError::TooManyAttempts {
                max_attempts: self.max_attempts,
            });
        }
        Ok(())
    }

    pub fn record(&mut self, outcome: VerificationOutcome) -> AttemptState {
        match outcome {
            VerificationOutcome::Success => AttemptState::Verified,
            VerificationOutcome::Failure => {
                self.failures = self.failures.saturating_add(1);
                if self.is_locked_out() {
                    AttemptState::LockedOut
                } else {
                    AttemptState::Retry {
                        remaining: self.remaining(),
                    }
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_tries_then_lockout() {
        let mut throttle = AttemptThrottle::new(3);
        assert_eq!(throttle.remaining(), 3);

        assert_eq!(
            throttle.record(VerificationOutcome::Failure),
            AttemptState::Retry { remaining: 2 }
        );
        assert!(throttle.check().is_ok());
        assert_eq!(
            throttle.record(VerificationOutcome::Failure),
            AttemptState::Retry { remaining: 1 }
        );
        assert!(throttle.check().is_ok());
        assert_eq!(throttle.record(VerificationOutcome::Failure), AttemptState::LockedOut);

        assert!(matches!(
            throttle.check(),
            Err(AttendanceError::TooManyAttempts { max_attempts: 3 })
        ));
    }

    #[test]
    fn success_does_not_consume_an_attempt() {
        let mut throttle = AttemptThrottle::new(3);
        throttle.record(VerificationOutcome::Failure);
        assert_eq!(throttle.record(VerificationOutcome::Success), AttemptState::Verified);
        assert_eq!(throttle.failures(), 1);
    }

    #[test]
    fn zero_bound_still_allows_one_try() {
        let mut throttle = AttemptThrottle::new(0);
        assert!(throttle.check().is_ok());
        assert_eq!(throttle.record(VerificationOutcome::Failure), AttemptState::LockedOut);
    }

    #[test]
    fn reset_clears_failures() {
        let mut throttle = AttemptThrottle::from_config(&AttendanceConfig::default());
        throttle.record(VerificationOutcome::Failure);
        throttle.record(VerificationOutcome::Failure);
        throttle.reset();
        assert_eq!(throttle.remaining(), 3);
    }
}
