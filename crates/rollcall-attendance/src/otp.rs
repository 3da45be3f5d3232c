//! One-time code generation.
//!
//! Codes are six decimal digits drawn uniformly from
//! `100000..=999999`, so the leading digit is never zero.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rollcall_core::models::session::ActiveOtp;

pub const OTP_MIN: u32 = 100_000;
pub const OTP_MAX: u32 = 999_999;
pub const OTP_LENGTH: usize = 6;

/// Supplies raw code values.
pub trait CodeSource: Send {
    fn next_code(&mut self) -> u32;
}

/// Uniform random codes.
#[derive(Debug)]
pub struct RandomCodes {
    rng: StdRng,
}

impl RandomCodes {
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible stream, for demos and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl CodeSource for RandomCodes {
    fn next_code(&mut self) -> u32 {
        self.rng.random_range(OTP_MIN..=OTP_MAX)
    }
}

/// Hands out a fixed list of codes, then falls back to a seeded stream.
#[derive(Debug)]
pub struct ScriptedCodes {
    queue: VecDeque<u32>,
    fallback: RandomCodes,
}

impl ScriptedCodes {
    pub fn new(codes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            queue: codes.into_iter().collect(),
            fallback: RandomCodes::seeded(0),
        }
    }
}

impl CodeSource for ScriptedCodes {
    fn next_code(&mut self) -> u32 {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.next_code())
    }
}

/// Fold an arbitrary value into the code range. In-range values pass
/// through unchanged.
fn into_range(raw: u32) -> u32 {
    if (OTP_MIN..=OTP_MAX).contains(&raw) {
        raw
    } else {
        OTP_MIN + raw % (OTP_MAX - OTP_MIN + 1)
    }
}

/// Mint a code valid from `issued_at` for `validity`.
pub fn generate(source: &mut dyn CodeSource, issued_at: DateTime<Utc>, validity: Duration) -> ActiveOtp {
    let code = into_range(source.next_code());
    ActiveOtp {
        code: code.to_string(),
        issued_at,
        expires_at: issued_at + validity,
    }
}

/// Exactly six ASCII digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Whole seconds left on `otp` at `now`, floored at zero. Display only;
/// expiry decisions use [`ActiveOtp::is_live_at`].
pub fn seconds_remaining(otp: Option<&ActiveOtp>, now: DateTime<Utc>) -> i64 {
    otp.map(|otp| (otp.expires_at - now).num_seconds().max(0))
        .unwrap_or(0)
}
