//! Integration tests for the session/claim/OTP lifecycle over the
//! in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rollcall_attendance::otp::ScriptedCodes;
use rollcall_attendance::{
    AttemptState, AttemptThrottle, AttendanceConfig, AttendanceLedger, RosterSummary,
    SessionRegistry, SubmitClaim, VerificationOutcome,
};
use rollcall_core::clock::{Clock, ManualClock};
use rollcall_core::error::RollcallError;
use rollcall_db::MemoryDb;
use rollcall_db::repository::{MemoryClaimRepository, MemorySessionRepository};
use uuid::Uuid;

struct Harness {
    clock: ManualClock,
    registry: SessionRegistry<MemorySessionRepository>,
    ledger: AttendanceLedger<MemoryClaimRepository, MemorySessionRepository>,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// Helper: one shared store, a pinned clock and scripted codes.
fn setup(codes: &[u32]) -> Harness {
    let db = MemoryDb::new();
    let clock = ManualClock::new(start());
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());

    let registry = SessionRegistry::new(db.sessions(), shared.clone(), AttendanceConfig::default())
        .with_code_source(ScriptedCodes::new(codes.iter().copied()));
    let ledger = AttendanceLedger::new(db.claims(), db.sessions(), shared);

    Harness {
        clock,
        registry,
        ledger,
    }
}

fn details(session_id: Uuid, name: &str) -> SubmitClaim {
    SubmitClaim {
        session_id,
        student_name: name.into(),
        roll_number: "42".into(),
        student_id: format!("S-{name}"),
    }
}

// -----------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------

#[test]
fn verify_within_window_then_expired_for_late_claim() {
    let h = setup(&[482_913]);
    let session = h.registry.create_session("1").unwrap();
    let code = h.registry.issue_otp(session.id).unwrap();
    assert_eq!(code, "482913");

    let c1 = h.ledger.submit_claim(details(session.id, "ada")).unwrap();
    h.clock.advance(Duration::seconds(5));
    assert_eq!(
        h.ledger.verify(c1.id, "482913").unwrap(),
        VerificationOutcome::Success
    );
    assert!(h.ledger.get_claim(c1.id).unwrap().verified);

    h.clock.advance(Duration::seconds(20));
    let c2 = h.ledger.submit_claim(details(session.id, "bob")).unwrap();
    assert_eq!(
        h.ledger.verify(c2.id, "482913").unwrap(),
        VerificationOutcome::Failure
    );
    assert!(!h.ledger.get_claim(c2.id).unwrap().verified);
    // The earlier success stands.
    assert!(h.ledger.get_claim(c1.id).unwrap().verified);
}

#[test]
fn reverify_with_live_code_is_idempotent() {
    let h = setup(&[654_321]);
    let session = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(session.id).unwrap();
    let claim = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

    assert!(h.ledger.verify(claim.id, "654321").unwrap().is_success());
    h.clock.advance(Duration::seconds(2));
    assert!(h.ledger.verify(claim.id, "654321").unwrap().is_success());
    assert!(h.ledger.get_claim(claim.id).unwrap().verified);
}

#[test]
fn verified_claim_stays_verified_after_failed_retry() {
    let h = setup(&[654_321]);
    let session = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(session.id).unwrap();
    let claim = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

    h.ledger.verify(claim.id, "654321").unwrap();
    assert_eq!(
        h.ledger.verify(claim.id, "000000").unwrap(),
        VerificationOutcome::Failure
    );
    assert!(h.ledger.get_claim(claim.id).unwrap().verified);
}

#[test]
fn expiry_boundary_is_exclusive() {
    let h = setup(&[111_222]);
    let session = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(session.id).unwrap();
    let claim = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

    h.clock.set(start() + Duration::seconds(20));
    assert_eq!(
        h.ledger.verify(claim.id, "111222").unwrap(),
        VerificationOutcome::Failure
    );

    h.clock.set(start() + Duration::seconds(20) - Duration::milliseconds(1));
    assert_eq!(
        h.ledger.verify(claim.id, "111222").unwrap(),
        VerificationOutcome::Success
    );
}

#[test]
fn pending_claim_binds_to_reissued_code() {
    let h = setup(&[111_111, 222_222]);
    let session = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(session.id).unwrap();
    let claim = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

    h.clock.advance(Duration::seconds(3));
    h.registry.issue_otp(session.id).unwrap();

    assert_eq!(
        h.ledger.verify(claim.id, "111111").unwrap(),
        VerificationOutcome::Failure
    );
    assert_eq!(
        h.ledger.verify(claim.id, "222222").unwrap(),
        VerificationOutcome::Success
    );
}

#[test]
fn no_code_issued_never_verifies() {
    let h = setup(&[]);
    let session = h.registry.create_session("1").unwrap();
    let claim = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

    assert_eq!(h.ledger.verify(claim.id, "").unwrap(), VerificationOutcome::Failure);
    assert_eq!(
        h.ledger.verify(claim.id, "123456").unwrap(),
        VerificationOutcome::Failure
    );
}

#[test]
fn codes_from_other_sessions_do_not_cross() {
    let h = setup(&[111_111, 222_222]);
    let a = h.registry.create_session("1").unwrap();
    let b = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(a.id).unwrap();
    h.registry.issue_otp(b.id).unwrap();

    let claim = h.ledger.submit_claim(details(a.id, "ada")).unwrap();
    assert_eq!(
        h.ledger.verify(claim.id, "222222").unwrap(),
        VerificationOutcome::Failure
    );
}

#[test]
fn ended_session_rejects_claims_and_verification() {
    let h = setup(&[333_444]);
    let session = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(session.id).unwrap();
    let pending = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

    h.registry.end_session(session.id).unwrap();

    let err = h.ledger.submit_claim(details(session.id, "bob")).unwrap_err();
    assert!(matches!(err, RollcallError::InactiveSession { .. }), "got {err:?}");

    let err = h.ledger.verify(pending.id, "333444").unwrap_err();
    assert!(matches!(err, RollcallError::InactiveSession { .. }), "got {err:?}");
    assert!(!h.ledger.get_claim(pending.id).unwrap().verified);
}

#[test]
fn claim_against_unknown_session_is_not_found() {
    let h = setup(&[]);
    let err = h.ledger.submit_claim(details(Uuid::new_v4(), "ada")).unwrap_err();
    assert!(matches!(err, RollcallError::NotFound { .. }));
}

#[test]
fn three_wrong_codes_lock_out_and_leave_claim_pending() {
    let h = setup(&[987_654]);
    let session = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(session.id).unwrap();
    let claim = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

    let mut throttle = AttemptThrottle::from_config(h.registry.config());
    let mut states = Vec::new();
    for _ in 0..3 {
        throttle.check().unwrap();
        let outcome = h.ledger.verify(claim.id, "000000").unwrap();
        states.push(throttle.record(outcome));
    }

    assert_eq!(
        states,
        [
            AttemptState::Retry { remaining: 2 },
            AttemptState::Retry { remaining: 1 },
            AttemptState::LockedOut,
        ]
    );
    assert!(throttle.check().is_err());
    assert!(!h.ledger.get_claim(claim.id).unwrap().verified);
}

#[test]
fn roster_read_path_and_summary() {
    let h = setup(&[135_790]);
    let session = h.registry.create_session("1").unwrap();
    h.registry.issue_otp(session.id).unwrap();

    let ada = h.ledger.submit_claim(details(session.id, "ada")).unwrap();
    h.ledger.submit_claim(details(session.id, "bob")).unwrap();
    h.ledger.verify(ada.id, "135790").unwrap();

    let roster = h.registry.list_by_session(&h.ledger, session.id).unwrap();
    let names: Vec<&str> = roster.iter().map(|c| c.student_name.as_str()).collect();
    assert_eq!(names, ["ada", "bob"]);
    assert_eq!(
        h.ledger.summary(session.id).unwrap(),
        RosterSummary {
            total: 2,
            verified: 1
        }
    );

    let err = h
        .registry
        .list_by_session(&h.ledger, Uuid::new_v4())
        .unwrap_err();
    assert!(matches!(err, RollcallError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------

proptest! {
    /// Success iff the code matches and `now < expires_at`.
    #[test]
    fn prop_success_iff_match_and_unexpired(
        armed in 100_000u32..=999_999,
        supplied in prop_oneof![Just(None), (100_000u32..=999_999).prop_map(Some)],
        offset_ms in -5_000i64..40_000,
    ) {
        let h = setup(&[armed]);
        let session = h.registry.create_session("1").unwrap();
        h.registry.issue_otp(session.id).unwrap();
        let claim = h.ledger.submit_claim(details(session.id, "ada")).unwrap();

        let supplied = supplied.unwrap_or(armed).to_string();
        h.clock.set(start() + Duration::milliseconds(offset_ms));

        let expected = supplied == armed.to_string() && offset_ms < 20_000;
        let outcome = h.ledger.verify(claim.id, &supplied).unwrap();
        prop_assert_eq!(outcome.is_success(), expected);
        prop_assert_eq!(h.ledger.get_claim(claim.id).unwrap().verified, expected);
    }

    /// Every issued code is six digits and expires exactly 20s after issue.
    #[test]
    fn prop_issued_window_is_exact(raw in any::<u32>(), elapsed_ms in 0i64..120_000) {
        let h = setup(&[raw]);
        let session = h.registry.create_session("1").unwrap();
        h.clock.advance(Duration::milliseconds(elapsed_ms));
        let code = h.registry.issue_otp(session.id).unwrap();

        let stored = h.registry.get(session.id).unwrap();
        let otp = stored.otp.unwrap();
        prop_assert_eq!(&otp.code, &code);
        prop_assert_eq!(code.len(), 6);
        prop_assert!(!code.starts_with('0'));
        prop_assert_eq!(otp.issued_at, start() + Duration::milliseconds(elapsed_ms));
        prop_assert_eq!(otp.expires_at - otp.issued_at, Duration::seconds(20));
    }
}
