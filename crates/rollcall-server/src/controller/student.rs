//! Student check-in: join link, details form, then throttled code entry.

use rollcall_attendance::join;
use rollcall_attendance::otp;
use rollcall_attendance::{AttemptState, AttemptThrottle, AttendanceError, SubmitClaim};
use rollcall_core::error::{RollcallError, RollcallResult};
use rollcall_core::models::claim::AttendanceClaim;
use rollcall_core::models::session::Session;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::Services;
use crate::ui::{Form, FormRenderer, Navigator};

pub const HOME: &str = "/";

const NAME: &str = "name";
const ROLL_NUMBER: &str = "roll_number";
const STUDENT_ID: &str = "student_id";
const CODE: &str = "otp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendOutcome {
    Verified(AttendanceClaim),
    /// The student closed the form before finishing.
    Abandoned,
}

fn details_form(notice: Option<String>) -> Form {
    let form = Form::new("Mark Your Attendance")
        .field(NAME, "Full Name")
        .field(ROLL_NUMBER, "Roll Number")
        .field(STUDENT_ID, "Student ID");
    match notice {
        Some(notice) => form.notice(notice),
        None => form,
    }
}

fn code_form(notice: String) -> Form {
    Form::new("Verify OTP").notice(notice).field(CODE, "OTP")
}

fn attempts_text(remaining: u32) -> String {
    format!("{remaining} attempts remaining")
}

pub struct StudentController<'a, F, N> {
    services: &'a Services,
    forms: F,
    navigator: N,
}

impl<'a, F: FormRenderer, N: Navigator> StudentController<'a, F, N> {
    pub fn new(services: &'a Services, forms: F, navigator: N) -> Self {
        Self {
            services,
            forms,
            navigator,
        }
    }

    /// Resolve `link` to a running session.
    ///
    /// A dead link is announced and the student is sent home after the
    /// configured delay.
    pub fn open(&mut self, link: &str) -> RollcallResult<Session> {
        let resolved = join::extract_session_id(link)
            .map_err(RollcallError::from)
            .and_then(|id| self.services.read(|s| s.registry.get(id)))
            .and_then(|session| {
                if session.active {
                    Ok(session)
                } else {
                    Err(AttendanceError::SessionEnded(session.id).into())
                }
            });

        if let Err(e) = &resolved {
            warn!(link = %link, error = %e, "Join link rejected");
            self.forms.notify(
                "Invalid Session",
                "This attendance session is not active or doesn't exist.",
            );
            self.navigator
                .navigate(HOME, self.services.config().invalid_session_redirect_delay());
        }
        resolved
    }

    /// Collect the student's details and file an unverified claim.
    ///
    /// Missing fields re-show the form with the problem noted.
    pub fn submit_details(&mut self, session: &Session) -> RollcallResult<Option<AttendanceClaim>> {
        let mut notice = None;
        loop {
            let Some(values) = self.forms.collect(&details_form(notice.take())) else {
                return Ok(None);
            };

            let input = SubmitClaim {
                session_id: session.id,
                student_name: values.get(NAME).into(),
                roll_number: values.get(ROLL_NUMBER).into(),
                student_id: values.get(STUDENT_ID).into(),
            };
            let submitted = self.services.write(|s| s.ledger.submit_claim(input));

            match submitted {
                Ok(claim) => {
                    self.forms.notify(
                        "Form Submitted",
                        "Please enter the OTP announced by your teacher.",
                    );
                    return Ok(Some(claim));
                }
                Err(RollcallError::Validation { message }) => notice = Some(message),
                Err(e) => return Err(e),
            }
        }
    }

    /// Prompt for the code until it verifies, the throttle locks the
    /// student out, or the form is closed.
    ///
    /// Input that is not six digits is refused before it reaches the
    /// ledger and costs no attempt.
    pub fn enter_code(
        &mut self,
        claim_id: Uuid,
        throttle: &mut AttemptThrottle,
    ) -> RollcallResult<AttendOutcome> {
        let mut notice = attempts_text(throttle.remaining());
        loop {
            if let Err(e) = throttle.check() {
                self.lock_out();
                return Err(e.into());
            }

            let Some(values) = self.forms.collect(&code_form(notice.clone())) else {
                return Ok(AttendOutcome::Abandoned);
            };
            let code = values.get(CODE).trim();
            if !otp::is_well_formed(code) {
                notice = format!(
                    "{} ({})",
                    AttendanceError::MalformedCode,
                    attempts_text(throttle.remaining())
                );
                continue;
            }

            let outcome = self.services.write(|s| s.ledger.verify(claim_id, code))?;
            match throttle.record(outcome) {
                AttemptState::Verified => {
                    self.forms.notify(
                        "Attendance Marked",
                        "Your attendance has been successfully verified.",
                    );
                    let claim = self.services.read(|s| s.ledger.get_claim(claim_id))?;
                    return Ok(AttendOutcome::Verified(claim));
                }
                AttemptState::Retry { remaining } => {
                    let text = format!("Incorrect or expired OTP. {}.", attempts_text(remaining));
                    self.forms.notify("Invalid OTP", &text);
                    notice = attempts_text(remaining);
                }
                AttemptState::LockedOut => {
                    info!(claim_id = %claim_id, "Student locked out of verification");
                    self.lock_out();
                    return Err(AttendanceError::TooManyAttempts {
                        max_attempts: throttle.max_attempts(),
                    }
                    .into());
                }
            }
        }
    }

    /// The whole check-in: open the link, file the claim, verify it.
    pub fn run(&mut self, link: &str) -> RollcallResult<AttendOutcome> {
        let session = self.open(link)?;
        let Some(claim) = self.submit_details(&session)? else {
            return Ok(AttendOutcome::Abandoned);
        };
        let mut throttle = AttemptThrottle::from_config(self.services.config());
        self.enter_code(claim.id, &mut throttle)
    }

    fn lock_out(&mut self) {
        self.forms.notify(
            "Too Many Attempts",
            "You've reached the maximum number of attempts.",
        );
        self.navigator
            .navigate(HOME, self.services.config().lockout_redirect_delay());
    }
}
