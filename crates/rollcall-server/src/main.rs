//! Rollcall: command-line entry point.
//!
//! Each command reloads the snapshot before it reads and commits every
//! change as soon as it is made, under a lock shared with any other
//! `rollcall` process on the same file. A failed write is fatal.

mod app;
mod cli;
mod controller;
mod ui;

use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::Local;
use clap::Parser;
use rollcall_attendance::{VerificationOutcome, export, otp};
use rollcall_core::clock::SystemClock;
use rollcall_core::error::RollcallError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::Services;
use crate::cli::{Cli, Command, SessionAction, SessionArg};
use crate::controller::{AttendOutcome, InstructorController, StudentController};
use crate::ui::{Form, FormRenderer, TerminalForms, TerminalNavigator};

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rollcall=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let services =
        Services::open(cli.store_config(), cli.attendance_config(), Arc::new(SystemClock))
            .with_context(|| format!("failed to load {}", cli.store.display()))?;

    run(&cli, &services)
}

fn run(cli: &Cli, services: &Services) -> anyhow::Result<()> {
    let mut dashboard = InstructorController::new(services);

    match &cli.command {
        Command::Login { email, password } => {
            let (email, password) = match (email, password) {
                (Some(e), Some(p)) => (e.clone(), p.clone()),
                _ => {
                    let form = Form::new("Teacher Login")
                        .field("email", "Email")
                        .field("password", "Password");
                    let Some(values) =
                        TerminalForms::new(io::stdin().lock(), io::stdout()).collect(&form)
                    else {
                        bail!("login cancelled");
                    };
                    (
                        email.clone().unwrap_or_else(|| values.get("email").to_string()),
                        password
                            .clone()
                            .unwrap_or_else(|| values.get("password").to_string()),
                    )
                }
            };
            let teacher = dashboard.login(&email, &password)?;
            println!("Logged in as {} <{}>", teacher.name, teacher.email);
        }

        Command::Logout => {
            dashboard.logout()?;
            println!("Logged out");
        }

        Command::Session { action } => match action {
            SessionAction::Start => {
                let session = dashboard.start_session()?;
                println!("Session {}", session.id);
                println!("Join link: {}", session.join_link);
            }
            SessionAction::Otp { target } => {
                select(&mut dashboard, *target)?;
                let code = dashboard.issue_otp()?;
                let validity = services.config().otp_validity_secs;
                println!("OTP {code} (valid for {validity} seconds)");
            }
            SessionAction::End { target } => {
                let session = select(&mut dashboard, *target)?;
                dashboard.end_session()?;
                println!("Session {} ended", session);
            }
            SessionAction::List => {
                for session in dashboard.sessions()? {
                    let status = if session.active { "active" } else { "ended" };
                    println!(
                        "{}  {}  {:<6}  {}",
                        session.id,
                        session.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                        status,
                        session.join_link
                    );
                }
            }
        },

        Command::Roster { target } => {
            select(&mut dashboard, *target)?;
            let summary = dashboard.summary()?;
            for row in export::roster_rows(&dashboard.roster()?) {
                println!(
                    "{:<12} {:<24} {:<8} {}  {}",
                    row.student_id, row.name, row.roll_number, row.time, row.status
                );
            }
            println!("{} of {} verified", summary.verified, summary.total);
        }

        Command::Export { target, output } => {
            select(&mut dashboard, *target)?;
            let rows = dashboard.export_rows()?;
            let path = output.clone().unwrap_or_else(|| {
                export::default_file_name(Local::now().date_naive()).into()
            });
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export::write_csv(BufWriter::new(file), &rows)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), rows = rows.len(), "Roster exported");
            println!("Exported {} rows to {}", rows.len(), path.display());
        }

        Command::Countdown { target, watch } => {
            select(&mut dashboard, *target)?;
            loop {
                let remaining = dashboard.countdown()?;
                println!("{remaining}s");
                if !watch || remaining == 0 {
                    break;
                }
                std::thread::sleep(Duration::from_secs(1));
            }
        }

        Command::Attend { link } => {
            let mut student = StudentController::new(
                services,
                TerminalForms::new(io::stdin().lock(), io::stdout()),
                TerminalNavigator::new(io::stdout()),
            );
            match student.run(link)? {
                AttendOutcome::Verified(claim) => {
                    println!("Attendance verified for {}", claim.student_name);
                }
                AttendOutcome::Abandoned => println!("Check-in abandoned"),
            }
        }

        Command::Verify { claim_id, code } => {
            let code = code.trim();
            if !otp::is_well_formed(code) {
                return Err(rollcall_attendance::AttendanceError::MalformedCode.into());
            }
            match services.write(|s| s.ledger.verify(*claim_id, code))? {
                VerificationOutcome::Success => println!("Attendance verified"),
                VerificationOutcome::Failure => return Err(RollcallError::VerificationFailed.into()),
            }
        }
    }

    Ok(())
}

/// Focus the requested session, else the latest active one, else the
/// latest one of any state.
fn select(dashboard: &mut InstructorController<'_>, target: SessionArg) -> anyhow::Result<uuid::Uuid> {
    if let Some(id) = target.session {
        return Ok(dashboard.focus(id)?.id);
    }
    if let Some(session) = dashboard.resume()? {
        return Ok(session.id);
    }
    match dashboard.sessions()?.last() {
        Some(session) => Ok(dashboard.focus(session.id)?.id),
        None => bail!("no sessions yet; run `rollcall session start`"),
    }
}
