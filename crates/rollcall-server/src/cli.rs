//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rollcall_attendance::AttendanceConfig;
use rollcall_db::StoreConfig;
use uuid::Uuid;

/// Classroom attendance with one-time codes.
#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about)]
pub struct Cli {
    /// Snapshot file holding sessions, claims and login state.
    #[arg(
        long,
        global = true,
        env = "ROLLCALL_STORE",
        default_value = "attendance-app-storage.json"
    )]
    pub store: PathBuf,

    /// Origin that join links are built against.
    #[arg(
        long,
        global = true,
        env = "ROLLCALL_BASE_URL",
        default_value = "http://localhost:8080"
    )]
    pub base_url: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            path: self.store.clone(),
            ..StoreConfig::default()
        }
    }

    pub fn attendance_config(&self) -> AttendanceConfig {
        AttendanceConfig {
            join_base_url: self.base_url.clone(),
            ..AttendanceConfig::default()
        }
    }
}

/// Which session an instructor command acts on. Defaults to the
/// instructor's most recent active session.
#[derive(Args, Debug, Clone, Copy)]
pub struct SessionArg {
    #[arg(long)]
    pub session: Option<Uuid>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in as an instructor. Prompts for anything not given.
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out the current instructor.
    Logout,

    /// Manage attendance sessions.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show the claims filed against a session.
    Roster {
        #[command(flatten)]
        target: SessionArg,
    },

    /// Write a session's roster as CSV.
    Export {
        #[command(flatten)]
        target: SessionArg,
        /// Output file (default: attendance-YYYY-MM-DD.csv).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Seconds left on the current code.
    Countdown {
        #[command(flatten)]
        target: SessionArg,
        /// Keep ticking once a second until the code expires.
        #[arg(long)]
        watch: bool,
    },

    /// Check in as a student through a join link.
    Attend {
        /// Join link, `/attend/<id>` path or bare session id.
        link: String,
    },

    /// Verify an already-filed claim with a code, once.
    Verify {
        claim_id: Uuid,
        code: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
    /// Open a new session and print its join link.
    Start,
    /// Issue a fresh one-time code.
    Otp {
        #[command(flatten)]
        target: SessionArg,
    },
    /// End a session. Ended sessions accept no further claims.
    End {
        #[command(flatten)]
        target: SessionArg,
    },
    /// List the instructor's sessions.
    List,
}
