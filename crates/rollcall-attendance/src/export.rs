//! Roster export: one session's claims as a CSV table.
//!
//! Name, roll number and student id are typed by students, so cells
//! that a spreadsheet would read as a formula are prefixed with `'`.

use std::borrow::Cow;
use std::fmt::Display;
use std::io::{self, Write};

use chrono::{Local, NaiveDate, TimeZone};
use rollcall_core::models::claim::AttendanceClaim;

pub const HEADERS: [&str; 5] = ["Student ID", "Name", "Roll Number", "Time", "Status"];

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub student_id: String,
    pub name: String,
    pub roll_number: String,
    pub time: String,
    pub status: &'static str,
}

impl RosterRow {
    fn cells(&self) -> [&str; 5] {
        [
            &self.student_id,
            &self.name,
            &self.roll_number,
            &self.time,
            self.status,
        ]
    }
}

/// Rows with timestamps rendered in the machine's local time.
pub fn roster_rows(claims: &[AttendanceClaim]) -> Vec<RosterRow> {
    roster_rows_in(claims, &Local)
}

pub fn roster_rows_in<Tz>(claims: &[AttendanceClaim], tz: &Tz) -> Vec<RosterRow>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    claims
        .iter()
        .map(|claim| RosterRow {
            student_id: claim.student_id.clone(),
            name: claim.student_name.clone(),
            roll_number: claim.roll_number.clone(),
            time: claim
                .submitted_at
                .with_timezone(tz)
                .format(TIME_FORMAT)
                .to_string(),
            status: claim.status_label(),
        })
        .collect()
}

fn escape(cell: &str) -> Cow<'_, str> {
    let defused: Cow<'_, str> = if cell.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        Cow::Owned(format!("'{cell}"))
    } else {
        Cow::Borrowed(cell)
    };

    if defused.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", defused.replace('"', "\"\"")))
    } else {
        defused
    }
}

fn write_record<W: Write>(out: &mut W, cells: &[&str]) -> io::Result<()> {
    let line = cells
        .iter()
        .map(|cell| escape(cell))
        .collect::<Vec<_>>()
        .join(",");
    out.write_all(line.as_bytes())?;
    out.write_all(b"\r\n")
}

/// Header line followed by one line per row, CRLF-terminated.
pub fn write_csv<W: Write>(mut out: W, rows: &[RosterRow]) -> io::Result<()> {
    write_record(&mut out, &HEADERS)?;
    for row in rows {
        write_record(&mut out, &row.cells())?;
    }
    out.flush()
}

/// `attendance-YYYY-MM-DD.csv`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!("attendance-{}.csv", date.format("%Y-%m-%d"))
}
