//! Screen-level flows. Controllers own presentation state (focused
//! session, attempt counts) and call into the attendance services.

pub mod instructor;
pub mod student;

pub use instructor::InstructorController;
pub use student::{AttendOutcome, StudentController};
