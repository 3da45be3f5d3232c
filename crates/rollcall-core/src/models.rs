//! Domain models for rollcall.

pub mod claim;
pub mod session;
pub mod teacher;
