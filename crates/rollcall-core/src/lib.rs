//! Rollcall Core: domain models, error taxonomy, repository traits
//! and the clock abstraction shared by every other crate.

pub mod clock;
pub mod error;
pub mod models;
pub mod repository;
