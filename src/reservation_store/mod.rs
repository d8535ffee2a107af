//! The `reservations` table: record wiring and errors.

pub mod error;
pub mod record;

pub use error::*;
