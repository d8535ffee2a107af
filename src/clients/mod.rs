//! Typed clients over the table mirrors. Cheap to clone; hand one to every
//! consumer instead of sharing a global.

#[macro_use]
mod macros;

pub mod order_client;
pub mod reservation_client;

pub use order_client::*;
pub use reservation_client::*;
