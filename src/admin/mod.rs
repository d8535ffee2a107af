//! The back office: a role gate and the views it unlocks.

pub mod console;
pub mod error;
pub mod gate;

pub use console::*;
pub use error::*;
pub use gate::*;
