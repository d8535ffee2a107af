//! Business records. Plain data with serde wire names; the mirror framework
//! wiring lives in the store modules.

pub mod customer;
pub mod menu;
pub mod order;
pub mod reservation;

pub use customer::*;
pub use menu::*;
pub use order::*;
pub use reservation::*;
