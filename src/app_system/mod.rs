//! System construction, configuration, tracing and shutdown.

pub mod config;
pub mod error;
pub mod restaurant_system;
pub mod telemetry;

pub use config::*;
pub use error::*;
pub use restaurant_system::*;
pub use telemetry::*;
