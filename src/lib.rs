//! # Restaurant state
//!
//! The data layer behind a restaurant's ordering site: the shopper's cart,
//! checkout, table reservations, public status tracking, the admin back
//! office, and the route-loader sequencing.
//!
//! ## Layout
//!
//! - **Collaborators** - the hosted backend, modelled as traits with in-memory
//!   implementations → [`remote`], [`auth`], [`storage`]
//! - **Mirror framework** - one actor per remote table that keeps a local
//!   snapshot fresh and serialises writes → [`mirror_framework`]
//! - **Stores** - cart, orders, reservations → [`cart`], [`order_store`],
//!   [`reservation_store`], with thin clients in [`clients`]
//! - **Flows** - [`checkout`], [`lookup`], [`admin`], [`route_loader`]
//! - **System** - construction, configuration, tracing and shutdown →
//!   [`app_system`]
//!
//! ## Example
//!
//! ```no_run
//! use restaurant_state::app_system::{Backend, Config, RestaurantSystem};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let system = RestaurantSystem::new(Config::default(), Backend::in_memory());
//! let orders = system.order_client.orders();
//! println!("{} orders mirrored", orders.len());
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod ids;
pub mod remote;
pub mod auth;
pub mod storage;

pub mod mirror_framework;
pub mod order_store;
pub mod reservation_store;
pub mod clients;
pub mod cart;

pub mod checkout;
pub mod lookup;
pub mod admin;
pub mod route_loader;

pub mod app_system;

#[cfg(test)]
mod mock_framework;
