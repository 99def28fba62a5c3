//! SuiStage event indexer.
//!
//! Mirrors the ticketing contract's `Event` objects into SQLite, serves them
//! over REST and proxies event images to Walrus.
//!
//! Layers, outermost first:
//!
//! - [`server`]: router, shared state, health endpoints
//! - [`api`]: request validation and response shaping
//! - [`services`]: chain sync and read queries
//! - [`bootstrap`]: wiring clients and the store from [`config::Config`]

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod server;
pub mod services;

pub use config::Config;
pub use services::{EventService, ServiceError};
