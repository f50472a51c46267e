//! DryerVent firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for ESP-IDF requires the `espidf` feature");

pub mod aggregator;
pub mod app;
pub mod capture;
pub mod classifier;
pub mod config;
pub mod error;
pub mod pins;
pub mod report;

// Hardware-facing modules; the actual peripheral access is guarded by
// cfg attributes inside, with simulation stubs elsewhere.
pub mod adapters;
pub mod drivers;

pub use error::{Error, Result};
