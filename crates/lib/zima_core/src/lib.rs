//! # zima_core
//!
//! Core credential and license logic for ZIMA.

pub mod auth;
pub mod licenses;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
