//! Domain models shared by the store, the license manager and the API.

pub mod account;
pub mod auth;
pub mod license;
