//! credfix library crate
//!
//! Exposes the credential store and configuration so tests and external
//! tooling can exercise the repair logic without going through CLI startup.

pub mod config;
pub mod creds;
