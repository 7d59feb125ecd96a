//! Common library for the city weather service
//!
//! This crate provides shared functionality used by the service crates,
//! including SQLite connectivity, migrations and error handling.

pub mod database;
pub mod error;
