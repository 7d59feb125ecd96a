//! City service models

pub mod city;
pub mod user;

// Re-export for convenience
pub use city::{City, DefaultCity, NewCity};
pub use user::{Credentials, User};
