//! Course administration domain logic.
//!
//! Pure functions and services with no database dependency. Persistence is
//! reached through the traits in [`store`], implemented by `coursehub_db`.

pub mod certificates;
pub mod error;
pub mod hashing;
pub mod progress;
pub mod roles;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;
