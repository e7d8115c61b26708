//! Shared helpers for the backend integration tests.

pub mod postgis;

pub use postgis::{TestDatabase, test_database};
