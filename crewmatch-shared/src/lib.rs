//! # Crewmatch Shared Library
//!
//! This crate contains the types and business logic shared by the Crewmatch
//! API server: database models, authentication primitives, and the database
//! layer.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their query operations
//! - `auth`: Password hashing, JWT tokens, and the auth middleware context
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Crewmatch shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
