//! # Crewmatch API Server Library
//!
//! Backend for the Crewmatch volunteer/project matching platform: users
//! create posts, others apply, owners decide on applicants, and skill
//! overlap drives recommendations in both directions.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
