/// Authentication utilities for Crewmatch
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Bearer-token extraction and the authenticated principal
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing with separate access/refresh lifetimes
/// - **Constant-time Comparison**: Password verification is constant-time

pub mod jwt;
pub mod middleware;
pub mod password;
