//! Credentials and bearer tokens
//!
//! Password hashing (Argon2id) and HS256 token issue/verify. The HTTP gate
//! that uses them lives in `api::middleware`.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

/// Authenticated caller attached to the request by the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
}

/// Errors raised while issuing or checking credentials
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Bad signature, malformed token or expired
    #[error("Token invalido o expirado")]
    InvalidToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
