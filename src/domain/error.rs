//! Domain Error Types
//!
//! Business rule violations raised by the services. Storage and hashing
//! failures are wrapped so that `?` carries them up to the HTTP layer.

use thiserror::Error;

use crate::auth::AuthError;
use crate::repository::RepositoryError;

/// Result alias used by every service
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-specific errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Registration with an email that is already taken
    #[error("El usuario ya existe")]
    UserAlreadyExists,

    /// Update to an email owned by another account
    #[error("Ese email ya está en uso")]
    EmailInUse,

    /// Publication exists but is paused or deleted
    #[error("La publicación {0} no está disponible")]
    PublicationUnavailable(i32),

    /// Email/password pair does not match any account
    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DomainError {
    /// Create a not-found error with a user-facing message
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
