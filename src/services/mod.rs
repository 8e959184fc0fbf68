//! Service layer: validation, existence checks, and store calls for each
//! entity, plus the credential/token primitives they share.

pub mod auth_service;
pub mod password;
pub mod posts_service;
pub mod token;
pub mod users_service;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user with ID {0} not found")]
    UserNotFound(i64),
    #[error("post with ID {0} not found")]
    PostNotFound(i64),
    #[error("user with email `{email}` or username `{username}` already exists")]
    UserAlreadyExists { email: String, username: String },
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("{field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },
    #[error("a post owner is required")]
    MissingOwner,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Return true if a SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
