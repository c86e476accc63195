//! Domain-level errors.
//!
//! These errors represent business rule violations and are independent
//! of infrastructure concerns (HTTP, database).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid email format")]
    InvalidEmail,

    #[error("password must be at least 8 characters")]
    PasswordTooShort,

    #[error("password must contain at least one letter and one number")]
    InvalidPasswordFormat,

    #[error("username must be at least 3 characters")]
    UsernameTooShort,

    #[error("username must be at most 100 characters")]
    UsernameTooLong,

    /// Credential hashing failed (operational, not caller-correctable)
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
