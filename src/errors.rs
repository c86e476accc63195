//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion. Every error carries a
//! stable machine-readable code; internal error text never reaches
//! the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::DomainError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication
    #[error("Authentication required")]
    Unauthorized,

    // Resource errors
    #[error("user not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::NotFound => "USER_NOT_FOUND",
            AppError::Conflict(_) => "USER_ALREADY_EXISTS",
            AppError::Domain(e) => match e {
                DomainError::InvalidEmail => "INVALID_EMAIL",
                DomainError::PasswordTooShort => "PASSWORD_TOO_SHORT",
                DomainError::InvalidPasswordFormat => "INVALID_PASSWORD_FORMAT",
                DomainError::UsernameTooShort => "USERNAME_TOO_SHORT",
                DomainError::UsernameTooLong => "USERNAME_TOO_LONG",
                DomainError::Hashing(_) => "INTERNAL_ERROR",
            },
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Domain(DomainError::Hashing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Domain(_) | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Domain(DomainError::Hashing(msg)) => {
                tracing::error!("Password hashing error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Domain(e) => e.to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Conflict(msg) => format!("{} already exists", msg),

            // Hide details for internal errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_stable_codes() {
        let cases = [
            (DomainError::InvalidEmail, "INVALID_EMAIL"),
            (DomainError::PasswordTooShort, "PASSWORD_TOO_SHORT"),
            (DomainError::InvalidPasswordFormat, "INVALID_PASSWORD_FORMAT"),
            (DomainError::UsernameTooShort, "USERNAME_TOO_SHORT"),
            (DomainError::UsernameTooLong, "USERNAME_TOO_LONG"),
        ];
        for (domain_err, code) in cases {
            let err = AppError::from(domain_err);
            assert_eq!(err.code(), code);
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_conflict_and_not_found_statuses() {
        assert_eq!(AppError::conflict("User").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::conflict("User").code(), "USER_ALREADY_EXISTS");
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NotFound.code(), "USER_NOT_FOUND");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::internal("connection pool exhausted at 10.0.0.3");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.user_message().contains("10.0.0.3"));
    }
}
