//! User domain entity and validation rules.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};

use super::error::{DomainError, DomainResult};
use super::password::Password;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

/// User aggregate root.
///
/// Fields are private: every read goes through an accessor and every
/// mutation through a named method, which is the single enforcement point
/// for the entity invariants (validated state, `updated_at >= created_at`,
/// soft delete never cleared).
#[derive(Clone)]
pub struct User {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

// Don't expose the password hash in debug output
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

impl User {
    /// Create a new user with validation.
    ///
    /// Runs the email, username, and password validators in order,
    /// short-circuiting on the first failure, then hashes the password
    /// and stamps `created_at = updated_at = now`.
    pub fn new(email: &str, username: &str, password: &str) -> DomainResult<Self> {
        validate_email(email)?;
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = Password::hash(password)?.into_string();

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            username: username.to_owned(),
            password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Reconstruct a user from persisted state.
    ///
    /// Skips validation: rows are trusted-at-rest because invalid states
    /// are rejected at construction time, never at persistence time.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: Uuid,
        email: String,
        username: String,
        password_hash: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            email,
            username,
            password_hash,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Replace the email address after re-validating it.
    pub fn update_email(&mut self, email: &str) -> DomainResult<()> {
        validate_email(email)?;
        self.email = email.to_owned();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the username after re-validating it.
    pub fn update_username(&mut self, username: &str) -> DomainResult<()> {
        validate_username(username)?;
        self.username = username.to_owned();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Soft delete the user.
    ///
    /// Stamps one instant into both `deleted_at` and `updated_at`.
    /// There is no inverse operation; `deleted_at` is never cleared.
    pub fn delete(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Check if user is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Verify a plaintext password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        Password::from_hash(self.password_hash.clone()).verify(password)
    }
}

/// Validate email shape against a standard address pattern.
pub fn validate_email(email: &str) -> DomainResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(DomainError::InvalidEmail);
    }
    Ok(())
}

/// Validate username length bounds.
pub fn validate_username(username: &str) -> DomainResult<()> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(DomainError::UsernameTooShort);
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(DomainError::UsernameTooLong);
    }
    Ok(())
}

/// Validate password policy: minimum length plus at least one letter and
/// one digit. Single scan, short-circuits once both classes are found.
pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::PasswordTooShort);
    }

    let mut has_letter = false;
    let mut has_digit = false;
    for ch in password.chars() {
        if ch.is_ascii_alphabetic() {
            has_letter = true;
        }
        if ch.is_ascii_digit() {
            has_digit = true;
        }
        if has_letter && has_digit {
            break;
        }
    }
    if !has_letter || !has_digit {
        return Err(DomainError::InvalidPasswordFormat);
    }
    Ok(())
}

/// User response (safe to return to client — never carries the hash)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User display name
    #[schema(example = "alice123")]
    pub username: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
