//! Password value object - Domain layer credential handling.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::error::{DomainError, DomainResult};

/// Password hash value object.
///
/// Wraps a one-way, salted argon2 hash. The plaintext is consumed by
/// [`Password::hash`] and never retained.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose the hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a plaintext password with a per-hash random salt.
    ///
    /// Shape validation (length, character classes) is the job of
    /// [`crate::domain::user::validate_password`]; this only performs the
    /// one-way transform.
    pub fn hash(plain_text: &str) -> DomainResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::Hashing(e.to_string()))?;
        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Create a Password from an existing hash (from storage).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plaintext candidate against this hash.
    ///
    /// Delegates to argon2's own verify step; a malformed stored hash
    /// verifies as false rather than erroring.
    pub fn verify(&self, plain_text: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Self::argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok()
    }

    /// Get Argon2 instance with default config (fixed cost factor).
    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Password {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let plain = "pass1234";
        let password = Password::hash(plain).unwrap();

        assert!(password.verify(plain));
        assert!(!password.verify("wrong1234"));
    }

    #[test]
    fn test_password_from_hash() {
        let plain = "secret99";
        let password = Password::hash(plain).unwrap();
        let hash = password.as_str().to_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify(plain));
    }

    #[test]
    fn test_same_password_different_salts() {
        let plain = "samepass1";
        let pass1 = Password::hash(plain).unwrap();
        let pass2 = Password::hash(plain).unwrap();

        // Different salts produce different hashes
        assert_ne!(pass1.as_str(), pass2.as_str());
        // But both verify correctly
        assert!(pass1.verify(plain));
        assert!(pass2.verify(plain));
    }

    #[test]
    fn test_malformed_stored_hash_fails_verification() {
        let password = Password::from_hash("not-a-valid-hash".to_string());
        assert!(!password.verify("whatever1"));
    }
}
