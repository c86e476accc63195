//! Application settings loaded from environment variables.

use std::env;

use super::constants::DEFAULT_DATABASE_URL;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    api_key: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if API_KEY is not set in a release build (security
    /// requirement: refuse to start rather than fail open per request).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_key = env::var("API_KEY").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                // Development mode: use default but warn
                tracing::warn!("API_KEY not set, using insecure default for development");
                "dev-api-key".to_string()
            } else {
                panic!("API_KEY environment variable must be set in production");
            }
        });

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            api_key,
        }
    }

    /// Get the shared API key for request authorization.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}
