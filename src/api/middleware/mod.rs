//! API middleware.

mod auth;
mod request_log;

pub use auth::api_key_middleware;
pub use request_log::request_log_middleware;
