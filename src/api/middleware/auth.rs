//! Shared-secret API key middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::API_KEY_HEADER;
use crate::errors::AppError;

/// API key authorization middleware.
///
/// Compares the `x-api-key` header against the configured shared secret.
/// Applied to the `/api/v1` routes only; health stays open.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if provided != state.config.api_key() {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
