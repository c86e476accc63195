//! User account handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::{delete, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::config::DEFAULT_LIST_LIMIT;
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};

/// User creation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User display name (3-100 characters)
    #[schema(example = "alice123")]
    pub username: String,
    /// User password (min 8 characters, at least one letter and one digit)
    #[schema(example = "pass1234", min_length = 8)]
    pub password: String,
}

/// List query parameters
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Page size
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u64,
    /// Number of users to skip
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIST_LIMIT
}

/// User list response
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// Users on this page, newest first
    pub users: Vec<UserResponse>,
    /// Total number of active users, independent of paging
    pub total: u64,
}

/// Create user management routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", delete(delete_user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let Json(payload) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;

    let user = state
        .user_service
        .create_user(payload.email, payload.username, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// List users, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "User list", body = UserListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Missing or invalid API key")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> AppResult<Json<UserListResponse>> {
    let Query(query) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    query
        .validate()
        .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

    let (users, total) = state
        .user_service
        .list_users(query.limit, query.offset)
        .await?;

    Ok(Json(UserListResponse {
        users: users.iter().map(UserResponse::from).collect(),
        total,
    }))
}

/// Soft delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed id"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id.map_err(|_| AppError::bad_request("invalid user id"))?;

    state.user_service.delete_user(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Format validation errors into a user-friendly string
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query: ListUsersQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 0);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_list_query_limit_bounds() {
        let query: ListUsersQuery = serde_json::from_str(r#"{"limit":0}"#).unwrap();
        assert!(query.validate().is_err());

        let query: ListUsersQuery = serde_json::from_str(r#"{"limit":101}"#).unwrap();
        assert!(query.validate().is_err());

        let query: ListUsersQuery = serde_json::from_str(r#"{"limit":100,"offset":40}"#).unwrap();
        assert!(query.validate().is_ok());
    }
}
