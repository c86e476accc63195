//! OpenAPI documentation definition.

use utoipa::OpenApi;

use super::handlers::user_handler;
use crate::domain::UserResponse;

/// API documentation root
#[derive(OpenApi)]
#[openapi(
    paths(
        user_handler::create_user,
        user_handler::list_users,
        user_handler::delete_user,
    ),
    components(schemas(
        user_handler::CreateUserRequest,
        user_handler::UserListResponse,
        UserResponse,
    )),
    tags(
        (name = "Users", description = "User account management endpoints")
    )
)]
pub struct ApiDoc;
