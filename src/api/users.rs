//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{BulkUserIds, CreateUser, UpdateUser, User, UserQuery},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Outcome of a bulk activate/deactivate
#[derive(Serialize, ToSchema)]
pub struct BulkActionResponse {
    /// Number of users updated
    pub updated: u64,
    /// Number skipped (the caller's own account on deactivation)
    pub skipped: u64,
}

/// List users with search and pagination
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<User>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    claims.require_admin()?;

    let (items, total) = state.services.users.search_users(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;
    let user = state.services.users.get_user(id).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;
    let user = state.services.users.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;
    let user = state.services.users.update_user(id, request).await?;
    Ok(Json(user))
}

/// Activate users in bulk
#[utoipa::path(
    post,
    path = "/users/activate",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = BulkUserIds,
    responses(
        (status = 200, description = "Users activated", body = BulkActionResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn activate_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BulkUserIds>,
) -> AppResult<Json<BulkActionResponse>> {
    claims.require_admin()?;

    let updated = state.services.users.activate_users(request).await?;
    Ok(Json(BulkActionResponse {
        updated,
        skipped: 0,
    }))
}

/// Deactivate users in bulk; the caller's own account is skipped
#[utoipa::path(
    post,
    path = "/users/deactivate",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = BulkUserIds,
    responses(
        (status = 200, description = "Users deactivated", body = BulkActionResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn deactivate_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BulkUserIds>,
) -> AppResult<Json<BulkActionResponse>> {
    claims.require_admin()?;

    let (updated, skipped) = state
        .services
        .users
        .deactivate_users(request, claims.user_id)
        .await?;
    Ok(Json(BulkActionResponse { updated, skipped }))
}
