//! Publisher management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::publisher::{
        CreatePublisher, Publisher, PublisherListEntry, PublisherQuery, UpdatePublisher,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List publishers with search and pagination
#[utoipa::path(
    get,
    path = "/publishers",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(PublisherQuery),
    responses(
        (status = 200, description = "List of publishers", body = PaginatedResponse<PublisherListEntry>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_publishers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PublisherQuery>,
) -> AppResult<Json<PaginatedResponse<PublisherListEntry>>> {
    claims.require_staff()?;

    let (items, total) = state.services.catalog.search_publishers(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get publisher by ID
#[utoipa::path(
    get,
    path = "/publishers/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Publisher ID")),
    responses(
        (status = 200, description = "Publisher details", body = Publisher),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn get_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Publisher>> {
    claims.require_staff()?;
    let publisher = state.services.catalog.get_publisher(id).await?;
    Ok(Json(publisher))
}

/// Create a new publisher
#[utoipa::path(
    post,
    path = "/publishers",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreatePublisher,
    responses(
        (status = 201, description = "Publisher created", body = Publisher),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreatePublisher>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    claims.require_staff()?;
    let publisher = state.services.catalog.create_publisher(request).await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

/// Update a publisher
#[utoipa::path(
    put,
    path = "/publishers/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Publisher ID")),
    request_body = UpdatePublisher,
    responses(
        (status = 200, description = "Publisher updated", body = Publisher),
        (status = 404, description = "Publisher not found")
    )
)]
pub async fn update_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdatePublisher>,
) -> AppResult<Json<Publisher>> {
    claims.require_staff()?;
    let publisher = state.services.catalog.update_publisher(id, request).await?;
    Ok(Json(publisher))
}

/// Delete a publisher
#[utoipa::path(
    delete,
    path = "/publishers/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Publisher ID")),
    responses(
        (status = 204, description = "Publisher deleted"),
        (status = 404, description = "Publisher not found"),
        (status = 409, description = "Publisher still has books")
    )
)]
pub async fn delete_publisher(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.catalog.delete_publisher(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
