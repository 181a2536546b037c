//! Borrow request workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrow_request::{
        BorrowRequest, BorrowRequestListEntry, BorrowRequestQuery, CreateBorrowRequest,
        RejectBorrowRequest,
    },
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Approval response: the request plus the loans it spawned
#[derive(Serialize, ToSchema)]
pub struct ApprovalResponse {
    pub request: BorrowRequest,
    /// Number of loans created, one per allocated copy
    pub loans_created: usize,
}

/// Bulk sweep response
#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of requests marked expired
    pub expired: u64,
}

/// Submit a borrow request
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Request submitted", body = BorrowRequest),
        (status = 400, description = "Invalid dates or items"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn submit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let created = state
        .services
        .borrows
        .submit(claims.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List borrow requests (staff)
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(BorrowRequestQuery),
    responses(
        (status = 200, description = "List of requests", body = PaginatedResponse<BorrowRequestListEntry>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowRequestQuery>,
) -> AppResult<Json<PaginatedResponse<BorrowRequestListEntry>>> {
    claims.require_staff()?;

    let (items, total) = state.services.borrows.search(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// List the caller's own borrow requests
#[utoipa::path(
    get,
    path = "/borrows/mine",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(BorrowRequestQuery),
    responses(
        (status = 200, description = "The caller's requests", body = PaginatedResponse<BorrowRequestListEntry>)
    )
)]
pub async fn list_mine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(mut query): Query<BorrowRequestQuery>,
) -> AppResult<Json<PaginatedResponse<BorrowRequestListEntry>>> {
    query.user_id = Some(claims.user_id);

    let (items, total) = state.services.borrows.search(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get a borrow request; members only see their own
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = BorrowRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.borrows.get(id).await?;
    if !claims.is_staff() && request.user_id != claims.user_id {
        return Err(crate::error::AppError::NotFound(format!(
            "Borrow request with id {} not found",
            id
        )));
    }
    Ok(Json(request))
}

/// Approve a pending request, allocating copies and spawning loans
#[utoipa::path(
    post,
    path = "/borrows/{id}/approve",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request approved", body = ApprovalResponse),
        (status = 409, description = "Request is not pending"),
        (status = 422, description = "Not enough available copies")
    )
)]
pub async fn approve(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApprovalResponse>> {
    claims.require_staff()?;

    let outcome = state.services.borrows.approve(id, claims.user_id).await?;
    Ok(Json(ApprovalResponse {
        request: outcome.request,
        loans_created: outcome.loans_created,
    }))
}

/// Reject a pending request with a reason
#[utoipa::path(
    post,
    path = "/borrows/{id}/reject",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = RejectBorrowRequest,
    responses(
        (status = 200, description = "Request rejected", body = BorrowRequest),
        (status = 400, description = "Missing rejection reason"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn reject(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<RejectBorrowRequest>,
) -> AppResult<Json<BorrowRequest>> {
    claims.require_staff()?;

    let rejected = state
        .services
        .borrows
        .reject(id, claims.user_id, &request.reason)
        .await?;
    Ok(Json(rejected))
}

/// Cancel the caller's own pending request
#[utoipa::path(
    post,
    path = "/borrows/{id}/cancel",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = BorrowRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    )
)]
pub async fn cancel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    let cancelled = state.services.borrows.cancel(id, claims.user_id).await?;
    Ok(Json(cancelled))
}

/// Expire one pending request past its end date
#[utoipa::path(
    post,
    path = "/borrows/{id}/expire",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request expired", body = BorrowRequest),
        (status = 409, description = "Request is not pending past its end date")
    )
)]
pub async fn expire(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequest>> {
    claims.require_staff()?;

    let expired = state.services.borrows.expire(id).await?;
    Ok(Json(expired))
}

/// Expire every pending request past its end date
#[utoipa::path(
    post,
    path = "/borrows/expire-sweep",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep finished", body = SweepResponse),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn expire_sweep(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SweepResponse>> {
    claims.require_staff()?;

    let expired = state.services.borrows.expire_sweep().await?;
    Ok(Json(SweepResponse { expired }))
}
