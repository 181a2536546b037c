//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanListEntry, LoanQuery},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Overdue sweep response
#[derive(Serialize, ToSchema)]
pub struct OverdueSweepResponse {
    /// Number of loans marked overdue
    pub marked: u64,
}

/// List loans with filters
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = PaginatedResponse<LoanListEntry>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanListEntry>>> {
    claims.require_staff()?;

    let (items, total) = state.services.loans.search(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Loan>> {
    claims.require_staff()?;
    let loan = state.services.loans.get(id).await?;
    Ok(Json(loan))
}

/// Return a loan; its copy becomes available again
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan returned", body = Loan),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Loan>> {
    claims.require_staff()?;

    let loan = state.services.loans.return_loan(id).await?;
    Ok(Json(loan))
}

/// Mark borrowed loans past their due date as overdue
#[utoipa::path(
    post,
    path = "/loans/overdue-sweep",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep finished", body = OverdueSweepResponse),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn overdue_sweep(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<OverdueSweepResponse>> {
    claims.require_staff()?;

    let marked = state.services.loans.overdue_sweep().await?;
    Ok(Json(OverdueSweepResponse { marked }))
}
