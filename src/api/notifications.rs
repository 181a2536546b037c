//! Mail queue endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::notification::{MailNotification, NotificationQuery},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Flush response
#[derive(Serialize, ToSchema)]
pub struct FlushResponse {
    /// Number of mails delivered
    pub sent: u64,
}

/// List queued notification mails
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(NotificationQuery),
    responses(
        (status = 200, description = "Mail queue", body = PaginatedResponse<MailNotification>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<PaginatedResponse<MailNotification>>> {
    claims.require_staff()?;

    let (items, total) = state.services.notifications.search(&query).await?;
    Ok(Json(PaginatedResponse::new(
        items,
        total,
        query.page,
        query.per_page,
    )))
}

/// Deliver pending mails now instead of waiting for the flush interval
#[utoipa::path(
    post,
    path = "/notifications/flush",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Queue flushed", body = FlushResponse),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn flush(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<FlushResponse>> {
    claims.require_staff()?;

    let sent = state.services.notifications.flush_pending().await?;
    Ok(Json(FlushResponse { sent }))
}
