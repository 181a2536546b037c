//! Borrow request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::RequestStatus;

/// Borrow request from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: i32,
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
    pub status: RequestStatus,
    pub admin_id: Option<i32>,
    pub decision_at: Option<DateTime<Utc>>,
    pub rejection_reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // Items (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub items: Vec<BorrowRequestItem>,
}

/// One requested book with its desired quantity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequestItem {
    pub id: i32,
    pub request_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub quantity: i32,
}

/// Borrow request list row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequestListEntry {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
    pub status: RequestStatus,
    pub items_count: i64,
    pub admin_id: Option<i32>,
    pub admin_username: Option<String>,
    pub decision_at: Option<DateTime<Utc>>,
    pub rejection_reason: String,
    pub created_at: DateTime<Utc>,
}

/// One line of a new borrow request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBorrowRequestItem {
    pub book_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Submit borrow request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBorrowRequest {
    pub requested_from: NaiveDate,
    pub requested_to: NaiveDate,
    #[validate(length(min = 1, message = "A request needs at least one item"), nested)]
    pub items: Vec<CreateBorrowRequestItem>,
}

/// Reject request payload; the reason is mandatory
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RejectBorrowRequest {
    #[validate(length(min = 1, message = "A rejection reason is required"))]
    pub reason: String,
}

/// Borrow request query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BorrowRequestQuery {
    pub status: Option<RequestStatus>,
    pub user_id: Option<i32>,
    /// true: only pending requests past their end date; false: everything else
    pub overdue: Option<bool>,
    pub requested_from: Option<NaiveDate>,
    pub requested_to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
