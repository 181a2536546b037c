//! Loan model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::LoanStatus;

/// Loan model from database. One loan ties a request item to one copy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub request_id: i32,
    pub request_item_id: i32,
    pub book_item_id: i32,
    pub approved_from: NaiveDate,
    pub due_date: NaiveDate,
    pub status: LoanStatus,
    pub returned_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Loan list row with book, copy and borrower detail
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanListEntry {
    pub id: i32,
    pub request_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub barcode: String,
    pub user_id: i32,
    pub username: String,
    pub approved_from: NaiveDate,
    pub due_date: NaiveDate,
    pub status: LoanStatus,
    pub returned_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Loan query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
    pub user_id: Option<i32>,
    pub barcode: Option<String>,
    pub due_before: Option<NaiveDate>,
    pub due_after: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
