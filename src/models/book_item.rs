//! Book item (physical copy) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::ItemStatus;

/// Physical copy of a book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookItem {
    pub id: i32,
    pub book_id: i32,
    pub barcode: String,
    pub status: ItemStatus,
    pub location_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Copy list row with its book title
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookItemListEntry {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub barcode: String,
    pub status: ItemStatus,
    pub location_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create copy request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookItem {
    #[validate(length(min = 1, message = "Barcode must not be empty"))]
    pub barcode: String,
    pub status: Option<ItemStatus>,
    pub location_code: Option<String>,
}

/// Update copy request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookItem {
    #[validate(length(min = 1, message = "Barcode must not be empty"))]
    pub barcode: Option<String>,
    pub status: Option<ItemStatus>,
    pub location_code: Option<String>,
}

/// Copy query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookItemQuery {
    pub book_id: Option<i32>,
    pub status: Option<ItemStatus>,
    pub location_code: Option<String>,
    pub barcode: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
