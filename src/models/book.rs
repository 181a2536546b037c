//! Book model, list/export rows and query types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::author::Author;
use super::book_item::BookItem;
use super::category::Category;
use super::enums::{ItemStatus, LoanStatus};
use super::publisher::Publisher;

/// Full book model (DB + API)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub isbn13: Option<String>,
    pub publisher_id: Option<i32>,
    pub publish_year: Option<i32>,
    pub pages: Option<i32>,
    pub language_code: Option<String>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // Relations (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub authors: Vec<Author>,
    #[sqlx(skip)]
    #[serde(default)]
    pub categories: Vec<Category>,
    #[sqlx(skip)]
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[sqlx(skip)]
    #[serde(default)]
    pub items: Vec<BookItem>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookListEntry {
    pub id: i32,
    pub title: String,
    pub publisher_name: Option<String>,
    pub publish_year: Option<i32>,
    pub pages: Option<i32>,
    pub isbn13: Option<String>,
    pub language_code: Option<String>,
    pub items_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 10, max = 17, message = "Invalid ISBN-13"))]
    pub isbn13: Option<String>,
    pub publisher_id: Option<i32>,
    pub publish_year: Option<i32>,
    pub pages: Option<i32>,
    pub language_code: Option<String>,
    pub cover_url: Option<String>,
    /// Author IDs in display order
    #[serde(default)]
    pub author_ids: Vec<i32>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
}

/// Update book request. Relation lists replace the existing ones when set.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 10, max = 17, message = "Invalid ISBN-13"))]
    pub isbn13: Option<String>,
    pub publisher_id: Option<i32>,
    pub publish_year: Option<i32>,
    pub pages: Option<i32>,
    pub language_code: Option<String>,
    pub cover_url: Option<String>,
    pub author_ids: Option<Vec<i32>>,
    pub category_ids: Option<Vec<i32>>,
}

/// Book query parameters for the list endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Search in title, description and ISBN
    pub q: Option<String>,
    pub publisher_id: Option<i32>,
    pub category_id: Option<i32>,
    pub author_id: Option<i32>,
    pub publish_year: Option<i32>,
    pub language: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Filter for the book export (superset of the list filters)
#[derive(Debug, Default, Clone)]
pub struct BookExportFilter {
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    pub publish_year_from: Option<i32>,
    pub publish_year_to: Option<i32>,
    pub language: Option<String>,
    pub item_status: Option<ItemStatus>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub sort: Option<String>,
}

/// One book with copy counts and engagement metrics, as rendered in exports
#[derive(Debug, Clone, FromRow)]
pub struct BookExportRow {
    pub id: i32,
    pub title: String,
    pub isbn13: Option<String>,
    pub publisher_name: Option<String>,
    pub publisher_founded_year: Option<i32>,
    pub publish_year: Option<i32>,
    pub language_code: Option<String>,
    pub cover_url: Option<String>,
    pub authors: String,
    pub categories: String,
    pub total_items: i64,
    pub available_items: i64,
    pub reserved_items: i64,
    pub loaned_items: i64,
    pub lost_items: i64,
    pub damaged_items: i64,
    pub total_loans: i64,
    pub last_loan_date: Option<NaiveDate>,
    pub avg_rating: Option<f64>,
    pub total_favorites: i64,
    pub created_at: DateTime<Utc>,
}

/// One physical copy with its open loan, for the export Items sheet
#[derive(Debug, Clone, FromRow)]
pub struct ItemExportRow {
    pub book_id: i32,
    pub title: String,
    pub barcode: String,
    pub status: ItemStatus,
    pub location_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub loan_status: Option<LoanStatus>,
}
