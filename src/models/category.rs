//! Category model and related types.
//!
//! Categories form a tree via `parent_id`; the slug is unique.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Category model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

/// Category list row with book and child counts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CategoryListEntry {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
    pub parent_name: Option<String>,
    pub books_count: i64,
    pub children_count: i64,
}

/// Create category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "Slug must not be empty"))]
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

/// Update category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Slug must not be empty"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

/// Category query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CategoryQuery {
    /// Search in name, description and slug
    pub q: Option<String>,
    /// Restrict to children of this category
    pub parent_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
