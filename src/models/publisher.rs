//! Publisher model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Publisher model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub founded_year: Option<i32>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Publisher list row with book count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PublisherListEntry {
    pub id: i32,
    pub name: String,
    pub founded_year: Option<i32>,
    pub website: Option<String>,
    pub books_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Create publisher request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePublisher {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub founded_year: Option<i32>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
}

/// Update publisher request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePublisher {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub founded_year: Option<i32>,
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
}

/// Publisher query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PublisherQuery {
    /// Search in name and description
    pub q: Option<String>,
    pub founded_year: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
