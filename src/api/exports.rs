//! Spreadsheet export endpoint

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{book::BookExportFilter, enums::ItemStatus},
};

use super::AuthenticatedUser;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Query parameters for the book export
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ExportBooksQuery {
    /// Search in title, description and ISBN
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub author_id: Option<i32>,
    pub publisher_id: Option<i32>,
    pub publish_year_from: Option<i32>,
    pub publish_year_to: Option<i32>,
    pub language: Option<String>,
    /// Keep books having at least one copy in this status
    pub item_status: Option<ItemStatus>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    /// title (default), -title, created_at, -created_at, publish_year, -publish_year
    pub sort: Option<String>,
    /// Comma-separated column keys; defaults to the full column set
    pub columns: Option<String>,
    /// Add an Items sheet with one row per copy
    pub include_items: Option<bool>,
    /// Download name without extension; defaults to books_export_<timestamp>
    pub filename: Option<String>,
}

impl ExportBooksQuery {
    fn filter(&self) -> BookExportFilter {
        BookExportFilter {
            q: self.q.clone(),
            category_id: self.category_id,
            author_id: self.author_id,
            publisher_id: self.publisher_id,
            publish_year_from: self.publish_year_from,
            publish_year_to: self.publish_year_to,
            language: self.language.clone(),
            item_status: self.item_status,
            created_from: self.created_from,
            created_to: self.created_to,
            sort: self.sort.clone(),
        }
    }

    fn columns(&self) -> Option<Vec<String>> {
        self.columns.as_ref().map(|raw| {
            raw.split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        })
    }
}

/// Export the filtered book list as an xlsx attachment
#[utoipa::path(
    get,
    path = "/export/books",
    tag = "exports",
    security(("bearer_auth" = [])),
    params(ExportBooksQuery),
    responses(
        (status = 200, description = "xlsx workbook attachment"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn export_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ExportBooksQuery>,
) -> AppResult<Response> {
    claims.require_staff()?;

    let export = state
        .services
        .exports
        .export_books(
            &query.filter(),
            query.columns(),
            query.include_items.unwrap_or(false),
            query.filename.clone(),
        )
        .await?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.xlsx\"", export.filename),
        ),
    ];

    Ok((headers, export.bytes).into_response())
}
