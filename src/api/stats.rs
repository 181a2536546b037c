//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Label/value pair used by breakdowns
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

/// Entity totals of the overview
#[derive(Serialize, ToSchema)]
pub struct OverviewTotals {
    pub books: i64,
    pub authors: i64,
    pub publishers: i64,
    pub categories: i64,
    pub book_items: i64,
    /// Users with an active account
    pub active_users: i64,
}

/// Counts from the last 30 days
#[derive(Serialize, ToSchema)]
pub struct RecentActivityCounts {
    pub new_books: i64,
    pub new_requests: i64,
    pub new_users: i64,
}

/// One of the most borrowed books
#[derive(Serialize, ToSchema)]
pub struct PopularBook {
    pub id: i32,
    pub title: String,
    /// Author names, comma separated
    pub authors: String,
    pub total_loans: i64,
}

/// Library-wide statistics overview
#[derive(Serialize, ToSchema)]
pub struct StatsOverview {
    pub totals: OverviewTotals,
    pub items_by_status: Vec<StatEntry>,
    pub requests_by_status: Vec<StatEntry>,
    pub loans_by_status: Vec<StatEntry>,
    pub last_30_days: RecentActivityCounts,
    pub popular_books: Vec<PopularBook>,
}

/// One line of the recent-activity feed
#[derive(Serialize, ToSchema)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub details: String,
    /// Humanized age, e.g. "5m ago"
    pub ago: String,
}

/// Activity feed response
#[derive(Serialize, ToSchema)]
pub struct ActivityResponse {
    pub activities: Vec<ActivityEntry>,
}

/// Scope of the book statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Month,
    Year,
}

/// Query parameters for book statistics
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookStatsQuery {
    /// 'month' (default) or 'year'
    pub period: Option<PeriodType>,
    /// Defaults to the current year
    pub year: Option<i32>,
    /// 1-12; defaults to the current month (month scope only)
    pub month: Option<u32>,
}

/// Resolved period of a book statistics response
#[derive(Serialize, ToSchema)]
pub struct PeriodInfo {
    #[serde(rename = "type")]
    pub kind: PeriodType,
    pub year: i32,
    pub month: Option<u32>,
    pub start: NaiveDate,
    pub end_exclusive: NaiveDate,
}

/// Books per category (overall)
#[derive(Serialize, ToSchema)]
pub struct CategoryCount {
    pub id: i32,
    pub name: String,
    pub total_books: i64,
}

/// Loans per category within the period
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryLoanCount {
    pub category_id: i32,
    pub category_name: String,
    pub total: i64,
}

/// Loans per book within the period
#[derive(Serialize, ToSchema)]
pub struct BookLoanCount {
    pub book_id: i32,
    pub book_title: String,
    pub total: i64,
}

/// Loans per author/publisher within the period
#[derive(Serialize, ToSchema)]
pub struct NamedLoanCount {
    pub id: i32,
    pub name: String,
    pub total: i64,
}

/// Zero-filled loan counts over the period
#[derive(Serialize, ToSchema)]
pub struct TimeSeries {
    /// "by_day" for month scope, "by_month" for year scope
    #[serde(rename = "type")]
    pub kind: String,
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

/// Book statistics response
#[derive(Serialize, ToSchema)]
pub struct BookStatsResponse {
    pub period: PeriodInfo,
    pub category_book_counts: Vec<CategoryCount>,
    pub loans_by_category: Vec<CategoryLoanCount>,
    pub top_category: Option<CategoryLoanCount>,
    pub top_books: Vec<BookLoanCount>,
    pub time_series: TimeSeries,
    pub top_authors: Vec<NamedLoanCount>,
    pub top_publishers: Vec<NamedLoanCount>,
    pub status_distribution: Vec<StatEntry>,
    pub language_distribution: Vec<StatEntry>,
}

/// Get the library statistics overview
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Statistics overview", body = StatsOverview),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsOverview>> {
    claims.require_staff()?;

    let stats = state.services.stats.overview().await?;
    Ok(Json(stats))
}

/// Get the recent activity feed (requests, books, loans)
#[utoipa::path(
    get,
    path = "/stats/activity",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Recent activity", body = ActivityResponse),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn get_activity(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ActivityResponse>> {
    claims.require_staff()?;

    let activities = state.services.stats.activity(10).await?;
    Ok(Json(ActivityResponse { activities }))
}

/// Get book statistics for a month or year
#[utoipa::path(
    get,
    path = "/stats/books",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(BookStatsQuery),
    responses(
        (status = 200, description = "Book statistics", body = BookStatsResponse),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn get_book_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookStatsQuery>,
) -> AppResult<Json<BookStatsResponse>> {
    claims.require_staff()?;

    let stats = state
        .services
        .stats
        .book_stats(
            query.period.unwrap_or(PeriodType::Month),
            query.year,
            query.month,
        )
        .await?;
    Ok(Json(stats))
}
