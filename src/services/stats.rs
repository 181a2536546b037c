//! Statistics service: overview counts, activity feed, period book stats

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use sqlx::Row;

use crate::{
    api::stats::{
        ActivityEntry, BookLoanCount, BookStatsResponse, CategoryCount, CategoryLoanCount,
        NamedLoanCount, OverviewTotals, PeriodInfo, PeriodType, PopularBook,
        RecentActivityCounts, StatEntry, StatsOverview, TimeSeries,
    },
    error::AppResult,
    repository::Repository,
};

/// Humanize a past timestamp ("5s ago", "3m ago", "2h ago", "4d ago")
pub fn format_relative(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        return format!("{}s ago", seconds);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

/// Resolve a period scope to [start, end) dates. The month is clamped to 1-12.
pub fn period_bounds(period: PeriodType, year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    match period {
        PeriodType::Year => {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default();
            let end = NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap_or_default();
            (start, end)
        }
        PeriodType::Month => {
            let month = month.clamp(1, 12);
            let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
            let end = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap_or_default()
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap_or_default()
            };
            (start, end)
        }
    }
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn status_counts(&self, query: &str) -> AppResult<Vec<StatEntry>> {
        let pool = &self.repository.pool;
        let entries = sqlx::query(query)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|row| StatEntry {
                label: row.get("label"),
                value: row.get("value"),
            })
            .collect();
        Ok(entries)
    }

    /// Library-wide overview: totals, per-status breakdowns, 30-day
    /// activity and the most borrowed books.
    pub async fn overview(&self) -> AppResult<StatsOverview> {
        let pool = &self.repository.pool;

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await?;
        let authors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(pool)
            .await?;
        let publishers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM publishers")
            .fetch_one(pool)
            .await?;
        let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(pool)
            .await?;
        let book_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_items")
            .fetch_one(pool)
            .await?;
        let active_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = TRUE")
                .fetch_one(pool)
                .await?;

        let items_by_status = self
            .status_counts(
                "SELECT status AS label, COUNT(*) AS value FROM book_items GROUP BY status ORDER BY value DESC",
            )
            .await?;
        let requests_by_status = self
            .status_counts(
                "SELECT status AS label, COUNT(*) AS value FROM borrow_requests GROUP BY status ORDER BY value DESC",
            )
            .await?;
        let loans_by_status = self
            .status_counts(
                "SELECT status AS label, COUNT(*) AS value FROM loans GROUP BY status ORDER BY value DESC",
            )
            .await?;

        let thirty_days_ago = Utc::now() - Duration::days(30);
        let new_books_30d: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE created_at >= $1")
                .bind(thirty_days_ago)
                .fetch_one(pool)
                .await?;
        let new_requests_30d: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_requests WHERE created_at >= $1")
                .bind(thirty_days_ago)
                .fetch_one(pool)
                .await?;
        let new_users_30d: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE date_joined >= $1")
                .bind(thirty_days_ago)
                .fetch_one(pool)
                .await?;

        let popular_books = sqlx::query(
            r#"
            SELECT b.id, b.title,
                   COALESCE((SELECT string_agg(a.name, ', ' ORDER BY ba.author_order, a.id)
                             FROM book_authors ba JOIN authors a ON a.id = ba.author_id
                             WHERE ba.book_id = b.id), '') AS authors,
                   t.total
            FROM books b
            JOIN (
                SELECT ri.book_id, COUNT(*) AS total
                FROM loans l
                JOIN borrow_request_items ri ON ri.id = l.request_item_id
                GROUP BY ri.book_id
            ) t ON t.book_id = b.id
            ORDER BY t.total DESC, b.title
            LIMIT 5
            "#,
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| PopularBook {
            id: row.get("id"),
            title: row.get("title"),
            authors: row.get("authors"),
            total_loans: row.get("total"),
        })
        .collect();

        Ok(StatsOverview {
            totals: OverviewTotals {
                books,
                authors,
                publishers,
                categories,
                book_items,
                active_users,
            },
            items_by_status,
            requests_by_status,
            loans_by_status,
            last_30_days: RecentActivityCounts {
                new_books: new_books_30d,
                new_requests: new_requests_30d,
                new_users: new_users_30d,
            },
            popular_books,
        })
    }

    /// Recent activity across requests, books and loans, newest first,
    /// capped at `limit`.
    pub async fn activity(&self, limit: usize) -> AppResult<Vec<ActivityEntry>> {
        let pool = &self.repository.pool;
        let now = Utc::now();
        let mut activities: Vec<ActivityEntry> = Vec::new();

        let request_rows = sqlx::query(
            r#"
            SELECT r.id, r.created_at, r.status, u.username,
                   (SELECT COUNT(*) FROM borrow_request_items ri
                    WHERE ri.request_id = r.id) AS items_count
            FROM borrow_requests r
            JOIN users u ON u.id = r.user_id
            ORDER BY r.created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(pool)
        .await?;
        for row in request_rows {
            let created_at: DateTime<Utc> = row.get("created_at");
            let id: i32 = row.get("id");
            let username: String = row.get("username");
            let status: String = row.get("status");
            let items_count: i64 = row.get("items_count");
            activities.push(ActivityEntry {
                timestamp: created_at,
                message: format!("Borrow request #{} by {}", id, username),
                details: format!("{} item(s) • Status: {}", items_count, status),
                ago: format_relative(now, created_at),
            });
        }

        let book_rows = sqlx::query(
            r#"
            SELECT b.title, b.publish_year, b.created_at, p.name AS publisher_name
            FROM books b
            LEFT JOIN publishers p ON p.id = b.publisher_id
            ORDER BY b.created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(pool)
        .await?;
        for row in book_rows {
            let created_at: DateTime<Utc> = row.get("created_at");
            let title: String = row.get("title");
            let publisher: Option<String> = row.get("publisher_name");
            let year: Option<i32> = row.get("publish_year");
            activities.push(ActivityEntry {
                timestamp: created_at,
                message: format!("New book: {}", title),
                details: format!(
                    "Publisher: {} • Year: {}",
                    publisher.unwrap_or_else(|| "-".to_string()),
                    year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
                ),
                ago: format_relative(now, created_at),
            });
        }

        let loan_rows = sqlx::query(
            r#"
            SELECT l.id, l.status, l.due_date, l.created_at, bi.barcode
            FROM loans l
            JOIN book_items bi ON bi.id = l.book_item_id
            ORDER BY l.created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(pool)
        .await?;
        for row in loan_rows {
            let created_at: DateTime<Utc> = row.get("created_at");
            let id: i32 = row.get("id");
            let status: String = row.get("status");
            let barcode: String = row.get("barcode");
            let due_date: NaiveDate = row.get("due_date");
            activities.push(ActivityEntry {
                timestamp: created_at,
                message: format!("Loan #{} {}", id, status),
                details: format!("Item: {} • Due: {}", barcode, due_date),
                ago: format_relative(now, created_at),
            });
        }

        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        activities.truncate(limit);
        Ok(activities)
    }

    /// Book statistics for a month or year scope: category counts, top
    /// books/authors/publishers by loans, a zero-filled loan time series
    /// and status/language distributions.
    pub async fn book_stats(
        &self,
        period: PeriodType,
        year: Option<i32>,
        month: Option<u32>,
    ) -> AppResult<BookStatsResponse> {
        let pool = &self.repository.pool;
        let now = Utc::now();

        let year = year.unwrap_or_else(|| now.year());
        let month = month.unwrap_or_else(|| now.month()).clamp(1, 12);
        let (start, end) = period_bounds(period, year, month);

        // Books per category (overall, not scoped to the period)
        let category_book_counts = sqlx::query(
            r#"
            SELECT c.id, c.name,
                   (SELECT COUNT(*) FROM book_categories bc
                    WHERE bc.category_id = c.id) AS total_books
            FROM categories c
            ORDER BY total_books DESC, c.name
            "#,
        )
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| CategoryCount {
            id: row.get("id"),
            name: row.get("name"),
            total_books: row.get("total_books"),
        })
        .collect::<Vec<_>>();

        // Loans by category in the period
        let loans_by_category = sqlx::query(
            r#"
            SELECT c.id AS category_id, c.name AS category_name, COUNT(*) AS total
            FROM loans l
            JOIN borrow_request_items ri ON ri.id = l.request_item_id
            JOIN book_categories bc ON bc.book_id = ri.book_id
            JOIN categories c ON c.id = bc.category_id
            WHERE l.approved_from >= $1 AND l.approved_from < $2
            GROUP BY c.id, c.name
            ORDER BY total DESC, c.name
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| CategoryLoanCount {
            category_id: row.get("category_id"),
            category_name: row.get("category_name"),
            total: row.get("total"),
        })
        .collect::<Vec<_>>();

        let top_category = loans_by_category.first().cloned();

        // Top books by loans in the period
        let top_books = sqlx::query(
            r#"
            SELECT b.id AS book_id, b.title AS book_title, COUNT(*) AS total
            FROM loans l
            JOIN borrow_request_items ri ON ri.id = l.request_item_id
            JOIN books b ON b.id = ri.book_id
            WHERE l.approved_from >= $1 AND l.approved_from < $2
            GROUP BY b.id, b.title
            ORDER BY total DESC, b.title
            LIMIT 10
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| BookLoanCount {
            book_id: row.get("book_id"),
            book_title: row.get("book_title"),
            total: row.get("total"),
        })
        .collect::<Vec<_>>();

        // Loans over time in the selected period, zero-filled
        let time_series = match period {
            PeriodType::Year => {
                let rows = sqlx::query(
                    r#"
                    SELECT EXTRACT(MONTH FROM l.approved_from)::int4 AS k, COUNT(*) AS total
                    FROM loans l
                    WHERE l.approved_from >= $1 AND l.approved_from < $2
                    GROUP BY k
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(pool)
                .await?;
                let by_key: std::collections::HashMap<i32, i64> = rows
                    .into_iter()
                    .map(|row| (row.get::<i32, _>("k"), row.get::<i64, _>("total")))
                    .collect();
                TimeSeries {
                    kind: "by_month".to_string(),
                    labels: (1..=12).map(|m| m.to_string()).collect(),
                    values: (1..=12).map(|m| *by_key.get(&m).unwrap_or(&0)).collect(),
                }
            }
            PeriodType::Month => {
                let last_day = (end - Duration::days(1)).day() as i32;
                let rows = sqlx::query(
                    r#"
                    SELECT EXTRACT(DAY FROM l.approved_from)::int4 AS k, COUNT(*) AS total
                    FROM loans l
                    WHERE l.approved_from >= $1 AND l.approved_from < $2
                    GROUP BY k
                    "#,
                )
                .bind(start)
                .bind(end)
                .fetch_all(pool)
                .await?;
                let by_key: std::collections::HashMap<i32, i64> = rows
                    .into_iter()
                    .map(|row| (row.get::<i32, _>("k"), row.get::<i64, _>("total")))
                    .collect();
                TimeSeries {
                    kind: "by_day".to_string(),
                    labels: (1..=last_day).map(|d| d.to_string()).collect(),
                    values: (1..=last_day).map(|d| *by_key.get(&d).unwrap_or(&0)).collect(),
                }
            }
        };

        // Top authors in the period
        let top_authors = sqlx::query(
            r#"
            SELECT a.id, a.name, COUNT(*) AS total
            FROM loans l
            JOIN borrow_request_items ri ON ri.id = l.request_item_id
            JOIN book_authors ba ON ba.book_id = ri.book_id
            JOIN authors a ON a.id = ba.author_id
            WHERE l.approved_from >= $1 AND l.approved_from < $2
            GROUP BY a.id, a.name
            ORDER BY total DESC, a.name
            LIMIT 10
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| NamedLoanCount {
            id: row.get("id"),
            name: row.get("name"),
            total: row.get("total"),
        })
        .collect::<Vec<_>>();

        // Top publishers in the period
        let top_publishers = sqlx::query(
            r#"
            SELECT p.id, p.name, COUNT(*) AS total
            FROM loans l
            JOIN borrow_request_items ri ON ri.id = l.request_item_id
            JOIN books b ON b.id = ri.book_id
            JOIN publishers p ON p.id = b.publisher_id
            WHERE l.approved_from >= $1 AND l.approved_from < $2
            GROUP BY p.id, p.name
            ORDER BY total DESC, p.name
            LIMIT 10
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| NamedLoanCount {
            id: row.get("id"),
            name: row.get("name"),
            total: row.get("total"),
        })
        .collect::<Vec<_>>();

        // Loan status distribution in the period
        let status_distribution = sqlx::query(
            r#"
            SELECT l.status AS label, COUNT(*) AS value
            FROM loans l
            WHERE l.approved_from >= $1 AND l.approved_from < $2
            GROUP BY l.status
            ORDER BY l.status
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| StatEntry {
            label: row.get("label"),
            value: row.get("value"),
        })
        .collect::<Vec<_>>();

        // Language distribution in the period
        let language_distribution = sqlx::query(
            r#"
            SELECT COALESCE(NULLIF(b.language_code, ''), 'Unknown') AS label, COUNT(*) AS value
            FROM loans l
            JOIN borrow_request_items ri ON ri.id = l.request_item_id
            JOIN books b ON b.id = ri.book_id
            WHERE l.approved_from >= $1 AND l.approved_from < $2
            GROUP BY label
            ORDER BY value DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|row| StatEntry {
            label: row.get("label"),
            value: row.get("value"),
        })
        .collect::<Vec<_>>();

        Ok(BookStatsResponse {
            period: PeriodInfo {
                kind: period,
                year,
                month: match period {
                    PeriodType::Month => Some(month),
                    PeriodType::Year => None,
                },
                start,
                end_exclusive: end,
            },
            category_book_counts,
            loans_by_category,
            top_category,
            top_books,
            time_series,
            top_authors,
            top_publishers,
            status_distribution,
            language_distribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn relative_ages_pick_the_largest_unit() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let s = |secs| format_relative(now, now - Duration::seconds(secs));
        assert_eq!(s(5), "5s ago");
        assert_eq!(s(59), "59s ago");
        assert_eq!(s(60), "1m ago");
        assert_eq!(s(3_599), "59m ago");
        assert_eq!(s(3_600), "1h ago");
        assert_eq!(s(86_399), "23h ago");
        assert_eq!(s(86_400), "1d ago");
        assert_eq!(s(864_000), "10d ago");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now, now + Duration::seconds(30)), "0s ago");
    }

    #[test]
    fn month_bounds_cover_one_month() {
        let (start, end) = period_bounds(PeriodType::Month, 2024, 4);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = period_bounds(PeriodType::Month, 2023, 12);
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn out_of_range_months_clamp() {
        let (start, _) = period_bounds(PeriodType::Month, 2024, 0);
        assert_eq!(start.month(), 1);
        let (start, _) = period_bounds(PeriodType::Month, 2024, 27);
        assert_eq!(start.month(), 12);
    }

    #[test]
    fn year_bounds_cover_one_year() {
        let (start, end) = period_bounds(PeriodType::Year, 2024, 6);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
