//! Print the library statistics overview to stdout.
//!
//! Connects with the same configuration as the server; handy for cron
//! jobs and quick terminal checks without hitting the HTTP API.

use sqlx::postgres::PgPoolOptions;

use librarium_server::{
    api::stats::{StatEntry, StatsOverview},
    config::AppConfig,
    repository::Repository,
    services::stats::StatsService,
};

fn status_value(entries: &[StatEntry], label: &str) -> i64 {
    entries
        .iter()
        .find(|e| e.label == label)
        .map(|e| e.value)
        .unwrap_or(0)
}

fn print_overview(stats: &StatsOverview) {
    println!("=== LIBRARY MANAGEMENT STATISTICS ===");
    println!("Total Books: {}", stats.totals.books);
    println!("Total Authors: {}", stats.totals.authors);
    println!("Total Publishers: {}", stats.totals.publishers);
    println!("Total Categories: {}", stats.totals.categories);
    println!("Total Book Items: {}", stats.totals.book_items);
    println!("Active Users: {}", stats.totals.active_users);

    println!("\n=== BOOK ITEM STATUS ===");
    println!("Available: {}", status_value(&stats.items_by_status, "AVAILABLE"));
    println!("Loaned: {}", status_value(&stats.items_by_status, "LOANED"));
    println!("Reserved: {}", status_value(&stats.items_by_status, "RESERVED"));
    println!("Damaged: {}", status_value(&stats.items_by_status, "DAMAGED"));
    println!("Lost: {}", status_value(&stats.items_by_status, "LOST"));

    println!("\n=== BORROW REQUESTS ===");
    println!("Pending: {}", status_value(&stats.requests_by_status, "PENDING"));
    println!("Approved: {}", status_value(&stats.requests_by_status, "APPROVED"));
    println!("Rejected: {}", status_value(&stats.requests_by_status, "REJECTED"));

    println!("\n=== LOANS ===");
    println!("Active: {}", status_value(&stats.loans_by_status, "BORROWED"));
    println!("Overdue: {}", status_value(&stats.loans_by_status, "OVERDUE"));
    println!("Returned: {}", status_value(&stats.loans_by_status, "RETURNED"));

    println!("\n=== RECENT ACTIVITY (30 days) ===");
    println!("New Books: {}", stats.last_30_days.new_books);
    println!("New Requests: {}", stats.last_30_days.new_requests);
    println!("New Users: {}", stats.last_30_days.new_users);

    println!("\n=== POPULAR BOOKS ===");
    for (i, book) in stats.popular_books.iter().enumerate() {
        println!("{}. {} by {}", i + 1, book.title, book.authors);
    }
    if stats.popular_books.is_empty() {
        println!("No popular books data available yet.");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await?;

    let stats = StatsService::new(Repository::new(pool));
    let overview = stats.overview().await?;

    print_overview(&overview);
    println!("\nStatistics completed successfully!");

    Ok(())
}
