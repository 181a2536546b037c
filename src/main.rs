//! Librarium Server - Library Management Admin System
//!
//! REST API server for catalog management, borrow-request approval,
//! loan tracking, reporting and spreadsheet export.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use librarium_server::{
    api, config::AppConfig, repository::Repository, services::Services, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "librarium_server={},tower_http=debug",
            config.logging.level
        )
        .into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Librarium Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let flush_interval = config.email.flush_interval_seconds.max(1);

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone(), config.email.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Periodically flush the mail queue
    let flush_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(flush_interval));
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            if let Err(e) = flush_state.services.notifications.flush_pending().await {
                tracing::warn!("mail queue flush failed: {}", e);
            }
        }
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Authors
        .route("/authors", get(api::authors::list_authors))
        .route("/authors", post(api::authors::create_author))
        .route("/authors/:id", get(api::authors::get_author))
        .route("/authors/:id", put(api::authors::update_author))
        .route("/authors/:id", delete(api::authors::delete_author))
        // Publishers
        .route("/publishers", get(api::publishers::list_publishers))
        .route("/publishers", post(api::publishers::create_publisher))
        .route("/publishers/:id", get(api::publishers::get_publisher))
        .route("/publishers/:id", put(api::publishers::update_publisher))
        .route("/publishers/:id", delete(api::publishers::delete_publisher))
        // Categories
        .route("/categories", get(api::categories::list_categories))
        .route("/categories", post(api::categories::create_category))
        .route("/categories/:id", get(api::categories::get_category))
        .route("/categories/:id", put(api::categories::update_category))
        .route("/categories/:id", delete(api::categories::delete_category))
        // Books & copies
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/items", post(api::books::create_item))
        .route("/items", get(api::books::list_items))
        .route("/items/:id", put(api::books::update_item))
        .route("/items/:id", delete(api::books::delete_item))
        // Borrow requests
        .route("/borrows", post(api::borrows::submit))
        .route("/borrows", get(api::borrows::list))
        .route("/borrows/mine", get(api::borrows::list_mine))
        .route("/borrows/expire-sweep", post(api::borrows::expire_sweep))
        .route("/borrows/:id", get(api::borrows::get))
        .route("/borrows/:id/approve", post(api::borrows::approve))
        .route("/borrows/:id/reject", post(api::borrows::reject))
        .route("/borrows/:id/cancel", post(api::borrows::cancel))
        .route("/borrows/:id/expire", post(api::borrows::expire))
        // Loans
        .route("/loans", get(api::loans::list))
        .route("/loans/overdue-sweep", post(api::loans::overdue_sweep))
        .route("/loans/:id", get(api::loans::get))
        .route("/loans/:id/return", post(api::loans::return_loan))
        // Stats
        .route("/stats", get(api::stats::get_stats))
        .route("/stats/activity", get(api::stats::get_activity))
        .route("/stats/books", get(api::stats::get_book_stats))
        // Export
        .route("/export/books", get(api::exports::export_books))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users", post(api::users::create_user))
        .route("/users/activate", post(api::users::activate_users))
        .route("/users/deactivate", post(api::users::deactivate_users))
        .route("/users/:id", get(api::users::get_user))
        .route("/users/:id", put(api::users::update_user))
        // Notifications
        .route("/notifications", get(api::notifications::list))
        .route("/notifications/flush", post(api::notifications::flush))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
