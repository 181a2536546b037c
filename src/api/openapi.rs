//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, authors, books, borrows, categories, exports, health, loans, notifications, publishers,
    stats, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librarium API",
        version = "0.3.0",
        description = "Library Management Admin REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Publishers
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Books & copies
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_items,
        books::create_item,
        books::update_item,
        books::delete_item,
        // Borrow requests
        borrows::submit,
        borrows::list,
        borrows::list_mine,
        borrows::get,
        borrows::approve,
        borrows::reject,
        borrows::cancel,
        borrows::expire,
        borrows::expire_sweep,
        // Loans
        loans::list,
        loans::get,
        loans::return_loan,
        loans::overdue_sweep,
        // Stats
        stats::get_stats,
        stats::get_activity,
        stats::get_book_stats,
        // Export
        exports::export_books,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::activate_users,
        users::deactivate_users,
        // Notifications
        notifications::list,
        notifications::flush,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Catalog
            crate::models::author::Author,
            crate::models::author::AuthorListEntry,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            crate::models::publisher::Publisher,
            crate::models::publisher::PublisherListEntry,
            crate::models::publisher::CreatePublisher,
            crate::models::publisher::UpdatePublisher,
            crate::models::category::Category,
            crate::models::category::CategoryListEntry,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            crate::models::book::Book,
            crate::models::book::BookListEntry,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book_item::BookItem,
            crate::models::book_item::BookItemListEntry,
            crate::models::book_item::CreateBookItem,
            crate::models::book_item::UpdateBookItem,
            // Enums
            crate::models::enums::ItemStatus,
            crate::models::enums::RequestStatus,
            crate::models::enums::LoanStatus,
            crate::models::enums::Role,
            crate::models::enums::NotificationKind,
            crate::models::enums::NotificationStatus,
            // Borrow requests
            crate::models::borrow_request::BorrowRequest,
            crate::models::borrow_request::BorrowRequestItem,
            crate::models::borrow_request::BorrowRequestListEntry,
            crate::models::borrow_request::CreateBorrowRequest,
            crate::models::borrow_request::CreateBorrowRequestItem,
            crate::models::borrow_request::RejectBorrowRequest,
            borrows::ApprovalResponse,
            borrows::SweepResponse,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanListEntry,
            loans::OverdueSweepResponse,
            // Stats
            stats::StatsOverview,
            stats::OverviewTotals,
            stats::RecentActivityCounts,
            stats::PopularBook,
            stats::StatEntry,
            stats::ActivityEntry,
            stats::ActivityResponse,
            stats::PeriodType,
            stats::PeriodInfo,
            stats::CategoryCount,
            stats::CategoryLoanCount,
            stats::BookLoanCount,
            stats::NamedLoanCount,
            stats::TimeSeries,
            stats::BookStatsResponse,
            // Export
            exports::ExportBooksQuery,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::BulkUserIds,
            users::BulkActionResponse,
            // Notifications
            crate::models::notification::MailNotification,
            notifications::FlushResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "catalog", description = "Catalog management"),
        (name = "borrows", description = "Borrow request workflow"),
        (name = "loans", description = "Loan tracking"),
        (name = "stats", description = "Statistics and reporting"),
        (name = "exports", description = "Spreadsheet exports"),
        (name = "users", description = "User management"),
        (name = "notifications", description = "Mail queue")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
