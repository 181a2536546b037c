//! Repository layer for database operations

pub mod authors;
pub mod book_items;
pub mod books;
pub mod borrow_requests;
pub mod categories;
pub mod loans;
pub mod notifications;
pub mod publishers;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub publishers: publishers::PublishersRepository,
    pub categories: categories::CategoriesRepository,
    pub books: books::BooksRepository,
    pub book_items: book_items::BookItemsRepository,
    pub borrow_requests: borrow_requests::BorrowRequestsRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
    pub notifications: notifications::NotificationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            publishers: publishers::PublishersRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            book_items: book_items::BookItemsRepository::new(pool.clone()),
            borrow_requests: borrow_requests::BorrowRequestsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            pool,
        }
    }
}
