//! Catalog management service: authors, publishers, categories, books, copies

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorListEntry, AuthorQuery, CreateAuthor, UpdateAuthor},
        book::{Book, BookListEntry, BookQuery, CreateBook, UpdateBook},
        book_item::{
            BookItem, BookItemListEntry, BookItemQuery, CreateBookItem, UpdateBookItem,
        },
        category::{Category, CategoryListEntry, CategoryQuery, CreateCategory, UpdateCategory},
        publisher::{
            CreatePublisher, Publisher, PublisherListEntry, PublisherQuery, UpdatePublisher,
        },
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // Authors
    // =========================================================================

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn search_authors(&self, query: &AuthorQuery) -> AppResult<(Vec<AuthorListEntry>, i64)> {
        self.repository.authors.search(query).await
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        author
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.authors.create(&author).await
    }

    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        author
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.authors.update(id, &author).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // =========================================================================
    // Publishers
    // =========================================================================

    pub async fn get_publisher(&self, id: i32) -> AppResult<Publisher> {
        self.repository.publishers.get_by_id(id).await
    }

    pub async fn search_publishers(
        &self,
        query: &PublisherQuery,
    ) -> AppResult<(Vec<PublisherListEntry>, i64)> {
        self.repository.publishers.search(query).await
    }

    pub async fn create_publisher(&self, publisher: CreatePublisher) -> AppResult<Publisher> {
        publisher
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.publishers.create(&publisher).await
    }

    pub async fn update_publisher(
        &self,
        id: i32,
        publisher: UpdatePublisher,
    ) -> AppResult<Publisher> {
        publisher
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.publishers.update(id, &publisher).await
    }

    /// Delete a publisher; refuses while books still reference it
    pub async fn delete_publisher(&self, id: i32) -> AppResult<()> {
        let books = self.repository.publishers.count_books(id).await?;
        if books > 0 {
            return Err(AppError::Conflict(format!(
                "Publisher {} still has {} book(s)",
                id, books
            )));
        }
        self.repository.publishers.delete(id).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn get_category(&self, id: i32) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn search_categories(
        &self,
        query: &CategoryQuery,
    ) -> AppResult<(Vec<CategoryListEntry>, i64)> {
        self.repository.categories.search(query).await
    }

    pub async fn create_category(&self, category: CreateCategory) -> AppResult<Category> {
        category
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if let Some(parent_id) = category.parent_id {
            self.repository.categories.get_by_id(parent_id).await?;
        }
        self.repository.categories.create(&category).await
    }

    pub async fn update_category(&self, id: i32, category: UpdateCategory) -> AppResult<Category> {
        category
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if let Some(parent_id) = category.parent_id {
            if parent_id == id {
                return Err(AppError::Validation(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            self.repository.categories.get_by_id(parent_id).await?;
        }
        self.repository.categories.update(id, &category).await
    }

    /// Delete a category; refuses while children or books are attached
    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        let (children, books) = self.repository.categories.usage_counts(id).await?;
        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} still has {} subcategorie(s)",
                id, children
            )));
        }
        if books > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} still has {} book(s)",
                id, books
            )));
        }
        self.repository.categories.delete(id).await
    }

    // =========================================================================
    // Books
    // =========================================================================

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookListEntry>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.check_book_relations(
            book.publisher_id,
            Some(&book.author_ids),
            Some(&book.category_ids),
        )
        .await?;
        self.repository.books.create(&book).await
    }

    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.check_book_relations(
            book.publisher_id,
            book.author_ids.as_deref(),
            book.category_ids.as_deref(),
        )
        .await?;
        self.repository.books.update(id, &book).await
    }

    /// Delete a book; refuses while any loan history exists
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let loans = self.repository.books.count_loans(id).await?;
        if loans > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} has {} loan(s) on record",
                id, loans
            )));
        }
        self.repository.books.delete(id).await
    }

    async fn check_book_relations(
        &self,
        publisher_id: Option<i32>,
        author_ids: Option<&[i32]>,
        category_ids: Option<&[i32]>,
    ) -> AppResult<()> {
        if let Some(pid) = publisher_id {
            self.repository.publishers.get_by_id(pid).await?;
        }
        if let Some(ids) = author_ids {
            for id in ids {
                self.repository.authors.get_by_id(*id).await?;
            }
        }
        if let Some(ids) = category_ids {
            for id in ids {
                self.repository.categories.get_by_id(*id).await?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Copies
    // =========================================================================

    pub async fn get_item(&self, id: i32) -> AppResult<BookItem> {
        self.repository.book_items.get_by_id(id).await
    }

    pub async fn search_items(
        &self,
        query: &BookItemQuery,
    ) -> AppResult<(Vec<BookItemListEntry>, i64)> {
        self.repository.book_items.search(query).await
    }

    pub async fn create_item(&self, book_id: i32, item: CreateBookItem) -> AppResult<BookItem> {
        item.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.books.get_by_id(book_id).await?;
        self.repository.book_items.create(book_id, &item).await
    }

    pub async fn update_item(&self, id: i32, item: UpdateBookItem) -> AppResult<BookItem> {
        item.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.book_items.update(id, &item).await
    }

    /// Delete a copy; refuses while it has an open loan
    pub async fn delete_item(&self, id: i32) -> AppResult<()> {
        if self.repository.book_items.has_open_loan(id).await? {
            return Err(AppError::Conflict(format!(
                "Book item {} has an open loan",
                id
            )));
        }
        self.repository.book_items.delete(id).await
    }
}
