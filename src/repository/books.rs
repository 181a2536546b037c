//! Books repository for database operations.
//!
//! Relation lists (authors, categories, copies) are loaded with separate
//! queries; export rows carry copy counts and engagement metrics computed
//! in SQL.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{
            Book, BookExportFilter, BookExportRow, BookListEntry, BookQuery, CreateBook,
            ItemExportRow, UpdateBook,
        },
        book_item::BookItem,
        category::Category,
        publisher::Publisher,
    },
};

/// Map an export/list sort key onto an ORDER BY clause.
/// Unknown keys fall back to title, matching the original behavior.
pub fn order_clause(sort: Option<&str>) -> &'static str {
    match sort.unwrap_or("title") {
        "-title" => "b.title DESC, b.id DESC",
        "created_at" => "b.created_at ASC, b.id ASC",
        "-created_at" => "b.created_at DESC, b.id DESC",
        "publish_year" => "b.publish_year ASC NULLS LAST, b.id ASC",
        "-publish_year" => "b.publish_year DESC NULLS LAST, b.id DESC",
        _ => "b.title ASC, b.id ASC",
    }
}

/// Shared WHERE clause for export queries ($1..$10 are the filter params)
const EXPORT_FILTER_WHERE: &str = r#"
      ($1::text IS NULL OR b.title ILIKE '%' || $1 || '%'
           OR b.description ILIKE '%' || $1 || '%'
           OR b.isbn13 ILIKE '%' || $1 || '%')
  AND ($2::int4 IS NULL OR EXISTS (
           SELECT 1 FROM book_categories bc
           WHERE bc.book_id = b.id AND bc.category_id = $2))
  AND ($3::int4 IS NULL OR EXISTS (
           SELECT 1 FROM book_authors ba
           WHERE ba.book_id = b.id AND ba.author_id = $3))
  AND ($4::int4 IS NULL OR b.publisher_id = $4)
  AND ($5::int4 IS NULL OR b.publish_year >= $5)
  AND ($6::int4 IS NULL OR b.publish_year <= $6)
  AND ($7::text IS NULL OR LOWER(b.language_code) = LOWER($7))
  AND ($8::text IS NULL OR EXISTS (
           SELECT 1 FROM book_items bi
           WHERE bi.book_id = b.id AND bi.status = $8))
  AND ($9::date IS NULL OR b.created_at::date >= $9)
  AND ($10::date IS NULL OR b.created_at::date <= $10)
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a book with all relations loaded
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let mut book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        book.authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.* FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = $1
            ORDER BY ba.author_order, a.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        book.categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.* FROM book_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.book_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        book.publisher = match book.publisher_id {
            Some(pid) => {
                sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
                    .bind(pid)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        book.items = sqlx::query_as::<_, BookItem>(
            "SELECT * FROM book_items WHERE book_id = $1 ORDER BY barcode",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(book)
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookListEntry>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let where_clause = r#"
              ($1::text IS NULL OR b.title ILIKE '%' || $1 || '%'
                   OR b.description ILIKE '%' || $1 || '%'
                   OR b.isbn13 ILIKE '%' || $1 || '%')
          AND ($2::int4 IS NULL OR b.publisher_id = $2)
          AND ($3::int4 IS NULL OR EXISTS (
                   SELECT 1 FROM book_categories bc
                   WHERE bc.book_id = b.id AND bc.category_id = $3))
          AND ($4::int4 IS NULL OR EXISTS (
                   SELECT 1 FROM book_authors ba
                   WHERE ba.book_id = b.id AND ba.author_id = $4))
          AND ($5::int4 IS NULL OR b.publish_year = $5)
          AND ($6::text IS NULL OR LOWER(b.language_code) = LOWER($6))
        "#;

        let list_query = format!(
            r#"
            SELECT b.id, b.title, p.name AS publisher_name, b.publish_year, b.pages,
                   b.isbn13, b.language_code, b.created_at,
                   (SELECT COUNT(*) FROM book_items bi WHERE bi.book_id = b.id) AS items_count
            FROM books b
            LEFT JOIN publishers p ON p.id = b.publisher_id
            WHERE {where_clause}
            ORDER BY b.title, b.id
            LIMIT $7 OFFSET $8
            "#
        );

        let entries = sqlx::query_as::<_, BookListEntry>(&list_query)
            .bind(&query.q)
            .bind(query.publisher_id)
            .bind(query.category_id)
            .bind(query.author_id)
            .bind(query.publish_year)
            .bind(&query.language)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM books b WHERE {where_clause}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&query.q)
            .bind(query.publisher_id)
            .bind(query.category_id)
            .bind(query.author_id)
            .bind(query.publish_year)
            .bind(&query.language)
            .fetch_one(&self.pool)
            .await?;

        Ok((entries, total))
    }

    /// Create a book with its author/category relations
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, description, isbn13, publisher_id, publish_year,
                               pages, language_code, cover_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.description)
        .bind(&book.isbn13)
        .bind(book.publisher_id)
        .bind(book.publish_year)
        .bind(book.pages)
        .bind(&book.language_code)
        .bind(&book.cover_url)
        .fetch_one(&mut *tx)
        .await?;

        for (order, author_id) in book.author_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO book_authors (book_id, author_id, author_order) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(author_id)
            .bind(order as i32)
            .execute(&mut *tx)
            .await?;
        }

        for category_id in &book.category_ids {
            sqlx::query("INSERT INTO book_categories (book_id, category_id) VALUES ($1, $2)")
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Update a book. Relation lists replace existing ones when provided.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                isbn13 = COALESCE($4, isbn13),
                publisher_id = COALESCE($5, publisher_id),
                publish_year = COALESCE($6, publish_year),
                pages = COALESCE($7, pages),
                language_code = COALESCE($8, language_code),
                cover_url = COALESCE($9, cover_url),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.description)
        .bind(&book.isbn13)
        .bind(book.publisher_id)
        .bind(book.publish_year)
        .bind(book.pages)
        .bind(&book.language_code)
        .bind(&book.cover_url)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        if let Some(ref author_ids) = book.author_ids {
            sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for (order, author_id) in author_ids.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO book_authors (book_id, author_id, author_order) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(author_id)
                .bind(order as i32)
                .execute(&mut *tx)
                .await?;
            }
        }

        if let Some(ref category_ids) = book.category_ids {
            sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for category_id in category_ids {
                sqlx::query("INSERT INTO book_categories (book_id, category_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(category_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Count loans (any status) against a book's copies, used as delete guard
    pub async fn count_loans(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM loans l
            JOIN book_items bi ON bi.id = l.book_item_id
            WHERE bi.book_id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Delete a book and its copies/relations
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Fetch export rows: every matching book with its metrics
    pub async fn export_rows(&self, filter: &BookExportFilter) -> AppResult<Vec<BookExportRow>> {
        let query = format!(
            r#"
            SELECT b.id, b.title, b.isbn13, b.publish_year, b.language_code,
                   b.cover_url, b.created_at,
                   p.name AS publisher_name,
                   p.founded_year AS publisher_founded_year,
                   COALESCE((SELECT string_agg(a.name, ', ' ORDER BY ba.author_order, a.id)
                             FROM book_authors ba JOIN authors a ON a.id = ba.author_id
                             WHERE ba.book_id = b.id), '') AS authors,
                   COALESCE((SELECT string_agg(c.name, ', ' ORDER BY c.name)
                             FROM book_categories bc JOIN categories c ON c.id = bc.category_id
                             WHERE bc.book_id = b.id), '') AS categories,
                   (SELECT COUNT(*) FROM book_items bi WHERE bi.book_id = b.id) AS total_items,
                   (SELECT COUNT(*) FROM book_items bi
                    WHERE bi.book_id = b.id AND bi.status = 'AVAILABLE') AS available_items,
                   (SELECT COUNT(*) FROM book_items bi
                    WHERE bi.book_id = b.id AND bi.status = 'RESERVED') AS reserved_items,
                   (SELECT COUNT(*) FROM book_items bi
                    WHERE bi.book_id = b.id AND bi.status = 'LOANED') AS loaned_items,
                   (SELECT COUNT(*) FROM book_items bi
                    WHERE bi.book_id = b.id AND bi.status = 'LOST') AS lost_items,
                   (SELECT COUNT(*) FROM book_items bi
                    WHERE bi.book_id = b.id AND bi.status = 'DAMAGED') AS damaged_items,
                   (SELECT COUNT(*) FROM loans l
                    JOIN borrow_request_items ri ON ri.id = l.request_item_id
                    WHERE ri.book_id = b.id) AS total_loans,
                   (SELECT MAX(l.approved_from) FROM loans l
                    JOIN borrow_request_items ri ON ri.id = l.request_item_id
                    WHERE ri.book_id = b.id) AS last_loan_date,
                   (SELECT AVG(r.rating)::float8 FROM ratings r
                    WHERE r.book_id = b.id) AS avg_rating,
                   (SELECT COUNT(*) FROM favorites f WHERE f.book_id = b.id) AS total_favorites
            FROM books b
            LEFT JOIN publishers p ON p.id = b.publisher_id
            WHERE {EXPORT_FILTER_WHERE}
            ORDER BY {order}
            "#,
            order = order_clause(filter.sort.as_deref())
        );

        let rows = sqlx::query_as::<_, BookExportRow>(&query)
            .bind(&filter.q)
            .bind(filter.category_id)
            .bind(filter.author_id)
            .bind(filter.publisher_id)
            .bind(filter.publish_year_from)
            .bind(filter.publish_year_to)
            .bind(&filter.language)
            .bind(filter.item_status)
            .bind(filter.created_from)
            .bind(filter.created_to)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Fetch copy rows for the export Items sheet (same book filters)
    pub async fn export_item_rows(
        &self,
        filter: &BookExportFilter,
    ) -> AppResult<Vec<ItemExportRow>> {
        let query = format!(
            r#"
            SELECT b.id AS book_id, b.title, bi.barcode, bi.status, bi.location_code,
                   bi.created_at, l.due_date, l.status AS loan_status
            FROM book_items bi
            JOIN books b ON b.id = bi.book_id
            LEFT JOIN loans l ON l.book_item_id = bi.id
                             AND l.status IN ('BORROWED', 'OVERDUE')
            WHERE {EXPORT_FILTER_WHERE}
            ORDER BY {order}, bi.barcode
            "#,
            order = order_clause(filter.sort.as_deref())
        );

        let rows = sqlx::query_as::<_, ItemExportRow>(&query)
            .bind(&filter.q)
            .bind(filter.category_id)
            .bind(filter.author_id)
            .bind(filter.publisher_id)
            .bind(filter.publish_year_from)
            .bind(filter.publish_year_to)
            .bind(&filter.language)
            .bind(filter.item_status)
            .bind(filter.created_from)
            .bind(filter.created_to)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sorts_map_to_their_clause() {
        assert_eq!(order_clause(Some("-title")), "b.title DESC, b.id DESC");
        assert_eq!(
            order_clause(Some("publish_year")),
            "b.publish_year ASC NULLS LAST, b.id ASC"
        );
        assert_eq!(
            order_clause(Some("-created_at")),
            "b.created_at DESC, b.id DESC"
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_title() {
        assert_eq!(order_clause(None), "b.title ASC, b.id ASC");
        assert_eq!(order_clause(Some("title")), "b.title ASC, b.id ASC");
        assert_eq!(
            order_clause(Some("drop table books")),
            "b.title ASC, b.id ASC"
        );
    }
}
