//! Book items (physical copies) repository

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        book_item::{BookItem, BookItemListEntry, BookItemQuery, CreateBookItem, UpdateBookItem},
        enums::ItemStatus,
    },
};

#[derive(Clone)]
pub struct BookItemsRepository {
    pool: Pool<Postgres>,
}

impl BookItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookItem> {
        sqlx::query_as::<_, BookItem>("SELECT * FROM book_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book item with id {} not found", id)))
    }

    /// Search copies with pagination
    pub async fn search(&self, query: &BookItemQuery) -> AppResult<(Vec<BookItemListEntry>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let where_clause = r#"
              ($1::int4 IS NULL OR bi.book_id = $1)
          AND ($2::text IS NULL OR bi.status = $2)
          AND ($3::text IS NULL OR bi.location_code = $3)
          AND ($4::text IS NULL OR bi.barcode ILIKE '%' || $4 || '%')
        "#;

        let list_query = format!(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.barcode, bi.status,
                   bi.location_code, bi.created_at
            FROM book_items bi
            JOIN books b ON b.id = bi.book_id
            WHERE {where_clause}
            ORDER BY b.title, bi.barcode
            LIMIT $5 OFFSET $6
            "#
        );

        let entries = sqlx::query_as::<_, BookItemListEntry>(&list_query)
            .bind(query.book_id)
            .bind(query.status)
            .bind(&query.location_code)
            .bind(&query.barcode)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM book_items bi JOIN books b ON b.id = bi.book_id WHERE {where_clause}"
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(query.book_id)
            .bind(query.status)
            .bind(&query.location_code)
            .bind(&query.barcode)
            .fetch_one(&self.pool)
            .await?;

        Ok((entries, total))
    }

    /// Create a copy for a book. The barcode must be unique.
    pub async fn create(&self, book_id: i32, item: &CreateBookItem) -> AppResult<BookItem> {
        let barcode_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_items WHERE barcode = $1)")
                .bind(&item.barcode)
                .fetch_one(&self.pool)
                .await?;
        if barcode_taken {
            return Err(AppError::Conflict(format!(
                "Barcode '{}' already exists",
                item.barcode
            )));
        }

        let created = sqlx::query_as::<_, BookItem>(
            r#"
            INSERT INTO book_items (book_id, barcode, status, location_code)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(&item.barcode)
        .bind(item.status.unwrap_or(ItemStatus::Available))
        .bind(&item.location_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a copy; unset fields keep their value
    pub async fn update(&self, id: i32, item: &UpdateBookItem) -> AppResult<BookItem> {
        sqlx::query_as::<_, BookItem>(
            r#"
            UPDATE book_items
            SET barcode = COALESCE($2, barcode),
                status = COALESCE($3, status),
                location_code = COALESCE($4, location_code)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&item.barcode)
        .bind(item.status)
        .bind(&item.location_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book item with id {} not found", id)))
    }

    /// Whether the copy currently has an open loan
    pub async fn has_open_loan(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans
                WHERE book_item_id = $1 AND status IN ('BORROWED', 'OVERDUE')
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Delete a copy
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Book item with id {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Lock up to `limit` available copies of a book for allocation.
    /// `SKIP LOCKED` keeps two concurrent approvals from blocking on the
    /// same copies.
    pub async fn lock_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        limit: i64,
    ) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT id FROM book_items
            WHERE book_id = $1 AND status = 'AVAILABLE'
            ORDER BY id
            LIMIT $2
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .fetch_all(&mut **tx)
        .await?;

        Ok(ids)
    }

    /// Mark locked copies as loaned (inside the approval transaction)
    pub async fn mark_loaned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("UPDATE book_items SET status = 'LOANED' WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
