//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanListEntry, LoanQuery},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Create a loan inside the approval transaction
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: i32,
        request_item_id: i32,
        book_item_id: i32,
        approved_from: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO loans (request_id, request_item_id, book_item_id,
                               approved_from, due_date, status)
            VALUES ($1, $2, $3, $4, $5, 'BORROWED')
            RETURNING id
            "#,
        )
        .bind(request_id)
        .bind(request_item_id)
        .bind(book_item_id)
        .bind(approved_from)
        .bind(due_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Search loans with borrower and copy detail
    pub async fn search(&self, query: &LoanQuery) -> AppResult<(Vec<LoanListEntry>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let where_clause = r#"
              ($1::text IS NULL OR l.status = $1)
          AND ($2::int4 IS NULL OR r.user_id = $2)
          AND ($3::text IS NULL OR bi.barcode ILIKE '%' || $3 || '%')
          AND ($4::date IS NULL OR l.due_date < $4)
          AND ($5::date IS NULL OR l.due_date > $5)
        "#;

        let list_query = format!(
            r#"
            SELECT l.id, l.request_id, b.id AS book_id, b.title AS book_title,
                   bi.barcode, r.user_id, u.username,
                   l.approved_from, l.due_date, l.status, l.returned_at, l.created_at
            FROM loans l
            JOIN book_items bi ON bi.id = l.book_item_id
            JOIN books b ON b.id = bi.book_id
            JOIN borrow_requests r ON r.id = l.request_id
            JOIN users u ON u.id = r.user_id
            WHERE {where_clause}
            ORDER BY l.approved_from DESC, l.id DESC
            LIMIT $6 OFFSET $7
            "#
        );

        let entries = sqlx::query_as::<_, LoanListEntry>(&list_query)
            .bind(query.status)
            .bind(query.user_id)
            .bind(&query.barcode)
            .bind(query.due_before)
            .bind(query.due_after)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query = format!(
            r#"
            SELECT COUNT(*)
            FROM loans l
            JOIN book_items bi ON bi.id = l.book_item_id
            JOIN borrow_requests r ON r.id = l.request_id
            WHERE {where_clause}
            "#
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(query.status)
            .bind(query.user_id)
            .bind(&query.barcode)
            .bind(query.due_before)
            .bind(query.due_after)
            .fetch_one(&self.pool)
            .await?;

        Ok((entries, total))
    }

    /// Return a loan: close it and free its copy
    pub async fn return_loan(&self, id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if !loan.status.is_open() {
            return Err(AppError::Conflict(format!("Loan {} is already returned", id)));
        }

        let returned = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = 'RETURNED', returned_at = CURRENT_DATE
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE book_items SET status = 'AVAILABLE' WHERE id = $1")
            .bind(loan.book_item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(returned)
    }

    /// Mark every borrowed loan past its due date as overdue; returns the
    /// number marked. Copies stay LOANED until returned.
    pub async fn overdue_sweep(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE loans SET status = 'OVERDUE' WHERE status = 'BORROWED' AND due_date < CURRENT_DATE",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
