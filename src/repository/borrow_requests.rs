//! Borrow requests repository.
//!
//! Decision updates are guarded with `WHERE status = 'PENDING'`, so a
//! request can never leave a terminal state even under concurrent
//! decisions.

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::borrow_request::{
        BorrowRequest, BorrowRequestItem, BorrowRequestListEntry, BorrowRequestQuery,
        CreateBorrowRequest,
    },
};

#[derive(Clone)]
pub struct BorrowRequestsRepository {
    pool: Pool<Postgres>,
}

impl BorrowRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a request with its items
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        let mut request =
            sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Borrow request with id {} not found", id))
                })?;

        request.items = self.get_items(id).await?;
        Ok(request)
    }

    /// Load the items of a request, with book titles
    pub async fn get_items(&self, request_id: i32) -> AppResult<Vec<BorrowRequestItem>> {
        let items = sqlx::query_as::<_, BorrowRequestItem>(
            r#"
            SELECT ri.id, ri.request_id, ri.book_id, b.title AS book_title, ri.quantity
            FROM borrow_request_items ri
            JOIN books b ON b.id = ri.book_id
            WHERE ri.request_id = $1
            ORDER BY ri.id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Search requests with pagination.
    /// `overdue=true` narrows to pending requests past their end date,
    /// `overdue=false` excludes exactly those.
    pub async fn search(
        &self,
        query: &BorrowRequestQuery,
    ) -> AppResult<(Vec<BorrowRequestListEntry>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let where_clause = r#"
              ($1::text IS NULL OR r.status = $1)
          AND ($2::int4 IS NULL OR r.user_id = $2)
          AND ($3::bool IS NULL
               OR ($3 AND r.status = 'PENDING' AND r.requested_to < CURRENT_DATE)
               OR (NOT $3 AND NOT (r.status = 'PENDING' AND r.requested_to < CURRENT_DATE)))
          AND ($4::date IS NULL OR r.requested_from >= $4)
          AND ($5::date IS NULL OR r.requested_to <= $5)
        "#;

        let list_query = format!(
            r#"
            SELECT r.id, r.user_id, u.username, r.requested_from, r.requested_to, r.status,
                   (SELECT COUNT(*) FROM borrow_request_items ri
                    WHERE ri.request_id = r.id) AS items_count,
                   r.admin_id, a.username AS admin_username,
                   r.decision_at, r.rejection_reason, r.created_at
            FROM borrow_requests r
            JOIN users u ON u.id = r.user_id
            LEFT JOIN users a ON a.id = r.admin_id
            WHERE {where_clause}
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $6 OFFSET $7
            "#
        );

        let entries = sqlx::query_as::<_, BorrowRequestListEntry>(&list_query)
            .bind(query.status)
            .bind(query.user_id)
            .bind(query.overdue)
            .bind(query.requested_from)
            .bind(query.requested_to)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query =
            format!("SELECT COUNT(*) FROM borrow_requests r WHERE {where_clause}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(query.status)
            .bind(query.user_id)
            .bind(query.overdue)
            .bind(query.requested_from)
            .bind(query.requested_to)
            .fetch_one(&self.pool)
            .await?;

        Ok((entries, total))
    }

    /// Create a pending request with its items
    pub async fn create(&self, user_id: i32, req: &CreateBorrowRequest) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO borrow_requests (user_id, requested_from, requested_to)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(req.requested_from)
        .bind(req.requested_to)
        .fetch_one(&mut *tx)
        .await?;

        for item in &req.items {
            sqlx::query(
                "INSERT INTO borrow_request_items (request_id, book_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(item.book_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_by_id(id).await
    }

    /// Lock a request row inside an approval transaction and return its status
    pub async fn lock_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT status FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))
    }

    /// Mark a pending request approved (inside the approval transaction)
    pub async fn mark_approved(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        admin_id: i32,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'APPROVED', admin_id = $2, decision_at = NOW(),
                rejection_reason = '', updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Borrow request {} is not pending",
                id
            )));
        }
        Ok(())
    }

    /// Reject a pending request with a reason
    pub async fn mark_rejected(&self, id: i32, admin_id: i32, reason: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'REJECTED', admin_id = $2, decision_at = NOW(),
                rejection_reason = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Borrow request {} is not pending",
                id
            )));
        }
        Ok(())
    }

    /// Cancel a pending request; only its owner may do so
    pub async fn mark_cancelled(&self, id: i32, user_id: i32) -> AppResult<()> {
        let owned: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrow_requests WHERE id = $1 AND user_id = $2)")
                .bind(id)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if !owned {
            return Err(AppError::NotFound(format!(
                "Borrow request with id {} not found",
                id
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'CANCELLED', updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Borrow request {} is not pending",
                id
            )));
        }
        Ok(())
    }

    /// Expire one pending request whose end date has passed
    pub async fn mark_expired(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'EXPIRED', updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING' AND requested_to < CURRENT_DATE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Borrow request {} is not pending past its end date",
                id
            )));
        }
        Ok(())
    }

    /// Expire every pending request past its end date; returns the number marked
    pub async fn expire_sweep(&self) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE borrow_requests
            SET status = 'EXPIRED', updated_at = NOW()
            WHERE status = 'PENDING' AND requested_to < CURRENT_DATE
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
