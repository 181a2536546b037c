//! Mail queue repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        enums::NotificationKind,
        notification::{MailNotification, NotificationQuery},
    },
};

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Queue a mail for delivery
    pub async fn enqueue(
        &self,
        kind: NotificationKind,
        to_user_id: Option<i32>,
        to_admin_id: Option<i32>,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> AppResult<MailNotification> {
        let entry = sqlx::query_as::<_, MailNotification>(
            r#"
            INSERT INTO mail_queue (kind, to_user_id, to_admin_id, to_email, subject, body)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(to_user_id)
        .bind(to_admin_id)
        .bind(to_email)
        .bind(subject)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// List queue entries, newest first
    pub async fn search(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<(Vec<MailNotification>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let where_clause = r#"
              ($1::text IS NULL OR m.status = $1)
          AND ($2::text IS NULL OR m.kind = $2)
        "#;

        let list_query = format!(
            r#"
            SELECT m.* FROM mail_queue m
            WHERE {where_clause}
            ORDER BY m.scheduled_at DESC, m.id DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let entries = sqlx::query_as::<_, MailNotification>(&list_query)
            .bind(query.status)
            .bind(query.kind)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM mail_queue m WHERE {where_clause}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(query.status)
            .bind(query.kind)
            .fetch_one(&self.pool)
            .await?;

        Ok((entries, total))
    }

    /// Fetch up to `limit` pending entries, oldest first
    pub async fn fetch_pending(&self, limit: i64) -> AppResult<Vec<MailNotification>> {
        let entries = sqlx::query_as::<_, MailNotification>(
            r#"
            SELECT * FROM mail_queue
            WHERE status = 'pending'
            ORDER BY scheduled_at, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Mark an entry delivered
    pub async fn mark_sent(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE mail_queue SET status = 'sent', sent_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Mark an entry failed; the next flush retries it only if reset
    pub async fn mark_failed(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE mail_queue SET status = 'failed' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
