//! Publishers repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::publisher::{
        CreatePublisher, Publisher, PublisherListEntry, PublisherQuery, UpdatePublisher,
    },
};

#[derive(Clone)]
pub struct PublishersRepository {
    pool: Pool<Postgres>,
}

impl PublishersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get publisher by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Publisher with id {} not found", id)))
    }

    /// Search publishers with their book counts
    pub async fn search(
        &self,
        query: &PublisherQuery,
    ) -> AppResult<(Vec<PublisherListEntry>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let entries = sqlx::query_as::<_, PublisherListEntry>(
            r#"
            SELECT p.id, p.name, p.founded_year, p.website, p.created_at,
                   (SELECT COUNT(*) FROM books b WHERE b.publisher_id = p.id) AS books_count
            FROM publishers p
            WHERE ($1::text IS NULL OR p.name ILIKE '%' || $1 || '%'
                   OR p.description ILIKE '%' || $1 || '%')
              AND ($2::int4 IS NULL OR p.founded_year = $2)
            ORDER BY p.name, p.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&query.q)
        .bind(query.founded_year)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM publishers p
            WHERE ($1::text IS NULL OR p.name ILIKE '%' || $1 || '%'
                   OR p.description ILIKE '%' || $1 || '%')
              AND ($2::int4 IS NULL OR p.founded_year = $2)
            "#,
        )
        .bind(&query.q)
        .bind(query.founded_year)
        .fetch_one(&self.pool)
        .await?;

        Ok((entries, total))
    }

    /// Create a new publisher
    pub async fn create(&self, publisher: &CreatePublisher) -> AppResult<Publisher> {
        let created = sqlx::query_as::<_, Publisher>(
            r#"
            INSERT INTO publishers (name, description, founded_year, website)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&publisher.name)
        .bind(&publisher.description)
        .bind(publisher.founded_year)
        .bind(&publisher.website)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a publisher; unset fields keep their value
    pub async fn update(&self, id: i32, publisher: &UpdatePublisher) -> AppResult<Publisher> {
        sqlx::query_as::<_, Publisher>(
            r#"
            UPDATE publishers
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                founded_year = COALESCE($4, founded_year),
                website = COALESCE($5, website)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&publisher.name)
        .bind(&publisher.description)
        .bind(publisher.founded_year)
        .bind(&publisher.website)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Publisher with id {} not found", id)))
    }

    /// Count books referencing a publisher
    pub async fn count_books(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE publisher_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Delete a publisher
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Publisher with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
