//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorListEntry, AuthorQuery, CreateAuthor, UpdateAuthor},
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Search authors with their book counts
    pub async fn search(&self, query: &AuthorQuery) -> AppResult<(Vec<AuthorListEntry>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let entries = sqlx::query_as::<_, AuthorListEntry>(
            r#"
            SELECT a.id, a.name, a.birth_date, a.death_date, a.created_at,
                   (SELECT COUNT(*) FROM book_authors ba WHERE ba.author_id = a.id) AS books_count
            FROM authors a
            WHERE ($1::text IS NULL OR a.name ILIKE '%' || $1 || '%'
                   OR a.biography ILIKE '%' || $1 || '%')
            ORDER BY a.name, a.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&query.q)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM authors a
            WHERE ($1::text IS NULL OR a.name ILIKE '%' || $1 || '%'
                   OR a.biography ILIKE '%' || $1 || '%')
            "#,
        )
        .bind(&query.q)
        .fetch_one(&self.pool)
        .await?;

        Ok((entries, total))
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, biography, birth_date, death_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&author.name)
        .bind(&author.biography)
        .bind(author.birth_date)
        .bind(author.death_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an author; unset fields keep their value
    pub async fn update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET name = COALESCE($2, name),
                biography = COALESCE($3, biography),
                birth_date = COALESCE($4, birth_date),
                death_date = COALESCE($5, death_date)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&author.name)
        .bind(&author.biography)
        .bind(author.birth_date)
        .bind(author.death_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    /// Delete an author; join rows to books are removed with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Author with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
