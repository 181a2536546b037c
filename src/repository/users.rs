//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{User, UserQuery},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username, if any
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let where_clause = r#"
              ($1::text IS NULL OR u.username ILIKE '%' || $1 || '%'
                   OR u.email ILIKE '%' || $1 || '%'
                   OR u.first_name ILIKE '%' || $1 || '%'
                   OR u.last_name ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR u.role = $2)
          AND ($3::bool IS NULL OR u.is_active = $3)
        "#;

        let list_query = format!(
            r#"
            SELECT u.* FROM users u
            WHERE {where_clause}
            ORDER BY u.username
            LIMIT $4 OFFSET $5
            "#
        );

        let users = sqlx::query_as::<_, User>(&list_query)
            .bind(&query.q)
            .bind(query.role)
            .bind(query.is_active)
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM users u WHERE {where_clause}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&query.q)
            .bind(query.role)
            .bind(query.is_active)
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total))
    }

    /// Create a user with an already-hashed password
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: Role,
        is_active: bool,
    ) -> AppResult<User> {
        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        if username_taken {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, email, first_name, last_name, role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(role)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update a user; unset fields keep their value. The password hash,
    /// when given, is already computed by the caller.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: i32,
        username: Option<&str>,
        password_hash: Option<&str>,
        email: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> AppResult<User> {
        if let Some(name) = username {
            let username_taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id != $2)",
            )
            .bind(name)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
            if username_taken {
                return Err(AppError::Conflict(format!(
                    "Username '{}' already exists",
                    name
                )));
            }
        }

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                email = COALESCE($4, email),
                first_name = COALESCE($5, first_name),
                last_name = COALESCE($6, last_name),
                role = COALESCE($7, role),
                is_active = COALESCE($8, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(role)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Activate the given users; returns the number updated
    pub async fn activate(&self, ids: &[i32]) -> AppResult<u64> {
        let result = sqlx::query("UPDATE users SET is_active = TRUE WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Deactivate the given users, skipping `except_id` (the caller never
    /// deactivates their own account). Returns (updated, skipped).
    pub async fn deactivate(&self, ids: &[i32], except_id: i32) -> AppResult<(u64, u64)> {
        let skipped = ids.iter().filter(|id| **id == except_id).count() as u64;

        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE WHERE id = ANY($1) AND id != $2",
        )
        .bind(ids)
        .bind(except_id)
        .execute(&self.pool)
        .await?;

        Ok((result.rows_affected(), skipped))
    }
}
