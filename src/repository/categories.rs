//! Categories repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::category::{
        Category, CategoryListEntry, CategoryQuery, CreateCategory, UpdateCategory,
    },
};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Search categories with book and child counts
    pub async fn search(&self, query: &CategoryQuery) -> AppResult<(Vec<CategoryListEntry>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let entries = sqlx::query_as::<_, CategoryListEntry>(
            r#"
            SELECT c.id, c.name, c.slug, c.parent_id, p.name AS parent_name,
                   (SELECT COUNT(*) FROM book_categories bc WHERE bc.category_id = c.id) AS books_count,
                   (SELECT COUNT(*) FROM categories ch WHERE ch.parent_id = c.id) AS children_count
            FROM categories c
            LEFT JOIN categories p ON p.id = c.parent_id
            WHERE ($1::text IS NULL OR c.name ILIKE '%' || $1 || '%'
                   OR c.description ILIKE '%' || $1 || '%'
                   OR c.slug ILIKE '%' || $1 || '%')
              AND ($2::int4 IS NULL OR c.parent_id = $2)
            ORDER BY c.name, c.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&query.q)
        .bind(query.parent_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM categories c
            WHERE ($1::text IS NULL OR c.name ILIKE '%' || $1 || '%'
                   OR c.description ILIKE '%' || $1 || '%'
                   OR c.slug ILIKE '%' || $1 || '%')
              AND ($2::int4 IS NULL OR c.parent_id = $2)
            "#,
        )
        .bind(&query.q)
        .bind(query.parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((entries, total))
    }

    /// Create a new category. The slug must be unique.
    pub async fn create(&self, category: &CreateCategory) -> AppResult<Category> {
        let slug_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
                .bind(&category.slug)
                .fetch_one(&self.pool)
                .await?;
        if slug_taken {
            return Err(AppError::Conflict(format!(
                "Category slug '{}' already exists",
                category.slug
            )));
        }

        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a category; unset fields keep their value
    pub async fn update(&self, id: i32, category: &UpdateCategory) -> AppResult<Category> {
        if let Some(ref slug) = category.slug {
            let slug_taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1 AND id != $2)",
            )
            .bind(slug)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
            if slug_taken {
                return Err(AppError::Conflict(format!(
                    "Category slug '{}' already exists",
                    slug
                )));
            }
        }

        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                parent_id = COALESCE($5, parent_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.parent_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Count children and attached books, used as delete guards
    pub async fn usage_counts(&self, id: i32) -> AppResult<(i64, i64)> {
        let children: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        let books: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_categories WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok((children, books))
    }

    /// Delete a category
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }
        Ok(())
    }
}
