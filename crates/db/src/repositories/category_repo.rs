//! Repository for the `categories` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CreateCategory};

/// Select list including the per-category course count.
const SELECT: &str = "SELECT cat.id, cat.name, cat.description,
            (SELECT COUNT(*) FROM courses c WHERE c.category_id = cat.id) AS course_count,
            cat.created_at
     FROM categories cat";

pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("{SELECT} ORDER BY cat.name");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("{SELECT} WHERE cat.id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Insert a category. A duplicate name violates `uq_categories_name`.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(pool)
        .await?;

        let query = format!("{SELECT} WHERE cat.id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a category. Returns `true` if the row existed.
    ///
    /// Categories still referenced by courses fail with a foreign-key
    /// violation; callers check [`Category::course_count`] first.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
