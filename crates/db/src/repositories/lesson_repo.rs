//! Repository for the `lessons` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::lesson::{CreateLesson, Lesson, UpdateLesson};

const COLUMNS: &str = "id, section_id, title, content_type, content_url, text_content, \
                       duration_minutes, order_index, is_free, created_at, updated_at";

pub struct LessonRepo;

impl LessonRepo {
    pub async fn create(
        pool: &PgPool,
        section_id: DbId,
        input: &CreateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons
                (section_id, title, content_type, content_url, text_content,
                 duration_minutes, order_index, is_free)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(section_id)
            .bind(&input.title)
            .bind(&input.content_type)
            .bind(&input.content_url)
            .bind(&input.text_content)
            .bind(input.duration_minutes)
            .bind(input.order_index)
            .bind(input.is_free)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every lesson of a course, ordered by section then lesson position.
    pub async fn list_by_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Lesson>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM lessons l
             JOIN sections s ON s.id = l.section_id
             WHERE s.course_id = $1
             ORDER BY s.order_index, s.id, l.order_index, l.id",
            cols = prefixed("l")
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Update a lesson, scoped to its section.
    pub async fn update(
        pool: &PgPool,
        section_id: DbId,
        id: DbId,
        input: &UpdateLesson,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!(
            "UPDATE lessons SET
                title = COALESCE($3, title),
                content_type = COALESCE($4, content_type),
                content_url = COALESCE($5, content_url),
                text_content = COALESCE($6, text_content),
                duration_minutes = COALESCE($7, duration_minutes),
                order_index = COALESCE($8, order_index),
                is_free = COALESCE($9, is_free)
             WHERE id = $1 AND section_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(section_id)
            .bind(&input.title)
            .bind(&input.content_type)
            .bind(&input.content_url)
            .bind(&input.text_content)
            .bind(input.duration_minutes)
            .bind(input.order_index)
            .bind(input.is_free)
            .fetch_optional(pool)
            .await
    }

    /// Delete a lesson. Its completion records go with it, so progress of
    /// enrolled students shifts on their next recompute.
    pub async fn delete(pool: &PgPool, section_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1 AND section_id = $2")
            .bind(id)
            .bind(section_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// `COLUMNS` qualified with a table alias.
fn prefixed(alias: &str) -> String {
    COLUMNS
        .split(", ")
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}
