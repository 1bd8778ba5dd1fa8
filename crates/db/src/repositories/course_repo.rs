//! Repository for the `courses` table.

use lms_core::enrollment::access_status_ids;
use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

/// Course select joined with instructor, category, enrollment count and
/// average rating. Enrollment counts only include statuses that grant access.
fn select_courses() -> String {
    let granting = access_status_ids()
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT c.id, c.title, c.description, c.instructor_id,
                (u.first_name || ' ' || u.last_name) AS instructor_name,
                c.category_id, cat.name AS category_name,
                c.thumbnail_url, c.is_published, c.duration_hours, c.level,
                (c.price * 100)::BIGINT AS price_cents,
                (SELECT COUNT(*) FROM enrollments e
                  WHERE e.course_id = c.id AND e.status_id IN ({granting})) AS enrollment_count,
                COALESCE((SELECT ROUND(AVG(r.rating), 2) FROM reviews r
                           WHERE r.course_id = c.id), 0)::float8 AS average_rating,
                c.created_at, c.updated_at
         FROM courses c
         JOIN users u ON u.id = c.instructor_id
         JOIN categories cat ON cat.id = c.category_id"
    )
}

pub struct CourseRepo;

impl CourseRepo {
    /// Published courses, newest first.
    pub async fn list_published(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "{} WHERE c.is_published = true
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT $1 OFFSET $2",
            select_courses()
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("{} WHERE c.id = $1", select_courses());
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Published courses in a category.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "{} WHERE c.category_id = $1 AND c.is_published = true
             ORDER BY c.created_at DESC, c.id DESC",
            select_courses()
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Courses taught by an instructor. Drafts are included only when asked.
    pub async fn list_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
        include_unpublished: bool,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "{} WHERE c.instructor_id = $1 AND ($2 OR c.is_published = true)
             ORDER BY c.created_at DESC, c.id DESC",
            select_courses()
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(instructor_id)
            .bind(include_unpublished)
            .fetch_all(pool)
            .await
    }

    /// Owning instructor of a course, `None` if the course does not exist.
    pub async fn find_instructor_id(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a course exists and is published.
    pub async fn is_published(pool: &PgPool, course_id: DbId) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar("SELECT is_published FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an unpublished course owned by `instructor_id`.
    pub async fn create(
        pool: &PgPool,
        instructor_id: DbId,
        input: &CreateCourse,
    ) -> Result<Course, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO courses
                (title, description, instructor_id, category_id, thumbnail_url,
                 duration_hours, level, price)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8::NUMERIC / 100)
             RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(instructor_id)
        .bind(input.category_id)
        .bind(&input.thumbnail_url)
        .bind(input.duration_hours)
        .bind(&input.level)
        .bind(input.price_cents)
        .fetch_one(pool)
        .await?;

        let query = format!("{} WHERE c.id = $1", select_courses());
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category_id = COALESCE($4, category_id),
                thumbnail_url = COALESCE($5, thumbnail_url),
                duration_hours = COALESCE($6, duration_hours),
                level = COALESCE($7, level),
                price = COALESCE($8::NUMERIC / 100, price)
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(&input.thumbnail_url)
        .bind(input.duration_hours)
        .bind(&input.level)
        .bind(input.price_cents)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a course and, by cascade, its sections, lessons, enrollments
    /// and reviews. Returns `true` if the row existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_published(
        pool: &PgPool,
        id: DbId,
        is_published: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE courses SET is_published = $2 WHERE id = $1")
            .bind(id)
            .bind(is_published)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_sections(pool: &PgPool, course_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sections WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(pool)
            .await
    }
}
