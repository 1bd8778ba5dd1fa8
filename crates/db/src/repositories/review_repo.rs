//! Repository for the `reviews` table.

use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review};

const SELECT: &str = "SELECT r.id, r.course_id, r.student_id,
            (u.first_name || ' ' || u.last_name) AS student_name,
            r.rating, r.comment, r.created_at
     FROM reviews r
     JOIN users u ON u.id = r.student_id";

pub struct ReviewRepo;

impl ReviewRepo {
    /// Insert a review. A second review by the same student for the same
    /// course violates `uq_reviews_course_student`.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO reviews (course_id, student_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(input.course_id)
        .bind(input.student_id)
        .bind(input.rating)
        .bind(&input.comment)
        .fetch_one(pool)
        .await?;

        let query = format!("{SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("{SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Reviews for a course, newest first.
    pub async fn list_by_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!("{SELECT} WHERE r.course_id = $1 ORDER BY r.created_at DESC, r.id DESC");
        sqlx::query_as::<_, Review>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Raw `AVG(rating)`, `None` when the course has no reviews.
    pub async fn average_rating(pool: &PgPool, course_id: DbId) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar("SELECT AVG(rating)::float8 FROM reviews WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
