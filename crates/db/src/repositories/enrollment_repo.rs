//! Read-side queries for the `enrollments` table.
//!
//! Writes go through [`crate::repositories::ProgressRepo`] so they share the
//! enrollment row lock with lesson completion.

use lms_core::enrollment::{access_status_ids, EnrollmentStatus};
use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{Enrollment, EnrollmentSummary};

const COLUMNS: &str = "id, student_id, course_id, status_id, \
                       progress_percentage::float8 AS progress_percentage, \
                       enrolled_at, completed_at, created_at, updated_at";

pub struct EnrollmentRepo;

impl EnrollmentRepo {
    pub async fn find(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Status of the (student, course) enrollment, `None` when there is no row
    /// or the stored id is not a known status.
    pub async fn find_status(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<EnrollmentStatus>, sqlx::Error> {
        let status_id: Option<i16> = sqlx::query_scalar(
            "SELECT status_id FROM enrollments WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await?;
        Ok(status_id.and_then(EnrollmentStatus::from_id))
    }

    /// Ids of the courses a student currently has access to.
    pub async fn list_course_ids(pool: &PgPool, student_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT course_id FROM enrollments
             WHERE student_id = $1 AND status_id = ANY($2)
             ORDER BY enrolled_at DESC, id DESC",
        )
        .bind(student_id)
        .bind(access_status_ids())
        .fetch_all(pool)
        .await
    }

    /// A student's live enrollments with course display fields and progress.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<EnrollmentSummary>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentSummary>(
            "SELECT e.id, e.course_id, c.title AS course_title,
                    (u.first_name || ' ' || u.last_name) AS instructor_name,
                    c.thumbnail_url, st.name AS status,
                    e.progress_percentage::float8 AS progress_percentage,
                    e.enrolled_at, e.completed_at
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             JOIN users u ON u.id = c.instructor_id
             JOIN enrollment_statuses st ON st.id = e.status_id
             WHERE e.student_id = $1 AND e.status_id = ANY($2)
             ORDER BY e.enrolled_at DESC, e.id DESC",
        )
        .bind(student_id)
        .bind(access_status_ids())
        .fetch_all(pool)
        .await
    }
}
