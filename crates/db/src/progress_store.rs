//! PostgreSQL implementation of the progress engine's store.
//!
//! One [`PgProgressStore`] is one transaction. `lock_enrollment` takes a
//! `FOR UPDATE` lock on the enrollment row, so concurrent completions for the
//! same (student, course) serialize while other enrollments proceed.

use async_trait::async_trait;
use lms_core::enrollment::{EnrollmentState, EnrollmentStatus};
use lms_core::progress::{CourseRef, LessonRef, ProgressStore};
use lms_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::enrollment::Enrollment;
use crate::models::lesson::LessonLocation;

const ENROLLMENT_COLUMNS: &str = "id, student_id, course_id, status_id, \
                                  progress_percentage::float8 AS progress_percentage, \
                                  enrolled_at, completed_at, created_at, updated_at";

pub struct PgProgressStore {
    tx: Transaction<'static, Postgres>,
}

impl PgProgressStore {
    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    type Error = sqlx::Error;

    async fn find_lesson(&mut self, lesson_id: DbId) -> Result<Option<LessonRef>, sqlx::Error> {
        let row = sqlx::query_as::<_, LessonLocation>(
            "SELECT l.id AS lesson_id, l.section_id, s.course_id, l.is_free
             FROM lessons l
             JOIN sections s ON s.id = l.section_id
             WHERE l.id = $1",
        )
        .bind(lesson_id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(LessonRef::from))
    }

    async fn find_course(&mut self, course_id: DbId) -> Result<Option<CourseRef>, sqlx::Error> {
        let row: Option<(DbId, bool)> =
            sqlx::query_as("SELECT id, is_published FROM courses WHERE id = $1")
                .bind(course_id)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(row.map(|(course_id, is_published)| CourseRef {
            course_id,
            is_published,
        }))
    }

    async fn lock_enrollment(
        &mut self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<EnrollmentState>, sqlx::Error> {
        let query = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments
             WHERE student_id = $1 AND course_id = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .map(EnrollmentState::try_from)
            .transpose()
    }

    async fn insert_enrollment(
        &mut self,
        student_id: DbId,
        course_id: DbId,
        now: Timestamp,
    ) -> Result<EnrollmentState, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (student_id, course_id, status_id, progress_percentage, enrolled_at)
             VALUES ($1, $2, $3, 0, $4)
             RETURNING {ENROLLMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .bind(EnrollmentStatus::Active.id())
            .bind(now)
            .fetch_one(&mut *self.tx)
            .await?;
        EnrollmentState::try_from(row)
    }

    async fn save_enrollment(&mut self, enrollment: &EnrollmentState) -> Result<(), sqlx::Error> {
        // Hundredths are bound as an integer so the NUMERIC(5,2) value is exact.
        sqlx::query(
            "UPDATE enrollments SET
                status_id = $2,
                progress_percentage = $3::NUMERIC / 100,
                completed_at = $4
             WHERE id = $1",
        )
        .bind(enrollment.id)
        .bind(enrollment.status.id())
        .bind(enrollment.progress.hundredths() as i32)
        .bind(enrollment.completed_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_enrollment(&mut self, enrollment_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(enrollment_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn upsert_completion(
        &mut self,
        student_id: DbId,
        lesson_id: DbId,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO lesson_completions
                (student_id, lesson_id, is_completed, last_accessed_at, completed_at)
             VALUES ($1, $2, true, $3, $3)
             ON CONFLICT ON CONSTRAINT uq_lesson_completions_student_lesson DO UPDATE SET
                is_completed = true,
                last_accessed_at = EXCLUDED.last_accessed_at,
                completed_at = COALESCE(lesson_completions.completed_at, EXCLUDED.completed_at)",
        )
        .bind(student_id)
        .bind(lesson_id)
        .bind(now)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn count_course_lessons(&mut self, course_id: DbId) -> Result<u64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lessons l
             JOIN sections s ON s.id = l.section_id
             WHERE s.course_id = $1",
        )
        .bind(course_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn count_completed_lessons(
        &mut self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM lesson_completions lc
             JOIN lessons l ON l.id = lc.lesson_id
             JOIN sections s ON s.id = l.section_id
             WHERE lc.student_id = $1 AND s.course_id = $2 AND lc.is_completed",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn last_accessed_lesson(
        &mut self,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT lc.lesson_id FROM lesson_completions lc
             JOIN lessons l ON l.id = lc.lesson_id
             JOIN sections s ON s.id = l.section_id
             WHERE lc.student_id = $1 AND s.course_id = $2
             ORDER BY lc.last_accessed_at DESC, lc.id DESC
             LIMIT 1",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&mut *self.tx)
        .await
    }
}
