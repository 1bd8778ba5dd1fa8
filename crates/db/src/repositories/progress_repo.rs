//! Transactional entry points for enrollment writes and lesson progress.
//!
//! Each call runs the matching `lms_core::progress` operation inside one
//! [`PgProgressStore`] transaction and retries it a bounded number of times
//! on serialization failures and deadlocks.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use lms_core::enrollment::{EnrollmentState, UnenrollPolicy};
use lms_core::progress::{self, CompletionOutcome, Percentage, ProgressError};
use lms_core::types::DbId;
use sqlx::PgPool;

use crate::models::completion::LessonCompletion;
use crate::progress_store::PgProgressStore;

/// Attempts per operation, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

pub type ProgressDbError = ProgressError<sqlx::Error>;

pub struct ProgressRepo;

impl ProgressRepo {
    /// Record the lesson as completed and recompute the enrollment.
    pub async fn mark_lesson_complete(
        pool: &PgPool,
        student_id: DbId,
        lesson_id: DbId,
    ) -> Result<CompletionOutcome, ProgressDbError> {
        with_retry("mark_lesson_complete", || async move {
            let mut store = PgProgressStore::begin(pool).await.map_err(ProgressError::Store)?;
            let outcome =
                progress::mark_lesson_complete(&mut store, student_id, lesson_id, Utc::now())
                    .await?;
            store.commit().await.map_err(ProgressError::Store)?;
            Ok(outcome)
        })
        .await
    }

    /// Recompute and store the percentage. `None` when not enrolled.
    pub async fn recompute(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<EnrollmentState>, ProgressDbError> {
        with_retry("recompute_progress", || async move {
            let mut store = PgProgressStore::begin(pool).await.map_err(ProgressError::Store)?;
            let state =
                progress::recompute_progress(&mut store, student_id, course_id, Utc::now()).await?;
            store.commit().await.map_err(ProgressError::Store)?;
            Ok(state)
        })
        .await
    }

    /// Current percent-complete, computed from the ledger without writing.
    pub async fn course_progress(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Percentage, ProgressDbError> {
        let mut store = PgProgressStore::begin(pool).await.map_err(ProgressError::Store)?;
        let pct = progress::course_progress(&mut store, student_id, course_id).await?;
        store.commit().await.map_err(ProgressError::Store)?;
        Ok(pct)
    }

    pub async fn last_accessed_lesson(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<DbId>, ProgressDbError> {
        let mut store = PgProgressStore::begin(pool).await.map_err(ProgressError::Store)?;
        let lesson = progress::last_accessed_lesson(&mut store, student_id, course_id).await?;
        store.commit().await.map_err(ProgressError::Store)?;
        Ok(lesson)
    }

    pub async fn enroll(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<EnrollmentState, ProgressDbError> {
        with_retry("enroll", || async move {
            let mut store = PgProgressStore::begin(pool).await.map_err(ProgressError::Store)?;
            let state = progress::enroll(&mut store, student_id, course_id, Utc::now()).await?;
            store.commit().await.map_err(ProgressError::Store)?;
            Ok(state)
        })
        .await
    }

    pub async fn unenroll(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
        policy: UnenrollPolicy,
    ) -> Result<(), ProgressDbError> {
        with_retry("unenroll", || async move {
            let mut store = PgProgressStore::begin(pool).await.map_err(ProgressError::Store)?;
            progress::unenroll(&mut store, student_id, course_id, policy).await?;
            store.commit().await.map_err(ProgressError::Store)?;
            Ok(())
        })
        .await
    }

    /// The ledger row for (student, lesson), if any.
    pub async fn find_completion(
        pool: &PgPool,
        student_id: DbId,
        lesson_id: DbId,
    ) -> Result<Option<LessonCompletion>, sqlx::Error> {
        sqlx::query_as::<_, LessonCompletion>(
            "SELECT id, student_id, lesson_id, is_completed, last_accessed_at, completed_at
             FROM lesson_completions
             WHERE student_id = $1 AND lesson_id = $2",
        )
        .bind(student_id)
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
    }
}

/// Serialization failure or deadlock: safe to rerun the whole transaction.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("40001" | "40P01")),
        _ => false,
    }
}

async fn with_retry<T, F, Fut>(op: &'static str, mut run: F) -> Result<T, ProgressDbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProgressDbError>>,
{
    let mut attempt = 1;
    loop {
        match run().await {
            Err(ProgressError::Store(e)) if attempt < MAX_ATTEMPTS && is_transient(&e) => {
                tracing::warn!(op, attempt, error = %e, "Transient database conflict, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
