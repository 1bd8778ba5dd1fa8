//! Lesson completion ledger model.

use lms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `lesson_completions`. One per (student, lesson).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonCompletion {
    pub id: DbId,
    pub student_id: DbId,
    pub lesson_id: DbId,
    pub is_completed: bool,
    pub last_accessed_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
