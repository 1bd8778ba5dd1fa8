//! Lesson model and DTOs.

use lms_core::progress::LessonRef;
use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lesson {
    pub id: DbId,
    pub section_id: DbId,
    pub title: String,
    pub content_type: String,
    pub content_url: Option<String>,
    pub text_content: Option<String>,
    pub duration_minutes: Option<i32>,
    pub order_index: i32,
    pub is_free: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A lesson resolved through its section to the owning course.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct LessonLocation {
    pub lesson_id: DbId,
    pub section_id: DbId,
    pub course_id: DbId,
    pub is_free: bool,
}

impl From<LessonLocation> for LessonRef {
    fn from(row: LessonLocation) -> Self {
        Self {
            lesson_id: row.lesson_id,
            section_id: row.section_id,
            course_id: row.course_id,
            is_free: row.is_free,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLesson {
    pub title: String,
    pub content_type: String,
    pub content_url: Option<String>,
    pub text_content: Option<String>,
    pub duration_minutes: Option<i32>,
    pub order_index: i32,
    pub is_free: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLesson {
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub content_url: Option<String>,
    pub text_content: Option<String>,
    pub duration_minutes: Option<i32>,
    pub order_index: Option<i32>,
    pub is_free: Option<bool>,
}
