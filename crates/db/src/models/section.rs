//! Course section model and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::lesson::Lesson;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Section {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A section with its lessons in `order_index` order, for the course outline.
#[derive(Debug, Clone, Serialize)]
pub struct SectionWithLessons {
    #[serde(flatten)]
    pub section: Section,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSection {
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSection {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}
