//! Course review model and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A review joined with the reviewer's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub course_id: DbId,
    pub student_id: DbId,
    pub student_name: String,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateReview {
    pub course_id: DbId,
    pub student_id: DbId,
    pub rating: i16,
    pub comment: Option<String>,
}
