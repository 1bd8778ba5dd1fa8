//! Course entity model and DTOs.

use lms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course row joined with the display fields every listing needs.
///
/// `price_cents` is `courses.price * 100`; `average_rating` is `0` when the
/// course has no reviews.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub instructor_id: DbId,
    pub instructor_name: String,
    pub category_id: DbId,
    pub category_name: String,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub duration_hours: Option<i32>,
    pub level: String,
    pub price_cents: i64,
    pub enrollment_count: i64,
    pub average_rating: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a course. New courses start unpublished.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub category_id: DbId,
    pub thumbnail_url: Option<String>,
    pub duration_hours: Option<i32>,
    pub level: String,
    pub price_cents: i64,
}

/// DTO for updating a course. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub thumbnail_url: Option<String>,
    pub duration_hours: Option<i32>,
    pub level: Option<String>,
    pub price_cents: Option<i64>,
}
