//! Enrollment row model.

use lms_core::enrollment::{EnrollmentState, EnrollmentStatus, StatusId};
use lms_core::progress::Percentage;
use lms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An enrollment row. `progress_percentage` is read as `float8`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub status_id: StatusId,
    pub progress_percentage: f64,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<Enrollment> for EnrollmentState {
    type Error = sqlx::Error;

    fn try_from(row: Enrollment) -> Result<Self, Self::Error> {
        let status = EnrollmentStatus::from_id(row.status_id).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown enrollment status id {}", row.status_id).into())
        })?;
        Ok(Self {
            id: row.id,
            student_id: row.student_id,
            course_id: row.course_id,
            status,
            progress: Percentage::from_stored(row.progress_percentage),
            enrolled_at: row.enrolled_at,
            completed_at: row.completed_at,
        })
    }
}

/// A student's enrollment joined with course and status display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentSummary {
    pub id: DbId,
    pub course_id: DbId,
    pub course_title: String,
    pub instructor_name: String,
    pub thumbnail_url: Option<String>,
    pub status: String,
    pub progress_percentage: f64,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
