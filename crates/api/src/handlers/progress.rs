//! Handlers for lesson completion and course progress.

use axum::extract::{Path, State};
use axum::Json;
use lms_core::progress::{CompletionOutcome, Percentage};
use lms_core::types::DbId;
use lms_db::repositories::ProgressRepo;

use super::enrollments::EnrollmentResponse;
use crate::error::AppResult;
use crate::middleware::rbac::RequireStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/lessons/{lesson_id}/complete
///
/// Mark a lesson completed for the caller and return the course's new
/// progress. Repeating the call is harmless.
pub async fn complete_lesson(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CompletionOutcome>>> {
    let outcome = ProgressRepo::mark_lesson_complete(&state.pool, user.user_id, lesson_id).await?;
    tracing::info!(
        student_id = user.user_id,
        lesson_id,
        course_id = outcome.course_id,
        progress = %outcome.progress,
        course_completed = outcome.course_completed,
        "Lesson completed"
    );
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/courses/{id}/progress
pub async fn course_progress(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Percentage>>> {
    let pct = ProgressRepo::course_progress(&state.pool, user.user_id, course_id).await?;
    Ok(Json(DataResponse { data: pct }))
}

/// GET /api/v1/courses/{id}/last-lesson
///
/// `null` when the caller has not opened any lesson of the course.
pub async fn last_lesson(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<DbId>>>> {
    let lesson = ProgressRepo::last_accessed_lesson(&state.pool, user.user_id, course_id).await?;
    Ok(Json(DataResponse { data: lesson }))
}

/// POST /api/v1/courses/{id}/progress/recompute
///
/// Re-derive the stored percentage from completion records. `null` when the
/// caller has no enrollment in the course.
pub async fn recompute(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Option<EnrollmentResponse>>>> {
    let enrollment = ProgressRepo::recompute(&state.pool, user.user_id, course_id).await?;
    Ok(Json(DataResponse {
        data: enrollment.map(EnrollmentResponse::from),
    }))
}
