//! Handlers for the `/enrollments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::enrollment::{is_enrolled, EnrollmentState};
use lms_core::types::{DbId, Timestamp};
use lms_db::models::enrollment::EnrollmentSummary;
use lms_db::repositories::{EnrollmentRepo, ProgressRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAuth, RequireStudent};
use crate::response::DataResponse;
use crate::state::AppState;

/// Enrollment as returned by the enroll endpoint.
#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub id: DbId,
    pub course_id: DbId,
    pub status: &'static str,
    pub progress_percentage: f64,
    pub enrolled_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl From<EnrollmentState> for EnrollmentResponse {
    fn from(state: EnrollmentState) -> Self {
        Self {
            id: state.id,
            course_id: state.course_id,
            status: state.status.as_str(),
            progress_percentage: state.progress.as_f64(),
            enrolled_at: state.enrolled_at,
            completed_at: state.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnrollmentCheck {
    pub enrolled: bool,
}

/// POST /api/v1/enrollments/{course_id}
///
/// Enroll the caller in a published course. A cancelled enrollment is
/// reactivated with its previous progress.
pub async fn enroll(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<EnrollmentResponse>>)> {
    let enrollment = ProgressRepo::enroll(&state.pool, user.user_id, course_id).await?;
    tracing::info!(
        student_id = user.user_id,
        course_id,
        status = enrollment.status.as_str(),
        "Student enrolled"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: enrollment.into(),
        }),
    ))
}

/// DELETE /api/v1/enrollments/{course_id}
///
/// Behaviour follows the configured unenroll policy.
pub async fn unenroll(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let policy = state.config.unenroll_policy;
    ProgressRepo::unenroll(&state.pool, user.user_id, course_id, policy).await?;
    tracing::info!(student_id = user.user_id, course_id, %policy, "Student unenrolled");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/enrollments/{course_id}/check
pub async fn check(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<EnrollmentCheck>>> {
    let status = EnrollmentRepo::find_status(&state.pool, user.user_id, course_id).await?;
    Ok(Json(DataResponse {
        data: EnrollmentCheck {
            enrolled: is_enrolled(status),
        },
    }))
}

/// GET /api/v1/enrollments/my-courses
///
/// Ids of the courses the caller can access.
pub async fn my_course_ids(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<DbId>>>> {
    let ids = EnrollmentRepo::list_course_ids(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: ids }))
}

/// GET /api/v1/enrollments/mine
pub async fn mine(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EnrollmentSummary>>>> {
    let enrollments = EnrollmentRepo::list_for_student(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: enrollments }))
}
