//! Handlers for the `/reviews` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::enrollment::is_enrolled;
use lms_core::error::CoreError;
use lms_core::review::{average_rating, validate_comment, validate_rating};
use lms_core::types::DbId;
use lms_db::models::review::{CreateReview, Review};
use lms_db::repositories::{CourseRepo, EnrollmentRepo, ReviewRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /reviews`.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    pub course_id: DbId,
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CourseRating {
    pub course_id: DbId,
    pub average_rating: f64,
}

/// GET /api/v1/reviews/course/{course_id}
pub async fn list_for_course(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Review>>>> {
    let reviews = ReviewRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(DataResponse { data: reviews }))
}

/// GET /api/v1/reviews/course/{course_id}/rating
pub async fn rating(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseRating>>> {
    let avg = ReviewRepo::average_rating(&state.pool, course_id).await?;
    Ok(Json(DataResponse {
        data: CourseRating {
            course_id,
            average_rating: average_rating(avg),
        },
    }))
}

/// POST /api/v1/reviews
///
/// One review per student and course, only while enrolled. An unknown course
/// is 404 before enrollment is considered.
pub async fn submit(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<SubmitReviewRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Review>>)> {
    validate_rating(input.rating)?;
    let comment = input
        .comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    validate_comment(comment.as_deref())?;

    CourseRepo::find_instructor_id(&state.pool, input.course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: input.course_id,
        }))?;

    let status = EnrollmentRepo::find_status(&state.pool, user.user_id, input.course_id).await?;
    if !is_enrolled(status) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not enrolled in this course".into(),
        )));
    }

    let review = ReviewRepo::create(
        &state.pool,
        &CreateReview {
            course_id: input.course_id,
            student_id: user.user_id,
            rating: input.rating,
            comment,
        },
    )
    .await?;
    tracing::info!(
        review_id = review.id,
        course_id = review.course_id,
        student_id = user.user_id,
        "Review submitted"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// DELETE /api/v1/reviews/{id}
///
/// Students may only delete their own reviews.
pub async fn delete(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let review = ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Review", id }))?;

    if review.student_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only delete your own reviews".into(),
        )));
    }

    ReviewRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
