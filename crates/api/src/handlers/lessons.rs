//! Handlers for lessons, addressed through their section.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::course::{validate_content_type, validate_order_index, validate_title};
use lms_core::error::CoreError;
use lms_core::types::DbId;
use lms_db::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use lms_db::repositories::{LessonRepo, SectionRepo};

use super::courses::ensure_course_owner;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_duration_minutes(minutes: Option<i32>) -> Result<(), CoreError> {
    match minutes {
        Some(m) if m < 0 => Err(CoreError::Validation(
            "Duration must not be negative".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Resolve the section's course and check the caller owns it.
async fn ensure_section_owner(state: &AppState, section_id: DbId, user: &AuthUser) -> AppResult<()> {
    let section = SectionRepo::find_by_id(&state.pool, section_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id: section_id,
        }))?;
    ensure_course_owner(state, section.course_id, user).await
}

/// POST /api/v1/sections/{section_id}/lessons
pub async fn create(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
    Json(mut input): Json<CreateLesson>,
) -> AppResult<(StatusCode, Json<DataResponse<Lesson>>)> {
    validate_title(&input.title)?;
    validate_content_type(&input.content_type)?;
    validate_order_index(input.order_index)?;
    validate_duration_minutes(input.duration_minutes)?;
    input.title = input.title.trim().to_string();

    ensure_section_owner(&state, section_id, &user).await?;

    let lesson = LessonRepo::create(&state.pool, section_id, &input).await?;
    tracing::debug!(section_id, lesson_id = lesson.id, "Lesson created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

/// PUT /api/v1/sections/{section_id}/lessons/{lesson_id}
pub async fn update(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path((section_id, lesson_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateLesson>,
) -> AppResult<Json<DataResponse<Lesson>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
        input.title = Some(title.trim().to_string());
    }
    if let Some(content_type) = &input.content_type {
        validate_content_type(content_type)?;
    }
    if let Some(order_index) = input.order_index {
        validate_order_index(order_index)?;
    }
    validate_duration_minutes(input.duration_minutes)?;

    ensure_section_owner(&state, section_id, &user).await?;

    let lesson = LessonRepo::update(&state.pool, section_id, lesson_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }))?;
    Ok(Json(DataResponse { data: lesson }))
}

/// DELETE /api/v1/sections/{section_id}/lessons/{lesson_id}
///
/// Completion records for the lesson are removed with it. Stored progress
/// catches up on the student's next completion or recompute.
pub async fn delete(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path((section_id, lesson_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_section_owner(&state, section_id, &user).await?;
    if !LessonRepo::delete(&state.pool, section_id, lesson_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
