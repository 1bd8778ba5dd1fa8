//! Handlers for course sections and the public course outline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::course::{validate_order_index, validate_title};
use lms_core::error::CoreError;
use lms_core::types::DbId;
use lms_db::models::section::{CreateSection, Section, SectionWithLessons, UpdateSection};
use lms_db::repositories::{CourseRepo, SectionRepo};

use super::courses::{can_view, ensure_course_owner};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

fn section_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Section", id })
}

/// GET /api/v1/courses/{id}/sections
///
/// Sections with their lessons. Drafts are only outlined for their owner or
/// an admin.
pub async fn outline(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SectionWithLessons>>>> {
    let course = CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .filter(|c| can_view(c.is_published, c.instructor_id, user.as_ref()))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    let outline = SectionRepo::outline(&state.pool, course.id).await?;
    Ok(Json(DataResponse { data: outline }))
}

/// POST /api/v1/courses/{id}/sections
pub async fn create(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Json(mut input): Json<CreateSection>,
) -> AppResult<(StatusCode, Json<DataResponse<Section>>)> {
    validate_title(&input.title)?;
    validate_order_index(input.order_index)?;
    input.title = input.title.trim().to_string();

    ensure_course_owner(&state, course_id, &user).await?;

    let section = SectionRepo::create(&state.pool, course_id, &input).await?;
    tracing::debug!(course_id, section_id = section.id, "Section created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: section })))
}

/// PUT /api/v1/courses/{id}/sections/{section_id}
pub async fn update(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateSection>,
) -> AppResult<Json<DataResponse<Section>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
        input.title = Some(title.trim().to_string());
    }
    if let Some(order_index) = input.order_index {
        validate_order_index(order_index)?;
    }

    ensure_course_owner(&state, course_id, &user).await?;

    let section = SectionRepo::update(&state.pool, course_id, section_id, &input)
        .await?
        .ok_or_else(|| section_not_found(section_id))?;
    Ok(Json(DataResponse { data: section }))
}

/// DELETE /api/v1/courses/{id}/sections/{section_id}
///
/// Lessons in the section go with it.
pub async fn delete(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path((course_id, section_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_course_owner(&state, course_id, &user).await?;
    if !SectionRepo::delete(&state.pool, course_id, section_id).await? {
        return Err(section_not_found(section_id));
    }
    Ok(StatusCode::NO_CONTENT)
}
