//! Handlers for the `/courses` resource: catalog browsing and instructor
//! authoring.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::course::{
    ensure_can_manage, ensure_publishable, validate_duration_hours, validate_level,
    validate_price_cents, validate_title,
};
use lms_core::error::CoreError;
use lms_core::types::DbId;
use lms_db::models::course::{Course, CreateCourse, UpdateCourse};
use lms_db::repositories::{CategoryRepo, CourseRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn course_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Course", id })
}

/// Verify the course exists and the caller may manage it.
pub(crate) async fn ensure_course_owner(
    state: &AppState,
    course_id: DbId,
    user: &AuthUser,
) -> AppResult<()> {
    let instructor_id = CourseRepo::find_instructor_id(&state.pool, course_id)
        .await?
        .ok_or_else(|| course_not_found(course_id))?;
    ensure_can_manage(instructor_id, user.user_id, &user.role)?;
    Ok(())
}

/// Drafts are only visible to their instructor and to admins.
pub(crate) fn can_view(course_is_published: bool, instructor_id: DbId, user: Option<&AuthUser>) -> bool {
    course_is_published
        || user.is_some_and(|u| u.is_admin() || u.user_id == instructor_id)
}

/* --------------------------------------------------------------------------
Catalog
-------------------------------------------------------------------------- */

/// GET /api/v1/courses
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let (limit, offset) = params.resolve();
    let courses = CourseRepo::list_published(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|c| can_view(c.is_published, c.instructor_id, user.as_ref()))
        .ok_or_else(|| course_not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

/// GET /api/v1/courses/category/{id}
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    if !CategoryRepo::exists(&state.pool, category_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }
    let courses = CourseRepo::list_by_category(&state.pool, category_id).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/instructor/{id}
pub async fn list_by_instructor(
    State(state): State<AppState>,
    Path(instructor_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let courses = CourseRepo::list_by_instructor(&state.pool, instructor_id, false).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/instructor/me
///
/// The caller's own courses, drafts included.
pub async fn list_mine(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let courses = CourseRepo::list_by_instructor(&state.pool, user.user_id, true).await?;
    Ok(Json(DataResponse { data: courses }))
}

/* --------------------------------------------------------------------------
Authoring
-------------------------------------------------------------------------- */

/// POST /api/v1/courses
///
/// New courses start as drafts owned by the caller.
pub async fn create(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Json(mut input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    validate_title(&input.title)?;
    validate_level(&input.level)?;
    validate_duration_hours(input.duration_hours)?;
    validate_price_cents(input.price_cents)?;
    input.title = input.title.trim().to_string();

    if !CategoryRepo::exists(&state.pool, input.category_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Category {} does not exist",
            input.category_id
        ))));
    }

    let course = CourseRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(course_id = course.id, instructor_id = user.user_id, "Course created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PUT /api/v1/courses/{id}
pub async fn update(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
        input.title = Some(title.trim().to_string());
    }
    if let Some(level) = &input.level {
        validate_level(level)?;
    }
    validate_duration_hours(input.duration_hours)?;
    if let Some(cents) = input.price_cents {
        validate_price_cents(cents)?;
    }

    ensure_course_owner(&state, id, &user).await?;

    if let Some(category_id) = input.category_id {
        if !CategoryRepo::exists(&state.pool, category_id).await? {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Category {category_id} does not exist"
            ))));
        }
    }

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| course_not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_course_owner(&state, id, &user).await?;
    if !CourseRepo::delete(&state.pool, id).await? {
        return Err(course_not_found(id));
    }
    tracing::info!(course_id = id, user_id = user.user_id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/courses/{id}/publish
pub async fn publish(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    ensure_course_owner(&state, id, &user).await?;
    ensure_publishable(CourseRepo::count_sections(&state.pool, id).await?)?;
    set_published(&state, id, true).await
}

/// POST /api/v1/courses/{id}/unpublish
///
/// Existing enrollments keep their access.
pub async fn unpublish(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    ensure_course_owner(&state, id, &user).await?;
    set_published(&state, id, false).await
}

async fn set_published(
    state: &AppState,
    id: DbId,
    is_published: bool,
) -> AppResult<Json<DataResponse<Course>>> {
    if !CourseRepo::set_published(&state.pool, id, is_published).await? {
        return Err(course_not_found(id));
    }
    tracing::info!(course_id = id, is_published, "Course visibility changed");
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| course_not_found(id))?;
    Ok(Json(DataResponse { data: course }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: DbId, role: &str) -> AuthUser {
        AuthUser {
            user_id: id,
            email: format!("u{id}@example.com"),
            role: role.to_string(),
        }
    }

    #[test]
    fn published_courses_are_public() {
        assert!(can_view(true, 1, None));
    }

    #[test]
    fn drafts_visible_to_owner_and_admin_only() {
        assert!(!can_view(false, 1, None));
        assert!(can_view(false, 1, Some(&user(1, "instructor"))));
        assert!(can_view(false, 1, Some(&user(9, "admin"))));
        assert!(!can_view(false, 1, Some(&user(9, "instructor"))));
        assert!(!can_view(false, 1, Some(&user(9, "student"))));
    }
}
