//! Route definitions for the `/courses` resource.
//!
//! Every route uses `{id}` for the course segment so the path tree has a
//! single parameter name at that position.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{courses, progress, sections};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                              -> list
/// POST   /                              -> create
/// GET    /category/{id}                 -> list_by_category
/// GET    /instructor/me                 -> list_mine
/// GET    /instructor/{id}               -> list_by_instructor
/// GET    /{id}                          -> get_by_id
/// PUT    /{id}                          -> update
/// DELETE /{id}                          -> delete
/// POST   /{id}/publish                  -> publish
/// POST   /{id}/unpublish                -> unpublish
/// GET    /{id}/sections                 -> sections::outline
/// POST   /{id}/sections                 -> sections::create
/// PUT    /{id}/sections/{section_id}    -> sections::update
/// DELETE /{id}/sections/{section_id}    -> sections::delete
/// GET    /{id}/progress                 -> progress::course_progress
/// POST   /{id}/progress/recompute       -> progress::recompute
/// GET    /{id}/last-lesson              -> progress::last_lesson
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list).post(courses::create))
        .route("/category/{id}", get(courses::list_by_category))
        .route("/instructor/me", get(courses::list_mine))
        .route("/instructor/{id}", get(courses::list_by_instructor))
        .route(
            "/{id}",
            get(courses::get_by_id)
                .put(courses::update)
                .delete(courses::delete),
        )
        .route("/{id}/publish", post(courses::publish))
        .route("/{id}/unpublish", post(courses::unpublish))
        .route(
            "/{id}/sections",
            get(sections::outline).post(sections::create),
        )
        .route(
            "/{id}/sections/{section_id}",
            put(sections::update).delete(sections::delete),
        )
        .route("/{id}/progress", get(progress::course_progress))
        .route("/{id}/progress/recompute", post(progress::recompute))
        .route("/{id}/last-lesson", get(progress::last_lesson))
}
