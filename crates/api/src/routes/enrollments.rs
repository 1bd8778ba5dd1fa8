//! Route definitions for the `/enrollments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::enrollments;
use crate::state::AppState;

/// Routes mounted at `/enrollments`.
///
/// ```text
/// GET    /my-courses         -> my_course_ids
/// GET    /mine               -> mine
/// POST   /{course_id}        -> enroll (student)
/// DELETE /{course_id}        -> unenroll (student)
/// GET    /{course_id}/check  -> check
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my-courses", get(enrollments::my_course_ids))
        .route("/mine", get(enrollments::mine))
        .route(
            "/{course_id}",
            post(enrollments::enroll).delete(enrollments::unenroll),
        )
        .route("/{course_id}/check", get(enrollments::check))
}
