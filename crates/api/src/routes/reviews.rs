//! Route definitions for the `/reviews` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// POST   /                          -> submit (student)
/// DELETE /{id}                      -> delete (student, own review)
/// GET    /course/{course_id}        -> list_for_course
/// GET    /course/{course_id}/rating -> rating
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::submit))
        .route("/{id}", delete(reviews::delete))
        .route("/course/{course_id}", get(reviews::list_for_course))
        .route("/course/{course_id}/rating", get(reviews::rating))
}
