//! Route definitions for `/lessons`.

use axum::routing::post;
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/lessons`.
///
/// ```text
/// POST /{lesson_id}/complete  -> complete_lesson (student)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{lesson_id}/complete", post(progress::complete_lesson))
}
