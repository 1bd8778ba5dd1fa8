//! Route definitions for lesson authoring under `/sections`.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::lessons;
use crate::state::AppState;

/// Routes mounted at `/sections`.
///
/// ```text
/// POST   /{section_id}/lessons              -> create
/// PUT    /{section_id}/lessons/{lesson_id}  -> update
/// DELETE /{section_id}/lessons/{lesson_id}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{section_id}/lessons", post(lessons::create))
        .route(
            "/{section_id}/lessons/{lesson_id}",
            put(lessons::update).delete(lessons::delete),
        )
}
