//! Route definitions for the `/users` resource (admin only).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET  /                 -> list
/// GET  /{id}             -> get_by_id
/// POST /{id}/activate    -> activate
/// POST /{id}/deactivate  -> deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/{id}", get(users::get_by_id))
        .route("/{id}/activate", post(users::activate))
        .route("/{id}/deactivate", post(users::deactivate))
}
