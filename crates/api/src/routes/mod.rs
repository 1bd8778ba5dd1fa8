pub mod auth;
pub mod categories;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod lessons;
pub mod reviews;
pub mod sections;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/validate-token                             token status (public)
/// /auth/logout                                     logout (requires auth)
///
/// /users                                           list (admin)
/// /users/{id}                                      get (admin)
/// /users/{id}/activate                             activate (admin)
/// /users/{id}/deactivate                           deactivate (admin)
///
/// /categories                                      list, create (admin)
/// /categories/{id}                                 get, delete (admin)
///
/// /courses                                         list published, create
/// /courses/{id}                                    get, update, delete
/// /courses/{id}/publish                            publish (POST)
/// /courses/{id}/unpublish                          unpublish (POST)
/// /courses/category/{id}                           published courses in category
/// /courses/instructor/{id}                         published courses by instructor
/// /courses/instructor/me                           caller's courses incl. drafts
/// /courses/{id}/sections                           outline, create section
/// /courses/{id}/sections/{section_id}              update, delete section
/// /courses/{id}/progress                           caller's progress (student)
/// /courses/{id}/progress/recompute                 recompute progress (student)
/// /courses/{id}/last-lesson                        last accessed lesson (student)
///
/// /sections/{section_id}/lessons                   create lesson
/// /sections/{section_id}/lessons/{lesson_id}       update, delete lesson
///
/// /lessons/{lesson_id}/complete                    mark completed (student)
///
/// /enrollments/my-courses                          enrolled course ids
/// /enrollments/mine                                enrollments with progress
/// /enrollments/{course_id}                         enroll, unenroll (student)
/// /enrollments/{course_id}/check                   enrollment status
///
/// /reviews                                         submit (student)
/// /reviews/{id}                                    delete own review (student)
/// /reviews/course/{course_id}                      list reviews
/// /reviews/course/{course_id}/rating               average rating
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes.
        .nest("/auth", auth::router())
        // User administration.
        .nest("/users", users::router())
        // Catalog.
        .nest("/categories", categories::router())
        // Courses, their outline and per-student progress.
        .nest("/courses", courses::router())
        // Lesson authoring under a section.
        .nest("/sections", sections::router())
        // Lesson completion.
        .nest("/lessons", lessons::router())
        .nest("/enrollments", enrollments::router())
        .nest("/reviews", reviews::router())
}
