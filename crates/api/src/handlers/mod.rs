//! Request handlers, one module per resource.

pub mod auth;
pub mod categories;
pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod progress;
pub mod reviews;
pub mod sections;
pub mod users;
