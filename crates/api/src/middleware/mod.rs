//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the user behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- `admin` only.
//! - [`rbac::RequireInstructor`] -- `instructor` or `admin`.
//! - [`rbac::RequireStudent`] -- `student` only.
//! - [`rbac::RequireAuth`] -- any authenticated user.

pub mod auth;
pub mod rbac;
