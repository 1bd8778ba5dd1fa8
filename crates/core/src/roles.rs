//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in
//! `20260301000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_STUDENT: &str = "student";

/// Roles a user may pick when registering. Admins are provisioned out of band.
pub const SELF_REGISTER_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_INSTRUCTOR];

/// Whether `role` is one of the known role names.
pub fn is_known_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_INSTRUCTOR | ROLE_STUDENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_cannot_self_register() {
        assert!(!SELF_REGISTER_ROLES.contains(&ROLE_ADMIN));
        assert!(SELF_REGISTER_ROLES.contains(&ROLE_STUDENT));
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(is_known_role("instructor"));
        assert!(!is_known_role("Instructor"));
        assert!(!is_known_role("creator"));
    }
}
