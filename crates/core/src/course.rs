//! Course catalog rules: levels, lesson content types, field limits and the
//! ownership / publishing checks used by the authoring endpoints.

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length for course, section and lesson titles.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// Course duration bounds, in hours.
pub const MIN_DURATION_HOURS: i32 = 1;
pub const MAX_DURATION_HOURS: i32 = 1_000;

/// Upper price bound in cents (10 000.00).
pub const MAX_PRICE_CENTS: i64 = 1_000_000;

pub const LEVEL_BEGINNER: &str = "beginner";
pub const LEVEL_INTERMEDIATE: &str = "intermediate";
pub const LEVEL_ADVANCED: &str = "advanced";

/// All valid course levels. Must match `chk_courses_level`.
pub const VALID_LEVELS: &[&str] = &[LEVEL_BEGINNER, LEVEL_INTERMEDIATE, LEVEL_ADVANCED];

pub const CONTENT_VIDEO: &str = "video";
pub const CONTENT_TEXT: &str = "text";
pub const CONTENT_QUIZ: &str = "quiz";
pub const CONTENT_DOCUMENT: &str = "document";

/// All valid lesson content types. Must match `chk_lessons_content_type`.
pub const VALID_CONTENT_TYPES: &[&str] =
    &[CONTENT_VIDEO, CONTENT_TEXT, CONTENT_QUIZ, CONTENT_DOCUMENT];

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a level is one of the accepted values.
pub fn validate_level(level: &str) -> Result<(), CoreError> {
    if VALID_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid level '{level}'. Must be one of: {}",
            VALID_LEVELS.join(", ")
        )))
    }
}

/// Validate that a lesson content type is one of the accepted values.
pub fn validate_content_type(content_type: &str) -> Result<(), CoreError> {
    if VALID_CONTENT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid content type '{content_type}'. Must be one of: {}",
            VALID_CONTENT_TYPES.join(", ")
        )))
    }
}

/// Validate a non-blank title within [`MAX_TITLE_LENGTH`].
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_duration_hours(hours: Option<i32>) -> Result<(), CoreError> {
    match hours {
        Some(h) if !(MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&h) => {
            Err(CoreError::Validation(format!(
                "Duration must be between {MIN_DURATION_HOURS} and {MAX_DURATION_HOURS} hours"
            )))
        }
        _ => Ok(()),
    }
}

pub fn validate_price_cents(cents: i64) -> Result<(), CoreError> {
    if (0..=MAX_PRICE_CENTS).contains(&cents) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Price must be between 0 and 10000".to_string(),
        ))
    }
}

/// Lesson and section positions are zero-based.
pub fn validate_order_index(order_index: i32) -> Result<(), CoreError> {
    if order_index < 0 {
        return Err(CoreError::Validation(
            "Order index must not be negative".to_string(),
        ));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Authoring checks
-------------------------------------------------------------------------- */

/// Only the course's instructor may change it; admins may change any course.
pub fn ensure_can_manage(
    course_instructor_id: DbId,
    user_id: DbId,
    user_role: &str,
) -> Result<(), CoreError> {
    if user_role == ROLE_ADMIN || course_instructor_id == user_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You do not own this course".to_string(),
        ))
    }
}

/// A course needs at least one section before it can be published.
pub fn ensure_publishable(section_count: i64) -> Result<(), CoreError> {
    if section_count < 1 {
        return Err(CoreError::Validation(
            "Course must have at least one section before publishing".to_string(),
        ));
    }
    Ok(())
}
