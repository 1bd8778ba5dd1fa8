//! Course review rules (rating bounds, comment length, average rating).

use crate::error::CoreError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Maximum length for a review comment.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Validate a star rating in `MIN_RATING..=MAX_RATING`.
pub fn validate_rating(rating: i16) -> Result<(), CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )))
    }
}

pub fn validate_comment(comment: Option<&str>) -> Result<(), CoreError> {
    match comment {
        Some(c) if c.chars().count() > MAX_COMMENT_LENGTH => Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        ))),
        _ => Ok(()),
    }
}

/// Round a database `AVG(rating)` to two decimals, `0.0` when a course has no
/// reviews.
pub fn average_rating(avg: Option<f64>) -> f64 {
    avg.map(|a| (a * 100.0).round() / 100.0).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn comment_length() {
        assert!(validate_comment(None).is_ok());
        assert!(validate_comment(Some("Clear and well paced")).is_ok());
        assert!(validate_comment(Some(&"a".repeat(MAX_COMMENT_LENGTH + 1))).is_err());
    }

    #[test]
    fn average_defaults_to_zero() {
        assert_eq!(average_rating(None), 0.0);
        assert_eq!(average_rating(Some(4.333_333)), 4.33);
    }
}
