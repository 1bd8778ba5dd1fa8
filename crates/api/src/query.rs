//! Shared query parameter types for API handlers.

use lms_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` ready to bind.
    pub fn resolve(&self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            clamp_offset(self.offset),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_clamps_both_values() {
        let params = PaginationParams {
            limit: Some(1_000),
            offset: Some(-5),
        };
        assert_eq!(params.resolve(), (MAX_PAGE_LIMIT, 0));
        assert_eq!(PaginationParams::default().resolve(), (DEFAULT_PAGE_LIMIT, 0));
    }
}
