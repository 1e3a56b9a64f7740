use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::error::AppError;
use crate::shared::constants::MAX_PAGE_SIZE;

/// Error envelope returned for every non-2xx response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            message,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Zero-based offset/limit window over a listing.
///
/// Page `p` with size `s` covers items `[p*s, p*s+s)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    /// Build a page window, rejecting negative pages and sizes outside `1..=MAX_PAGE_SIZE`
    pub fn new(page: i64, size: i64) -> Result<Self, AppError> {
        if page < 0 {
            return Err(AppError::Validation(
                "page must be zero or greater".to_string(),
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(AppError::Validation(format!(
                "size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        Ok(Self { page, size })
    }

    /// SQL OFFSET for this page
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    /// SQL LIMIT for this page
    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Whether items remain past this page, given the current total.
    ///
    /// Only compares counts; a concurrent delete can still leave the next page empty.
    pub fn has_more(&self, total_count: i64) -> bool {
        self.page.saturating_add(1).saturating_mul(self.size) < total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_more_boundaries() {
        let first = PageRequest::new(0, 20).unwrap();
        let second = PageRequest::new(1, 20).unwrap();

        assert!(first.has_more(25));
        assert!(!second.has_more(25));
        assert!(!first.has_more(20));
        assert!(first.has_more(21));
        assert!(!first.has_more(0));
    }

    #[test]
    fn test_offset_and_limit() {
        let page = PageRequest::new(3, 7).unwrap();
        assert_eq!(page.offset(), 21);
        assert_eq!(page.limit(), 7);
    }

    #[test]
    fn test_has_more_does_not_overflow() {
        let page = PageRequest::new(i64::MAX, MAX_PAGE_SIZE).unwrap();
        assert!(!page.has_more(i64::MAX));
    }

    #[test]
    fn test_rejects_invalid_windows() {
        assert!(matches!(
            PageRequest::new(-1, 20),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(PageRequest::new(0, 0), Err(AppError::Validation(_))));
        assert!(matches!(
            PageRequest::new(0, MAX_PAGE_SIZE + 1),
            Err(AppError::Validation(_))
        ));
    }
}
