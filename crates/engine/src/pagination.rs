//! Page-number pagination for list operations.

use crate::{EngineError, ResultEngine};

pub const DEFAULT_PAGE_LIMIT: u64 = 6;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// A 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request from optional query values, falling back to defaults.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        let default = Self::default();
        Self {
            page: page.unwrap_or(default.page),
            limit: limit.unwrap_or(default.limit),
        }
    }

    pub(crate) fn validate(self) -> ResultEngine<Self> {
        if self.page == 0 {
            return Err(EngineError::InvalidPage("page starts at 1".to_string()));
        }
        if self.limit == 0 {
            return Err(EngineError::InvalidPage(
                "limit must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            page: self.page,
            limit: self.limit.min(MAX_PAGE_LIMIT),
        })
    }

    pub(crate) fn offset(self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results plus the total number of matching items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginated<T> {
    pub count: u64,
    pub results: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_values() {
        let page = PageRequest::new(None, Some(10));
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn limit_is_capped_and_zero_rejected() {
        let page = PageRequest::new(Some(3), Some(1000)).validate().unwrap();
        assert_eq!(page.limit, MAX_PAGE_LIMIT);
        assert_eq!(page.offset(), 200);

        assert!(PageRequest::new(Some(0), None).validate().is_err());
        assert!(PageRequest::new(None, Some(0)).validate().is_err());
    }
}
