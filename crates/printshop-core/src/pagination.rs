//! # Pagination
//!
//! Page-number pagination for list operations.
//!
//! ```text
//! PageRequest { page: 2, page_size: 5 }  →  LIMIT 5 OFFSET 5
//! page_size > MAX_PAGE_SIZE              →  clamped to MAX_PAGE_SIZE
//! page = 0                               →  MustBePositive
//! ```
//!
//! Deserialization goes through [`PageRequest::new`] as well, so a request
//! built from query parameters obeys the same rules.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageParams")]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

/// Raw page parameters as they arrive from a caller.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "first_page")]
    page: u32,
    #[serde(default)]
    page_size: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl TryFrom<PageParams> for PageRequest {
    type Error = ValidationError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        PageRequest::new(params.page, params.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a request; `page_size` of `None` or 0 means the default, and
    /// anything above [`MAX_PAGE_SIZE`] is clamped.
    pub fn new(page: u32, page_size: Option<u32>) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::MustBePositive {
                field: "page".to_string(),
            });
        }

        let page_size = match page_size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(size) => size.min(MAX_PAGE_SIZE),
        };

        Ok(PageRequest { page, page_size })
    }

    /// 1-based page number.
    #[inline]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// SQL `LIMIT`.
    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL `OFFSET`.
    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, count: i64, results: Vec<T>) -> Self {
        Page {
            count,
            page: request.page(),
            page_size: request.page_size(),
            results,
        }
    }

    /// Whether a further page exists.
    pub fn has_next(&self) -> bool {
        i64::from(self.page) * i64::from(self.page_size) < self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        assert_eq!(PageRequest::default().page_size(), 5);
        assert_eq!(PageRequest::new(1, None).unwrap().page_size(), 5);
        assert_eq!(PageRequest::new(1, Some(50)).unwrap().page_size(), 20);
        assert_eq!(PageRequest::new(1, Some(7)).unwrap().page_size(), 7);
        assert!(PageRequest::new(0, None).is_err());
    }

    #[test]
    fn test_deserialize_applies_rules() {
        let req: PageRequest =
            serde_json::from_value(serde_json::json!({ "page": 2, "page_size": 500 })).unwrap();
        assert_eq!(req.page(), 2);
        assert_eq!(req.page_size(), MAX_PAGE_SIZE);

        let req: PageRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(req, PageRequest::default());

        assert!(serde_json::from_value::<PageRequest>(serde_json::json!({ "page": 0 })).is_err());
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::new(3, Some(5)).unwrap();
        assert_eq!(req.limit(), 5);
        assert_eq!(req.offset(), 10);
    }

    #[test]
    fn test_has_next() {
        let req = PageRequest::new(1, Some(5)).unwrap();
        assert!(Page::new(req, 6, vec![(); 5]).has_next());
        assert!(!Page::new(req, 5, vec![(); 5]).has_next());
    }
}
