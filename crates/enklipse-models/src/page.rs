//! Paginated clip listing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clip::Clip;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for `GET /clips`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a page request, clamping the size to `1..=MAX_PAGE_SIZE`.
    pub fn new(page_number: u32, page_size: Option<u32>) -> Self {
        Self {
            page_number,
            page_size: normalize_page_size(page_size),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            page_size: self.page_size,
        }
    }

    /// Query pairs in the order the listing endpoint expects.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("pageNumber", self.page_number.to_string()),
            ("pageSize", self.page_size.to_string()),
        ]
    }
}

fn normalize_page_size(size: Option<u32>) -> u32 {
    size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Response body for `GET /clips`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClipPage {
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub total_pages: u32,
}

impl ClipPage {
    pub fn has_more(&self, request: &PageRequest) -> bool {
        request.page_number.saturating_add(1) < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClipStatus;

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(PageRequest::new(0, None).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(0, Some(0)).page_size, 1);
        assert_eq!(PageRequest::new(0, Some(1_000)).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_deserialization() {
        let json = r#"{
            "clips": [
                {"clipId": "a", "title": "A", "status": "S", "clipUrl": "https://x/a.mp4"},
                {"clipId": "b", "title": "B", "status": "I"}
            ],
            "totalPages": 3
        }"#;
        let page: ClipPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.clips.len(), 2);
        assert_eq!(page.clips[1].status, ClipStatus::Processing);
        assert!(page.has_more(&PageRequest::new(1, None)));
        assert!(!page.has_more(&PageRequest::new(2, None)));
    }
}
