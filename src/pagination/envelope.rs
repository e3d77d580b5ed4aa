//! Paginated response envelope.

use serde::{Deserialize, Serialize};

use crate::pagination::meta::PaginationMeta;
use crate::pagination::source::Page;
use crate::pagination::tags::TagBag;

/// `{meta, pagination, data}` envelope returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Echoed request state.
    pub meta: ResponseMeta,
    /// Position of `data` in the full result.
    pub pagination: PaginationInfo,
    /// Rows of the current page.
    pub data: Vec<T>,
}

/// Meta mapping plus the re-encoded tag bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Pagination fields and caller-defined meta.
    #[serde(flatten)]
    pub fields: PaginationMeta,
    /// base64(JSON) tag bag.
    pub tags: String,
}

impl ResponseMeta {
    /// Decode the tag bag; empty when malformed.
    pub fn decode_tags(&self) -> TagBag {
        TagBag::decode(&self.tags)
    }
}

/// Pagination block of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    /// Page number after clamping.
    pub current_page: u64,
    /// 1-based index of the first row, `None` for an empty page.
    pub from: Option<u64>,
    /// Last page number, at least 1.
    pub last_page: u64,
    /// Rows per page.
    pub per_page: u64,
    /// 1-based index of the last row, `None` for an empty page.
    pub to: Option<u64>,
    /// Total rows across all pages.
    pub total: u64,
}

impl<T> From<&Page<T>> for PaginationInfo {
    fn from(page: &Page<T>) -> Self {
        Self {
            current_page: page.current_page,
            from: page.from,
            last_page: page.last_page,
            per_page: page.per_page,
            to: page.to,
            total: page.total,
        }
    }
}

/// JSON output style for [`Paginator::to_json`](crate::Paginator::to_json).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Single line.
    #[default]
    Compact,
    /// Indented.
    Pretty,
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::pagination::meta::Order;

    #[test]
    fn test_envelope_shape() {
        let page = Page::from_items(vec![json!({"id": 1})], 1, 10, 1);
        let response = PaginatedResponse {
            meta: ResponseMeta {
                fields: PaginationMeta {
                    page: 1,
                    limit: 10,
                    sort: "id".into(),
                    order: Order::Asc,
                    search: String::new(),
                    extra: Map::new(),
                },
                tags: TagBag::new().encode(),
            },
            pagination: PaginationInfo::from(&page),
            data: page.data,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "meta": {"page": 1, "limit": 10, "sort": "id", "order": "asc", "search": "", "tags": "e30="},
                "pagination": {"current_page": 1, "from": 1, "last_page": 1, "per_page": 10, "to": 1, "total": 1},
                "data": [{"id": 1}]
            })
        );

        let back: PaginatedResponse<serde_json::Value> = serde_json::from_value(value).unwrap();
        assert_eq!(back, response);
    }
}
