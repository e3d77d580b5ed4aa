//! Raw inbound pagination parameters.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::key::HasQueryParams;
use crate::pagination::meta::Order;
use crate::pagination::tags::TagBag;

/// Parameters as sent by the client, before validation.
///
/// Every field is kept as the raw string the client sent; numbers and
/// booleans in a JSON body are accepted and stringified, anything else is
/// treated as absent.
///
/// # Example
///
/// ```ignore
/// use skp_support::PageParams;
///
/// let params: PageParams = serde_json::from_str(r#"{"page": 2, "limit": "25"}"#)?;
/// assert_eq!(params.page(), Some(2));
/// assert_eq!(params.limit(), Some(25));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
    /// Requested page.
    #[serde(deserialize_with = "lenient_scalar")]
    pub page: Option<String>,
    /// Requested rows per page.
    #[serde(deserialize_with = "lenient_scalar")]
    pub limit: Option<String>,
    /// Requested sort field.
    #[serde(deserialize_with = "lenient_scalar")]
    pub sort: Option<String>,
    /// Requested sort direction.
    #[serde(deserialize_with = "lenient_scalar")]
    pub order: Option<String>,
    /// Search term.
    #[serde(deserialize_with = "lenient_scalar")]
    pub search: Option<String>,
    /// base64(JSON) tag bag.
    #[serde(deserialize_with = "lenient_scalar")]
    pub tags: Option<String>,
}

fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

impl PageParams {
    /// Read the parameters from a request.
    pub fn from_query<R: HasQueryParams + ?Sized>(request: &R) -> Self {
        let read = |name: &str| request.query_param(name).map(str::to_string);
        Self {
            page: read("page"),
            limit: read("limit"),
            sort: read("sort"),
            order: read("order"),
            search: read("search"),
            tags: read("tags"),
        }
    }

    /// The requested page if it is an integer of at least 1.
    pub fn page(&self) -> Option<u64> {
        positive_int(self.page.as_deref())
    }

    /// The requested page size if it is an integer of at least 1.
    pub fn limit(&self) -> Option<u64> {
        positive_int(self.limit.as_deref())
    }

    /// The requested sort field, if non-empty.
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The requested sort direction, if it is `asc` or `desc`.
    pub fn order(&self) -> Option<Order> {
        self.order.as_deref().map(str::trim).and_then(Order::parse)
    }

    /// The search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// The decoded tag bag; empty when missing or malformed.
    pub fn tags(&self) -> TagBag {
        self.tags.as_deref().map(TagBag::decode).unwrap_or_default()
    }
}

impl<R: HasQueryParams + ?Sized> From<&R> for PageParams {
    fn from(request: &R) -> Self {
        Self::from_query(request)
    }
}

fn positive_int(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|n| *n >= 1)
}
