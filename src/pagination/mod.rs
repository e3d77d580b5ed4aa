//! Whitelist-validated pagination over a data source.
//!
//! A `Paginator` is built for one inbound request. [`parse`](Paginator::parse)
//! validates the raw `page`, `limit`, `sort`, `order`, `search` and `tags`
//! parameters against the configured whitelists, silently falling back to
//! defaults for anything invalid. Executing it with
//! [`to_response`](Paginator::to_response) (or `to_array` / `to_json`)
//! counts the bound [`DataSource`], clamps the page to the last page, fetches
//! that page and wraps it in the `{meta, pagination, data}` envelope.
//!
//! # Example
//!
//! ```ignore
//! use skp_support::{PageParams, Paginator, VecSource};
//!
//! let mut paginator = Paginator::new(PageParams::from_query(&request));
//! paginator.set_sorts(["id", "name"]);
//! paginator.parse();
//! paginator.add_meta("status", "active");
//! paginator.set_query(VecSource::new(users));
//!
//! let body = paginator.to_json(JsonFormat::Compact).await?;
//! ```

mod envelope;
mod meta;
mod params;
mod source;
mod tags;

pub use envelope::{JsonFormat, PaginatedResponse, PaginationInfo, ResponseMeta};
pub use meta::{Accessor, Order, PaginationMeta, snake_case};
pub use params::PageParams;
pub use source::{DataSource, Page, VecSource, last_page};
pub use tags::TagBag;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::PaginationConfig;
use crate::error::{ConfigError, Result};
use crate::key::HasQueryParams;

/// Paginator bound to one request.
///
/// Setters that validate against a whitelist return whether the value was
/// applied; a rejected value leaves the previous one in place.
#[derive(Debug, Clone)]
pub struct Paginator<Q> {
    params: PageParams,
    query: Option<Q>,
    allowed_sorts: Vec<String>,
    allowed_limits: Vec<u64>,
    meta: PaginationMeta,
    tags: TagBag,
}

impl<Q> Paginator<Q> {
    /// Create a paginator for the given request parameters with the default
    /// configuration.
    pub fn new(params: impl Into<PageParams>) -> Self {
        Self::with_config(params, &PaginationConfig::default())
    }

    /// Create a paginator with explicit whitelists and defaults.
    pub fn with_config(params: impl Into<PageParams>, config: &PaginationConfig) -> Self {
        Self {
            params: params.into(),
            query: None,
            allowed_sorts: config.allowed_sorts.clone(),
            allowed_limits: config.allowed_limits.clone(),
            meta: PaginationMeta {
                page: 1,
                limit: config.default_limit.max(1),
                sort: config.default_sort.clone(),
                order: config.default_order,
                search: String::new(),
                extra: Map::new(),
            },
            tags: TagBag::new(),
        }
    }

    /// Create a paginator reading its parameters from a request.
    pub fn from_request<R: HasQueryParams + ?Sized>(request: &R) -> Self {
        Self::new(PageParams::from_query(request))
    }

    /// Validate the request parameters and apply them.
    ///
    /// Never fails: a missing or invalid limit, sort or order keeps the
    /// current value, and a malformed tag payload yields an empty tag bag.
    /// A missing or invalid page resets to 1.
    pub fn parse(&mut self) {
        let page = self.params.page().unwrap_or(1);
        self.set_page(page);

        if let Some(limit) = self.params.limit() {
            self.set_limit(limit);
        }

        let sort = self.params.sort().map(str::to_string);
        if let Some(sort) = sort {
            self.set_sort(sort);
        }

        if let Some(order) = self.params.order() {
            self.set_order(order);
        }

        let search = self.params.search().unwrap_or_default().to_string();
        self.set_search(search);

        self.tags = self.params.tags();
    }

    /// Get the raw request parameters.
    pub fn params(&self) -> &PageParams {
        &self.params
    }

    /// Bind the data source.
    pub fn set_query(&mut self, query: Q) -> &mut Self {
        self.query = Some(query);
        self
    }

    /// Bind the data source, builder style.
    pub fn with_query(mut self, query: Q) -> Self {
        self.query = Some(query);
        self
    }

    /// Get the bound data source.
    pub fn query(&self) -> Option<&Q> {
        self.query.as_ref()
    }

    /// Replace the accepted sort fields. Empty accepts any field.
    ///
    /// The current sort is not re-validated.
    pub fn set_sorts<I, S>(&mut self, sorts: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_sorts = sorts.into_iter().map(Into::into).collect();
        self
    }

    /// Get the accepted sort fields.
    pub fn sorts(&self) -> &[String] {
        &self.allowed_sorts
    }

    /// Replace the accepted page sizes. Empty accepts any size of at least 1.
    ///
    /// The current limit is not re-validated.
    pub fn set_limits(&mut self, limits: impl IntoIterator<Item = u64>) -> &mut Self {
        self.allowed_limits = limits.into_iter().collect();
        self
    }

    /// Get the accepted page sizes.
    pub fn limits(&self) -> &[u64] {
        &self.allowed_limits
    }

    /// Set the page. Any value is accepted; execution clamps it.
    pub fn set_page(&mut self, page: u64) {
        self.meta.page = page;
    }

    /// Get the page.
    pub fn page(&self) -> u64 {
        self.meta.page
    }

    /// Set the page size if it is accepted.
    pub fn set_limit(&mut self, limit: u64) -> bool {
        let allowed = self.limit_allowed(limit);
        if allowed {
            self.meta.limit = limit;
        }
        allowed
    }

    /// Get the page size.
    pub fn limit(&self) -> u64 {
        self.meta.limit
    }

    /// Set the sort field if it is accepted.
    pub fn set_sort(&mut self, sort: impl Into<String>) -> bool {
        let sort = sort.into();
        let allowed = self.allowed_sorts.is_empty() || self.allowed_sorts.contains(&sort);
        if allowed {
            self.meta.sort = sort;
        }
        allowed
    }

    /// Get the sort field.
    pub fn sort(&self) -> &str {
        &self.meta.sort
    }

    /// Set the sort direction.
    pub fn set_order(&mut self, order: Order) {
        self.meta.order = order;
    }

    /// Set the sort direction from its wire name if it is `asc` or `desc`.
    pub fn try_set_order(&mut self, order: &str) -> bool {
        match Order::parse(order) {
            Some(order) => {
                self.set_order(order);
                true
            }
            None => false,
        }
    }

    /// Get the sort direction.
    pub fn order(&self) -> Order {
        self.meta.order
    }

    /// Set the search term. Any value is accepted.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.meta.search = search.into();
    }

    /// Get the search term.
    pub fn search(&self) -> &str {
        &self.meta.search
    }

    /// Set a meta value; the key is normalized to snake_case.
    ///
    /// Keys naming a pagination field go through that field's setter, so
    /// `add_meta("limit", 999)` is rejected like `set_limit(999)`. The `tags`
    /// key is reserved for the encoded tag bag and always rejected.
    pub fn add_meta(&mut self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        match snake_case(key).as_str() {
            "page" => match value.as_u64() {
                Some(page) => {
                    self.set_page(page);
                    true
                }
                None => false,
            },
            "limit" => value.as_u64().is_some_and(|limit| self.set_limit(limit)),
            "sort" => match value {
                Value::String(sort) => self.set_sort(sort),
                _ => false,
            },
            "order" => value.as_str().is_some_and(|order| self.try_set_order(order)),
            "search" => match value {
                Value::String(search) => {
                    self.set_search(search);
                    true
                }
                Value::Null => {
                    self.set_search("");
                    true
                }
                _ => false,
            },
            "tags" => false,
            key => {
                self.meta.extra.insert(key.to_string(), value);
                true
            }
        }
    }

    /// Get a meta value; the key is normalized to snake_case.
    pub fn get_meta(&self, key: &str) -> Option<Value> {
        self.meta.get(&snake_case(key))
    }

    /// Get the full meta state.
    pub fn meta(&self) -> &PaginationMeta {
        &self.meta
    }

    /// Set a tag; the key is normalized to snake_case.
    pub fn add_tag(&mut self, key: &str, value: impl Into<Value>) {
        self.tags.insert(key, value);
    }

    /// Get a tag; the key is normalized to snake_case.
    pub fn get_tag(&self, key: &str) -> Option<&Value> {
        self.tags.get(key)
    }

    /// Check whether a tag exists; the key is normalized to snake_case.
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains(key)
    }

    /// Get the tag bag.
    pub fn tags(&self) -> &TagBag {
        &self.tags
    }

    /// Read through a `*Meta` / `*Tag` accessor name.
    ///
    /// `get("statusMeta")` is `get_meta("status")`; a name with neither
    /// suffix is an error.
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        Ok(match Accessor::parse(name)? {
            Accessor::Meta(key) => self.get_meta(&key),
            Accessor::Tag(key) => self.get_tag(&key).cloned(),
        })
    }

    /// Write through a `*Meta` / `*Tag` accessor name.
    ///
    /// Returns whether the value was applied, as `add_meta` does; tags are
    /// always applied.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<bool> {
        Ok(match Accessor::parse(name)? {
            Accessor::Meta(key) => self.add_meta(&key, value),
            Accessor::Tag(key) => {
                self.add_tag(&key, value);
                true
            }
        })
    }

    fn limit_allowed(&self, limit: u64) -> bool {
        limit >= 1 && (self.allowed_limits.is_empty() || self.allowed_limits.contains(&limit))
    }
}

impl<Q: DataSource> Paginator<Q> {
    /// Execute the query and build the envelope.
    ///
    /// The page is clamped into `1..=last_page` for the source's row count
    /// and the clamped value is kept, so [`page`](Self::page) reflects it
    /// afterwards. Fails with [`ConfigError::MissingDataSource`] when no
    /// source is bound.
    pub async fn to_response(&mut self) -> Result<PaginatedResponse<Q::Item>> {
        let query = self.query.as_ref().ok_or(ConfigError::MissingDataSource)?;

        let total = query.count().await?;
        let limit = self.meta.limit.max(1);
        let last_page = last_page(total, limit);
        let page = self.meta.page.clamp(1, last_page);
        if page != self.meta.page {
            tracing::debug!(requested = self.meta.page, page, last_page, total, "page clamped to last page");
        }
        self.meta.page = page;

        let result = query.paginate(limit, page).await?;

        Ok(PaginatedResponse {
            meta: ResponseMeta {
                fields: self.meta.clone(),
                tags: self.tags.encode(),
            },
            pagination: PaginationInfo::from(&result),
            data: result.data,
        })
    }

    /// Execute and return the envelope as a JSON value.
    pub async fn to_array(&mut self) -> Result<Value>
    where
        Q::Item: Serialize,
    {
        let response = self.to_response().await?;
        Ok(serde_json::to_value(response)?)
    }

    /// Execute and return the envelope as a JSON string.
    pub async fn to_json(&mut self, format: JsonFormat) -> Result<String>
    where
        Q::Item: Serialize,
    {
        let response = self.to_response().await?;
        Ok(match format {
            JsonFormat::Compact => serde_json::to_string(&response)?,
            JsonFormat::Pretty => serde_json::to_string_pretty(&response)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    type Rows = VecSource<u32>;

    fn paginator(pairs: &[(&str, &str)]) -> Paginator<Rows> {
        let mut paginator = Paginator::new(pairs);
        paginator.parse();
        paginator
    }

    #[test]
    fn test_defaults() {
        let paginator = paginator(&[]);
        assert_eq!(paginator.page(), 1);
        assert_eq!(paginator.limit(), 10);
        assert_eq!(paginator.sort(), "id");
        assert_eq!(paginator.order(), Order::Asc);
        assert_eq!(paginator.search(), "");
        assert!(paginator.tags().is_empty());
        assert_eq!(paginator.limits(), &[10, 25, 50, 100]);
        assert!(paginator.sorts().is_empty());
    }

    #[test]
    fn test_parse_valid_params() {
        let paginator = paginator(&[
            ("page", "3"),
            ("limit", "50"),
            ("sort", "name"),
            ("order", "desc"),
            ("search", "ali"),
        ]);
        assert_eq!(paginator.page(), 3);
        assert_eq!(paginator.limit(), 50);
        assert_eq!(paginator.sort(), "name");
        assert_eq!(paginator.order(), Order::Desc);
        assert_eq!(paginator.search(), "ali");
    }

    #[test]
    fn test_parse_invalid_params_fall_back() {
        let paginator = paginator(&[
            ("page", "-1"),
            ("limit", "999"),
            ("order", "sideways"),
        ]);
        assert_eq!(paginator.page(), 1);
        assert_eq!(paginator.limit(), 10);
        assert_eq!(paginator.order(), Order::Asc);
    }

    #[test]
    fn test_parse_invalid_limit_keeps_prior() {
        let mut paginator: Paginator<Rows> = Paginator::new(&[("limit", "7")]);
        paginator.set_limits([20, 40]);
        assert!(paginator.set_limit(40));
        paginator.parse();
        assert_eq!(paginator.limit(), 40);
    }

    #[test]
    fn test_parse_keeps_configured_default_limit() {
        let config = PaginationConfig {
            default_limit: 50,
            ..PaginationConfig::default()
        };
        config.validate().unwrap();

        let mut paginator: Paginator<Rows> = Paginator::with_config(&[("page", "1")], &config);
        assert_eq!(paginator.limit(), 50);
        paginator.parse();
        assert_eq!(paginator.limit(), 50);

        let mut paginator: Paginator<Rows> = Paginator::with_config(&[("limit", "999")], &config);
        paginator.parse();
        assert_eq!(paginator.limit(), 50);

        let mut paginator: Paginator<Rows> = Paginator::with_config(&[("limit", "25")], &config);
        paginator.parse();
        assert_eq!(paginator.limit(), 25);
    }

    #[test]
    fn test_rejected_limit_keeps_non_default() {
        let mut paginator = paginator(&[]);
        assert!(paginator.set_limit(25));
        assert!(!paginator.set_limit(999));
        assert_eq!(paginator.limit(), 25);
        assert!(!paginator.add_meta("limit", 0));
        assert_eq!(paginator.limit(), 25);

        let mut paginator: Paginator<Rows> = Paginator::new(&[("limit", "999")]);
        assert!(paginator.set_limit(25));
        paginator.parse();
        assert_eq!(paginator.limit(), 25);
    }

    #[test]
    fn test_parse_sort_respects_whitelist() {
        let mut paginator: Paginator<Rows> = Paginator::new(&[("sort", "password")]);
        paginator.set_sorts(["id", "name"]);
        paginator.parse();
        assert_eq!(paginator.sort(), "id");
    }

    #[test]
    fn test_parse_tags() {
        // {"status":"open"}
        let tagged = paginator(&[("tags", "eyJzdGF0dXMiOiJvcGVuIn0=")]);
        assert_eq!(tagged.get_tag("status"), Some(&json!("open")));

        let malformed = paginator(&[("tags", "not base64 at all!")]);
        assert!(malformed.tags().is_empty());
    }

    #[test]
    fn test_setters_report_rejection() {
        let mut paginator = paginator(&[]);

        assert!(!paginator.set_limit(999));
        assert_eq!(paginator.limit(), 10);
        assert!(paginator.set_limit(25));
        assert_eq!(paginator.limit(), 25);
        assert!(!paginator.set_limit(0));

        paginator.set_sorts(["id", "name"]);
        assert!(!paginator.set_sort("email"));
        assert!(paginator.set_sort("name"));
        assert_eq!(paginator.sort(), "name");

        assert!(!paginator.try_set_order("up"));
        assert!(paginator.try_set_order("desc"));
        assert_eq!(paginator.order(), Order::Desc);
    }

    #[test]
    fn test_empty_limits_accept_any_positive_size() {
        let mut paginator = paginator(&[]);
        paginator.set_limits([]);
        assert!(paginator.set_limit(7));
        assert!(!paginator.set_limit(0));
    }

    #[test]
    fn test_whitelists_not_retroactive() {
        let mut paginator = paginator(&[("limit", "100"), ("sort", "name")]);
        paginator.set_limits([10]);
        paginator.set_sorts(["id"]);
        assert_eq!(paginator.limit(), 100);
        assert_eq!(paginator.sort(), "name");
    }

    #[test]
    fn test_meta() {
        let mut paginator = paginator(&[]);

        assert!(paginator.add_meta("totalActive", 12));
        assert_eq!(paginator.get_meta("total_active"), Some(json!(12)));
        assert_eq!(paginator.get_meta("totalActive"), Some(json!(12)));
        assert_eq!(paginator.get_meta("missing"), None);

        // Pagination keys route through their setters
        assert!(!paginator.add_meta("limit", 999));
        assert!(paginator.add_meta("limit", 50));
        assert_eq!(paginator.limit(), 50);
        assert!(paginator.add_meta("page", 4));
        assert_eq!(paginator.get_meta("page"), Some(json!(4)));
        assert!(!paginator.add_meta("tags", "x"));
    }

    #[test]
    fn test_tags() {
        let mut paginator = paginator(&[]);
        paginator.add_tag("foo", 1);
        paginator.add_tag("pickedIds", json!([1, 2]));

        assert_eq!(paginator.get_tag("foo"), Some(&json!(1)));
        assert!(paginator.has_tag("picked_ids"));
        assert!(!paginator.has_tag("bar"));
    }

    #[test]
    fn test_accessors() {
        let mut paginator = paginator(&[]);

        assert!(paginator.set("statusMeta", "active").unwrap());
        assert!(paginator.set("pickedIdsTag", json!([3])).unwrap());

        assert_eq!(paginator.get("statusMeta").unwrap(), Some(json!("active")));
        assert_eq!(paginator.get_meta("status"), Some(json!("active")));
        assert_eq!(paginator.get("pickedIdsTag").unwrap(), Some(json!([3])));
        assert_eq!(paginator.get("limitMeta").unwrap(), Some(json!(10)));

        assert!(paginator.get("statusFilter").is_err());
        assert!(paginator.set("status", 1).is_err());
    }

    #[tokio::test]
    async fn test_to_response_clamps_page() {
        let mut paginator = paginator(&[("page", "10"), ("limit", "25")]);
        paginator.set_query(VecSource::new((1..=95).collect()));

        let response = paginator.to_response().await.unwrap();
        assert_eq!(response.pagination.current_page, 4);
        assert_eq!(response.pagination.last_page, 4);
        assert_eq!(response.pagination.total, 95);
        assert_eq!(response.meta.fields.page, 4);
        assert_eq!(response.data, (76..=95).collect::<Vec<u32>>());
        assert_eq!(paginator.page(), 4);
    }

    #[tokio::test]
    async fn test_to_response_raises_zero_page() {
        let mut paginator = paginator(&[]);
        paginator.set_page(0);
        paginator.set_query(VecSource::new((1..=30).collect()));

        let response = paginator.to_response().await.unwrap();
        assert_eq!(response.meta.fields.page, 1);
        assert_eq!(response.pagination.current_page, 1);
        assert_eq!(response.data, (1..=10).collect::<Vec<u32>>());
        assert_eq!(paginator.page(), 1);

        assert!(paginator.add_meta("page", 0));
        let response = paginator.to_response().await.unwrap();
        assert_eq!(response.meta.fields.page, 1);
    }

    #[tokio::test]
    async fn test_to_response_empty_source() {
        let mut paginator = paginator(&[("page", "3")]);
        paginator.set_query(VecSource::new(Vec::new()));

        let response = paginator.to_response().await.unwrap();
        assert_eq!(response.pagination.current_page, 1);
        assert_eq!(response.pagination.from, None);
        assert_eq!(response.pagination.to, None);
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn test_missing_query_fails_fast() {
        let mut paginator = paginator(&[]);
        let err = paginator.to_response().await.unwrap_err();
        assert!(matches!(
            err,
            crate::SupportError::Config(ConfigError::MissingDataSource)
        ));
    }

    #[tokio::test]
    async fn test_to_array_shape() {
        let mut paginator = paginator(&[("page", "2"), ("limit", "10")]);
        paginator.add_meta("status", "active");
        paginator.add_tag("foo", 1);
        paginator.set_query(VecSource::new((1..=15).collect()));

        let value = paginator.to_array().await.unwrap();
        assert_eq!(value["meta"]["page"], json!(2));
        assert_eq!(value["meta"]["status"], json!("active"));
        assert_eq!(value["pagination"]["from"], json!(11));
        assert_eq!(value["pagination"]["to"], json!(15));
        assert_eq!(value["data"], json!([11, 12, 13, 14, 15]));

        let tags = TagBag::decode(value["meta"]["tags"].as_str().unwrap());
        assert_eq!(tags.get("foo"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_to_json_formats() {
        let mut paginator = paginator(&[]);
        paginator.set_query(VecSource::new(vec![1, 2]));

        let compact = paginator.to_json(JsonFormat::Compact).await.unwrap();
        assert!(compact.starts_with(r#"{"meta":{"page":1,"limit":10,"sort":"id","order":"asc","search":"","tags":"e30="}"#));

        let pretty = paginator.to_json(JsonFormat::Pretty).await.unwrap();
        assert!(pretty.contains('\n'));
    }
}
