//! Pagination meta state and key normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SupportError};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Order {
    /// Parse `"asc"` or `"desc"`; anything else is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Get the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meta mapping echoed back to the client.
///
/// The five pagination fields are typed; anything added through
/// `add_meta` lands in `extra` and is serialized after them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Requested page, clamped to the last page on execution.
    pub page: u64,
    /// Rows per page.
    pub limit: u64,
    /// Sort field.
    pub sort: String,
    /// Sort direction.
    pub order: Order,
    /// Free-text search term.
    pub search: String,
    /// Caller-defined meta values, keyed in snake_case.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaginationMeta {
    /// Look up a meta value by already-normalized key.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "page" => Some(self.page.into()),
            "limit" => Some(self.limit.into()),
            "sort" => Some(self.sort.clone().into()),
            "order" => Some(self.order.as_str().into()),
            "search" => Some(self.search.clone().into()),
            _ => self.extra.get(key).cloned(),
        }
    }
}

/// Convert a key to snake_case.
///
/// Words separated by whitespace are joined, and an underscore is inserted
/// before every upper-case letter that does not start the key:
/// `"fooBar"`, `"FooBar"` and `"foo bar"` all become `"foo_bar"`. Keys that
/// are already all lower-case pass through untouched.
pub fn snake_case(key: &str) -> String {
    if !key.is_empty() && key.chars().all(char::is_lowercase) {
        return key.to_string();
    }

    let mut joined = String::with_capacity(key.len());
    let mut word_start = true;
    for c in key.chars() {
        if c.is_whitespace() {
            word_start = true;
            continue;
        }
        if word_start {
            joined.extend(c.to_uppercase());
        } else {
            joined.push(c);
        }
        word_start = false;
    }

    let mut snake = String::with_capacity(joined.len() + 4);
    for (i, c) in joined.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            snake.push('_');
        }
        snake.extend(c.to_lowercase());
    }
    snake
}

/// A named accessor into the meta mapping or the tag bag.
///
/// Names ending in `Tag` address a tag and names ending in `Meta` address a
/// meta value, keyed by the part before the suffix: `"statusMeta"` reads the
/// `status` meta value, `"pickedIdsTag"` the `picked_ids` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Meta value accessor.
    Meta(String),
    /// Tag accessor.
    Tag(String),
}

impl Accessor {
    /// Parse an accessor name.
    ///
    /// Fails with [`SupportError::UnknownAccessor`] when the name ends in
    /// neither suffix.
    pub fn parse(name: &str) -> Result<Self> {
        if let Some(key) = name.strip_suffix("Tag") {
            return Ok(Self::Tag(snake_case(key)));
        }
        if let Some(key) = name.strip_suffix("Meta") {
            return Ok(Self::Meta(snake_case(key)));
        }
        Err(SupportError::UnknownAccessor(name.to_string()))
    }

    /// Get the normalized key.
    pub fn key(&self) -> &str {
        match self {
            Self::Meta(key) | Self::Tag(key) => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parse() {
        assert_eq!(Order::parse("asc"), Some(Order::Asc));
        assert_eq!(Order::parse("desc"), Some(Order::Desc));
        assert_eq!(Order::parse("DESC"), None);
        assert_eq!(Order::parse("random"), None);
        assert_eq!(Order::Desc.to_string(), "desc");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("status"), "status");
        assert_eq!(snake_case("fooBar"), "foo_bar");
        assert_eq!(snake_case("FooBar"), "foo_bar");
        assert_eq!(snake_case("foo bar"), "foo_bar");
        assert_eq!(snake_case("foo_bar"), "foo_bar");
        assert_eq!(snake_case("pickedIds"), "picked_ids");
        assert_eq!(snake_case(""), "");
    }

    #[test]
    fn test_accessor_parse() {
        assert_eq!(Accessor::parse("statusMeta").unwrap(), Accessor::Meta("status".into()));
        assert_eq!(Accessor::parse("pickedIdsTag").unwrap(), Accessor::Tag("picked_ids".into()));
        assert_eq!(Accessor::parse("statusTag").unwrap().key(), "status");

        let err = Accessor::parse("statusFilter").unwrap_err();
        assert!(matches!(err, SupportError::UnknownAccessor(name) if name == "statusFilter"));
    }

    #[test]
    fn test_meta_serializes_extra_after_fields() {
        let mut meta = PaginationMeta {
            page: 2,
            limit: 25,
            sort: "id".into(),
            order: Order::Desc,
            search: String::new(),
            extra: Map::new(),
        };
        meta.extra.insert("status".into(), "active".into());

        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(
            json,
            r#"{"page":2,"limit":25,"sort":"id","order":"desc","search":"","status":"active"}"#
        );
        assert_eq!(meta.get("status"), Some(Value::from("active")));
        assert_eq!(meta.get("order"), Some(Value::from("desc")));
        assert_eq!(meta.get("missing"), None);
    }
}
