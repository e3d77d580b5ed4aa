//! Opaque tag bag carried between client and server as base64(JSON).

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pagination::meta::snake_case;

/// Standard alphabet; padding optional on decode, always written on encode.
const TAG_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Client-roundtripped filter state the paginator does not interpret.
///
/// Keys written through [`insert`](Self::insert) are normalized to
/// snake_case; keys decoded from the client are kept as sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagBag(Map<String, Value>);

impl TagBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a base64(JSON object) payload.
    ///
    /// Anything that is not valid base64 wrapping a JSON object decodes to an
    /// empty bag.
    pub fn decode(encoded: &str) -> Self {
        match Self::try_decode(encoded) {
            Some(map) => Self(map),
            None => {
                if !encoded.trim().is_empty() {
                    tracing::debug!(len = encoded.len(), "dropping undecodable tags payload");
                }
                Self::default()
            }
        }
    }

    fn try_decode(encoded: &str) -> Option<Map<String, Value>> {
        // Form decoding turns `+` into a space
        let cleaned: String = encoded.trim().replace(' ', "+");
        let bytes = TAG_ENGINE.decode(cleaned).ok()?;
        match serde_json::from_slice::<Value>(&bytes).ok()? {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Encode as base64(JSON).
    pub fn encode(&self) -> String {
        // A string-keyed map of JSON values always serializes
        let json = serde_json::to_vec(&self.0).unwrap_or_else(|_| b"{}".to_vec());
        TAG_ENGINE.encode(json)
    }

    /// Set a tag; the key is normalized to snake_case.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(snake_case(key), value.into());
    }

    /// Get a tag by key (normalized to snake_case).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(&snake_case(key))
    }

    /// Check whether a tag exists (key normalized to snake_case).
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(&snake_case(key))
    }

    /// Get the number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the underlying mapping.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for TagBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_normalizes_keys() {
        let mut tags = TagBag::new();
        tags.insert("foo", 1);
        tags.insert("pickedIds", json!([1, 2]));

        assert_eq!(tags.get("foo"), Some(&json!(1)));
        assert!(tags.contains("picked_ids"));
        assert!(tags.contains("pickedIds"));
        assert!(!tags.contains("bar"));
    }

    #[test]
    fn test_encode_decode() {
        let mut tags = TagBag::new();
        tags.insert("status", "open");
        tags.insert("ids", json!([3, 5]));

        let encoded = tags.encode();
        assert_eq!(TagBag::decode(&encoded), tags);
    }

    #[test]
    fn test_decode_known_payload() {
        // {"a":1}
        let tags = TagBag::decode("eyJhIjoxfQ==");
        assert_eq!(tags.get("a"), Some(&json!(1)));

        // Same payload without padding
        assert_eq!(TagBag::decode("eyJhIjoxfQ"), tags);

        // {"x":">>>"} encodes with a `+`, which form decoding turns into a space
        assert_eq!(TagBag::decode("eyJ4IjoiPj4+In0=").get("x"), Some(&json!(">>>")));
        assert_eq!(TagBag::decode("eyJ4IjoiPj4 In0=").get("x"), Some(&json!(">>>")));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(TagBag::decode("%%%not-base64%%%").is_empty());
        assert!(TagBag::decode("").is_empty());
        // base64("[1,2]"): valid JSON but not an object
        assert!(TagBag::decode("WzEsMl0=").is_empty());
        // base64("{oops"): not JSON
        assert!(TagBag::decode("e29vcHM=").is_empty());
    }

    #[test]
    fn test_empty_bag_encodes_object() {
        assert_eq!(TagBag::new().encode(), "e30=");
    }
}
