// ============================================================================
// spark-query-sync - Value Codec
// Every query value is the JSON encoding of the field it carries
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::SyncError;

/// Decode the raw query value stored under `key`.
///
/// # Example
/// ```
/// use spark_query_sync::decode_query_value;
///
/// let count: i32 = decode_query_value("count", "5").unwrap();
/// assert_eq!(count, 5);
///
/// let err = decode_query_value::<i32>("count", "not-json").unwrap_err();
/// assert!(err.is_decode());
/// ```
pub fn decode_query_value<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, SyncError> {
    serde_json::from_str(raw).map_err(|source| SyncError::Decode {
        key: key.to_string(),
        source,
    })
}

/// Encode a value for storage under `key`.
///
/// # Example
/// ```
/// use spark_query_sync::encode_query_value;
///
/// assert_eq!(encode_query_value("count", &6).unwrap(), "6");
/// assert_eq!(encode_query_value("name", &"John").unwrap(), "\"John\"");
/// ```
pub fn encode_query_value<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, SyncError> {
    serde_json::to_string(value).map_err(|source| SyncError::Encode {
        key: key.to_string(),
        source,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[test]
    fn decode_structured_values() {
        let tags: Vec<String> = decode_query_value("tags", r#"["a","b"]"#).unwrap();
        assert_eq!(tags, vec!["a", "b"]);

        let any: Value = decode_query_value("v", r#"{"x":null}"#).unwrap();
        assert_eq!(any, json!({ "x": null }));
    }

    #[test]
    fn bare_string_is_not_json() {
        // A plain `name=John` in the URL is not a JSON string
        let err = decode_query_value::<String>("name", "John").unwrap_err();
        assert_eq!(err.key(), Some("name"));
    }

    #[test]
    fn type_mismatch_is_decode_error() {
        let err = decode_query_value::<u8>("age", "\"thirty\"").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn encode_rejects_non_string_map_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = encode_query_value("map", &map).unwrap_err();
        assert!(matches!(err, SyncError::Encode { .. }));
        assert_eq!(err.key(), Some("map"));
    }
}
