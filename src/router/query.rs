// ============================================================================
// spark-query-sync - Query Strings
// application/x-www-form-urlencoded <-> QueryMap
// ============================================================================

use url::form_urlencoded;

use crate::core::types::QueryMap;

/// Parse a query string (with or without the leading `?`).
///
/// Repeated keys keep their last value.
///
/// # Example
/// ```
/// use spark_query_sync::parse_query;
///
/// let query = parse_query("?count=5&name=%22John%22");
/// assert_eq!(query["count"], "5");
/// assert_eq!(query["name"], "\"John\"");
/// ```
pub fn parse_query(query: &str) -> QueryMap {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Serialize a query mapping, keys in sorted order, without the `?`.
///
/// # Example
/// ```
/// use spark_query_sync::{to_query_string, QueryMap};
///
/// let mut query = QueryMap::new();
/// query.insert("tags".into(), r#"["a","b"]"#.into());
/// query.insert("age".into(), "31".into());
/// assert_eq!(to_query_string(&query), "age=31&tags=%5B%22a%22%2C%22b%22%5D");
/// ```
pub fn to_query_string(query: &QueryMap) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}

// =============================================================================
// TESTS
// =============================================================================
