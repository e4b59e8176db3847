// ============================================================================
// spark-query-sync - Flatten
// Nested mapping -> single-level mapping with camel-case joined keys
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::types::FlatMap;
use crate::transform::keys::join_key;

/// Flatten a nested mapping into a single level.
///
/// Nested object keys are joined onto their parent's key with the first
/// character upper-cased. Only objects are recursed into: arrays, `null`
/// and scalars are leaves, and an empty nested object contributes nothing.
///
/// Two paths that join to the same key collide; the one visited last wins.
///
/// # Example
/// ```
/// use serde_json::json;
/// use spark_query_sync::flatten;
///
/// let nested = json!({
///     "name": "John",
///     "address": { "city": "Oslo", "zip": "0150" },
///     "tags": ["a", "b"],
/// });
/// let flat = flatten(nested.as_object().unwrap());
///
/// assert_eq!(flat["name"], json!("John"));
/// assert_eq!(flat["addressCity"], json!("Oslo"));
/// assert_eq!(flat["addressZip"], json!("0150"));
/// assert_eq!(flat["tags"], json!(["a", "b"]));
/// ```
pub fn flatten(map: &FlatMap) -> FlatMap {
    let mut flat = FlatMap::new();
    flatten_into(map, "", &mut flat);
    flat
}

/// Flatten any JSON value; non-objects flatten to an empty mapping.
pub fn flatten_value(value: &Value) -> FlatMap {
    match value {
        Value::Object(map) => flatten(map),
        _ => FlatMap::new(),
    }
}

/// The path each flattened key was joined from.
///
/// Follows the same traversal as [`flatten`], so colliding paths resolve to
/// the one visited last there too. Lets a caller that still holds the nested
/// value map a flat key back without splitting it.
pub(crate) fn field_paths(map: &FlatMap) -> BTreeMap<String, Vec<String>> {
    let mut paths = BTreeMap::new();
    let mut path = Vec::new();
    collect_paths(map, "", &mut path, &mut paths);
    paths
}

fn collect_paths(
    map: &FlatMap,
    prefix: &str,
    path: &mut Vec<String>,
    paths: &mut BTreeMap<String, Vec<String>>,
) {
    for (key, value) in map {
        let joined = join_key(prefix, key);
        path.push(key.clone());
        match value {
            Value::Object(child) => collect_paths(child, &joined, path, paths),
            _ => {
                paths.insert(joined, path.clone());
            }
        }
        path.pop();
    }
}

fn flatten_into(map: &FlatMap, prefix: &str, flat: &mut FlatMap) {
    for (key, value) in map {
        let joined = join_key(prefix, key);
        match value {
            Value::Object(child) => flatten_into(child, &joined, flat),
            leaf => {
                flat.insert(joined, leaf.clone());
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
