// ============================================================================
// spark-query-sync - Unflatten
// Single-level mapping with camel-case joined keys -> nested mapping
// ============================================================================
//
// Each key is split into its path. Walking the path, every level is created
// as an array if the next segment is numeric and as an object otherwise;
// existing containers of the right kind are reused, anything else in the
// way is overwritten. The leaf receives the original value.
// ============================================================================

use serde_json::Value;

use crate::core::error::KeyError;
use crate::core::types::FlatMap;
use crate::transform::keys::{is_index, split_key};

/// Rebuild a nested mapping from a flattened one.
///
/// Keys that cannot be split unambiguously (see [`split_key`]) are logged
/// and kept verbatim as top-level fields rather than mis-split.
///
/// # Example
/// ```
/// use serde_json::json;
/// use spark_query_sync::unflatten;
///
/// let flat = json!({ "addressCity": "Oslo", "rows0Id": 7, "rows1Id": 8, "line2": "x" });
/// let nested = unflatten(flat.as_object().unwrap());
///
/// assert_eq!(
///     serde_json::Value::Object(nested),
///     json!({
///         "address": { "city": "Oslo" },
///         "rows": [{ "id": 7 }, { "id": 8 }],
///         "line2": "x",
///     })
/// );
/// ```
pub fn unflatten(flat: &FlatMap) -> FlatMap {
    let mut root = Value::Object(FlatMap::new());
    for (key, value) in flat {
        match split_key(key) {
            Ok(path) => place(&mut root, &path, value.clone()),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "keeping unsplittable key verbatim");
                if let Value::Object(map) = &mut root {
                    map.insert(key.clone(), value.clone());
                }
            }
        }
    }
    match root {
        Value::Object(map) => map,
        _ => FlatMap::new(),
    }
}

/// Rebuild a nested mapping, failing on the first ambiguous key.
///
/// # Example
/// ```
/// use serde_json::json;
/// use spark_query_sync::try_unflatten;
///
/// let flat = json!({ "userID": 7 });
/// assert!(try_unflatten(flat.as_object().unwrap()).is_err());
/// ```
pub fn try_unflatten(flat: &FlatMap) -> Result<FlatMap, KeyError> {
    let mut root = Value::Object(FlatMap::new());
    for (key, value) in flat {
        let path = split_key(key)?;
        place(&mut root, &path, value.clone());
    }
    match root {
        Value::Object(map) => Ok(map),
        _ => Ok(FlatMap::new()),
    }
}

/// Write `value` at `path` below `container`, creating levels on the way.
fn place(container: &mut Value, path: &[String], value: Value) {
    let Some((segment, rest)) = path.split_first() else {
        return;
    };

    let slot = match container {
        Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
        Value::Array(items) => {
            // split_key bounds every numeric segment
            let Ok(index) = segment.parse::<usize>() else {
                return;
            };
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        _ => return,
    };

    let Some(next) = rest.first() else {
        *slot = value;
        return;
    };

    if is_index(next) {
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
    } else if !slot.is_object() {
        *slot = Value::Object(FlatMap::new());
    }

    place(slot, rest, value);
}

// =============================================================================
// TESTS
// =============================================================================
