// ============================================================================
// spark-query-sync - Record Binding
// A structured value's flattened fields <-> one query key each
// ============================================================================
//
// The binding keeps exactly one piece of state: the flattened form of the
// value as last pushed to (or read from) the URL. Each change is flattened
// again and diffed against it field by field; only fields that differ are
// encoded and merged into the query, and a change that differs nowhere
// causes no navigation at all.
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::binding::codec::{decode_query_value, encode_query_value};
use crate::core::config::SyncOptions;
use crate::core::error::SyncError;
use crate::core::types::{FlatMap, QueryMap, QuerySource, ReactiveObserver};
use crate::primitives::watch::WatchHandle;
use crate::reactivity::equality::json_equals;
use crate::transform::flatten;
use crate::transform::flatten::field_paths;

/// Placeholder key for errors about the record as a whole
const RECORD_KEY: &str = "<record>";

/// Bind every field of a structured value to its own query key.
///
/// Keys are derived by flattening the value (`address.city` becomes
/// `addressCity`). Query parameters that match a field are decoded into it
/// on binding; every later change pushes the changed fields, and only
/// those, to the URL. Returns the record.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use spark_query_sync::{bind_record, reactive, MemoryRouter, QuerySource};
///
/// #[derive(Clone, PartialEq, Serialize, Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let router = MemoryRouter::from_href("/?age=40");
/// let person = bind_record(
///     reactive(Person { name: "John".into(), age: 30 }),
///     router.clone(),
/// );
/// assert_eq!(person.with(|p| p.age), 40);
///
/// person.update(|p| p.age = 41);
/// assert_eq!(router.query()["age"], "41");
/// assert!(!router.query().contains_key("name"));
/// ```
pub fn bind_record<S, R>(record: S, router: R) -> S
where
    S: ReactiveObserver + 'static,
    S::Value: Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    bind_record_with(record, router, &SyncOptions::default())
}

/// [`bind_record`] with explicit options.
pub fn bind_record_with<S, R>(record: S, router: R, options: &SyncOptions) -> S
where
    S: ReactiveObserver + 'static,
    S::Value: Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    if let Err(err) = attach_record(&record, router, options) {
        err.report();
    }
    record
}

/// Hydrate and observe; returns the watcher so callers can stop it.
pub(crate) fn attach_record<S, R>(
    record: &S,
    router: R,
    options: &SyncOptions,
) -> Result<WatchHandle, SyncError>
where
    S: ReactiveObserver + 'static,
    S::Value: Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    let mut last = flatten_record(&record.snapshot())?;

    if options.hydrate {
        let query = router.query();
        if let Some(hydrated) = hydrate_record(record, &query) {
            last = hydrated;
        }
    }

    let mode = options.navigation;
    Ok(record.observe(Box::new(move |value: &S::Value| {
        let flat = match flatten_record(value) {
            Ok(flat) => flat,
            Err(err) => return err.report(),
        };

        let changes = diff_fields(&last, &flat);
        if changes.is_empty() {
            tracing::trace!("record changed without touching any query field");
            return;
        }

        last = flat;
        let mut query = router.query();
        tracing::debug!(fields = changes.len(), "pushing record fields to query");
        query.extend(changes);
        router.navigate(query, mode);
    })))
}

/// Serialize a record and flatten it; it must serialize to an object.
fn flatten_record<T: Serialize>(value: &T) -> Result<FlatMap, SyncError> {
    let value = serde_json::to_value(value).map_err(|source| SyncError::Encode {
        key: RECORD_KEY.to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(flatten(&map)),
        other => Err(SyncError::usage(format!(
            "a structured binding needs a value that serializes to an object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Encode every field of `next` that differs from `last`.
fn diff_fields(last: &FlatMap, next: &FlatMap) -> QueryMap {
    let mut changes = QueryMap::new();
    for (key, value) in next {
        if last.get(key).is_some_and(|old| json_equals(old, value)) {
            continue;
        }
        match encode_query_value(key, value) {
            Ok(encoded) => {
                changes.insert(key.clone(), encoded);
            }
            Err(err) => err.report(),
        }
    }
    changes
}

/// Patch the record with matching query parameters.
///
/// Each query key is mapped back to its field through the record's own
/// structure, so keys are never split and nothing outside the matched
/// fields is touched. A field whose value does not decode is skipped with a
/// warning; the others still apply. Returns the new flat snapshot, or
/// `None` if nothing was applied.
fn hydrate_record<S>(record: &S, query: &QueryMap) -> Option<FlatMap>
where
    S: ReactiveObserver + 'static,
    S::Value: Serialize + DeserializeOwned,
{
    let current = match serde_json::to_value(record.snapshot()) {
        Ok(value @ Value::Object(_)) => value,
        _ => return None,
    };
    let paths = match &current {
        Value::Object(map) => field_paths(map),
        _ => return None,
    };

    let mut patches = Vec::new();
    for (key, raw) in query {
        let Some(path) = paths.get(key) else {
            continue;
        };
        match decode_query_value::<Value>(key, raw) {
            Ok(value) => patches.push((key.as_str(), path.as_slice(), value)),
            Err(err) => err.report(),
        }
    }
    if patches.is_empty() {
        return None;
    }

    let mut patched = current.clone();
    for (_, path, value) in &patches {
        set_path(&mut patched, path, value.clone());
    }

    let hydrated = match serde_json::from_value::<S::Value>(patched) {
        Ok(value) => value,
        // Some field has the wrong type for the record; find it
        Err(_) => hydrate_fields(current, &patches)?,
    };

    record.replace(hydrated);
    tracing::debug!(fields = patches.len(), "hydrated record from query");
    // Re-read: the type may normalize what the query carried
    flatten_record(&record.snapshot()).ok()
}

/// Apply patches one at a time, dropping each one the record rejects.
fn hydrate_fields<T: DeserializeOwned>(
    mut accepted: Value,
    patches: &[(&str, &[String], Value)],
) -> Option<T> {
    let mut hydrated = None;
    for (key, path, value) in patches {
        let mut trial = accepted.clone();
        set_path(&mut trial, path, value.clone());
        match serde_json::from_value::<T>(trial.clone()) {
            Ok(value) => {
                hydrated = Some(value);
                accepted = trial;
            }
            Err(source) => SyncError::Decode {
                key: (*key).to_string(),
                source,
            }
            .report(),
        }
    }
    hydrated
}

/// Overwrite the leaf at `path`; the path comes from the value's own fields.
fn set_path(root: &mut Value, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut node = root;
    for segment in parents {
        node = match node.get_mut(segment.as_str()) {
            Some(child) => child,
            None => return,
        };
    }
    if let Value::Object(map) = node {
        map.insert(last.clone(), value);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// TESTS
// =============================================================================
