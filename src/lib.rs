// ============================================================================
// spark-query-sync - Reactive values synchronized with URL query parameters
// ============================================================================
//
// Bind a reactive value to the query string: existing parameters hydrate it
// on bind, every later change is pushed back to the URL. Structured values
// are flattened to one camel-case key per field (`address.city` ->
// `addressCity`); `flatten`/`unflatten` are exported on their own as well.
//
// The bindings only need two capabilities, `QuerySource` (read the query,
// request a navigation) and `ReactiveObserver` (read, replace and observe a
// value). `MemoryRouter` and `Reactive<T>` implement them in-process.
// ============================================================================

pub mod binding;
pub mod core;
pub mod primitives;
pub mod reactivity;
pub mod router;
pub mod transform;

// Re-export core items at crate root for ergonomic access
pub use crate::core::config::SyncOptions;
pub use crate::core::constants;
pub use crate::core::context::{is_batching, with_context, write_version, ReactiveContext};
pub use crate::core::error::{KeyError, SyncError};
pub use crate::core::types::{
    default_equals, AnyWatcher, EqualsFn, FlatMap, NavigationMode, ObserverFn, QueryMap,
    QuerySource, ReactiveObserver,
};

// Re-export primitives
pub use primitives::reactive::{mutable_reactive, reactive, reactive_with_equals, Reactive};
pub use primitives::watch::WatchHandle;

// Re-export reactivity functions
pub use reactivity::batching::batch;
pub use reactivity::equality::{equals, json_equals, never_equals};
pub use reactivity::scheduling::flush_sync;

// Re-export transforms
pub use transform::{flatten, flatten_value, join_key, split_key, try_unflatten, unflatten};

// Re-export routing
pub use router::{parse_query, to_query_string, MemoryRouter, Navigation};

// Re-export bindings
pub use binding::{
    bind_record, bind_record_with, bind_scalar, bind_scalar_with, bind_to_query,
    bind_to_query_with, decode_query_value, encode_query_value, Bindable,
};

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
        age: u32,
    }

    fn obj(value: Value) -> FlatMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    #[test]
    fn unflatten_inverts_flatten_for_plain_objects() {
        let samples = [
            json!({}),
            json!({ "a": 1 }),
            json!({ "user": { "name": "x", "address": { "city": "y", "zip": null } } }),
            json!({ "list": [1, { "deep": true }], "flag": false, "ratio": 0.5 }),
        ];
        for sample in samples {
            let original = obj(sample);
            assert_eq!(unflatten(&flatten(&original)), original);
        }
    }

    #[test]
    fn empty_mappings() {
        assert_eq!(flatten(&FlatMap::new()), FlatMap::new());
        assert_eq!(unflatten(&FlatMap::new()), FlatMap::new());
    }

    // =========================================================================
    // Scalar binding
    // =========================================================================

    #[test]
    fn scalar_hydrates_decoded_number() {
        let router = MemoryRouter::from_href("/?count=5");
        let count = bind_scalar(reactive(0), "count", router.clone());
        assert_eq!(count.get(), 5);
    }

    #[test]
    fn scalar_change_navigates_with_encoded_value() {
        let router = MemoryRouter::from_href("/?count=5");
        let count = bind_scalar(reactive(0), "count", router.clone());
        count.set(6);
        assert_eq!(router.last_navigation().unwrap().query["count"], "6");
    }

    #[test]
    fn scalar_malformed_query_keeps_default() {
        let router = MemoryRouter::from_href("/?count=not-json");
        let count = bind_scalar(reactive(0), "count", router.clone());
        assert_eq!(count.get(), 0);
    }

    // =========================================================================
    // Record binding
    // =========================================================================

    #[test]
    fn record_without_params_unchanged() {
        let router = MemoryRouter::new();
        let person = bind_record(
            reactive(Person {
                name: "John".into(),
                age: 30,
            }),
            router.clone(),
        );
        assert_eq!(
            person.get(),
            Person {
                name: "John".into(),
                age: 30,
            }
        );
    }

    #[test]
    fn record_pushes_only_changed_field_once() {
        let router = MemoryRouter::new();
        let person = bind_record(
            reactive(Person {
                name: "John".into(),
                age: 30,
            }),
            router.clone(),
        );

        person.update(|p| p.age = 31);
        let nav = router.last_navigation().unwrap();
        assert_eq!(nav.query.len(), 1);
        assert_eq!(nav.query["age"], "31");

        person.update(|p| p.age = 31);
        assert_eq!(router.navigation_count(), 1);
    }

    // =========================================================================
    // Shape dispatch
    // =========================================================================

    #[test]
    fn detached_value_has_no_side_effects() {
        let router = MemoryRouter::new();
        let item = bind_to_query(Bindable::Detached(json!({ "a": 1 })), None, router.clone());
        assert!(matches!(item, Bindable::Detached(ref v) if v == &json!({ "a": 1 })));
        assert_eq!(router.navigation_count(), 0);
    }
}
