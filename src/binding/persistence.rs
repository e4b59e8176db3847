// ============================================================================
// spark-query-sync - Shape-Dispatched Binding
// One entry point for slots and records, chosen by the caller's tag
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::binding::record::attach_record;
use crate::binding::scalar::attach_scalar;
use crate::core::config::SyncOptions;
use crate::core::error::SyncError;
use crate::core::types::QuerySource;
use crate::primitives::reactive::Reactive;
use crate::primitives::watch::WatchHandle;

/// A value offered for binding, tagged with its shape.
#[derive(Debug)]
pub enum Bindable<T> {
    /// A single-slot value stored under one explicit key
    Slot(Reactive<T>),
    /// A structured value whose fields each get their own key
    Record(Reactive<T>),
    /// A plain value with nothing to observe
    Detached(T),
}

impl<T> Bindable<T> {
    /// The reactive handle, unless the value is detached
    pub fn reactive(&self) -> Option<&Reactive<T>> {
        match self {
            Bindable::Slot(r) | Bindable::Record(r) => Some(r),
            Bindable::Detached(_) => None,
        }
    }

    /// Unwrap the reactive handle, unless the value is detached
    pub fn into_reactive(self) -> Option<Reactive<T>> {
        match self {
            Bindable::Slot(r) | Bindable::Record(r) => Some(r),
            Bindable::Detached(_) => None,
        }
    }
}

/// Bind a tagged value to the query string and hand it back.
///
/// `key` is required for [`Bindable::Slot`] and ignored for
/// [`Bindable::Record`]. A slot without a key, or a [`Bindable::Detached`]
/// value, is reported as a warning and returned untouched with nothing
/// observing it.
///
/// # Example
///
/// ```
/// use spark_query_sync::{bind_to_query, reactive, Bindable, MemoryRouter};
///
/// let router = MemoryRouter::from_href("/?count=5");
/// let count = bind_to_query(Bindable::Slot(reactive(0)), Some("count"), router.clone());
/// assert_eq!(count.reactive().unwrap().get(), 5);
///
/// let plain = bind_to_query(Bindable::Detached(1), Some("n"), router.clone());
/// assert!(plain.reactive().is_none());
/// ```
pub fn bind_to_query<T, R>(item: Bindable<T>, key: Option<&str>, router: R) -> Bindable<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    bind_to_query_with(item, key, router, &SyncOptions::default())
}

/// [`bind_to_query`] with explicit options.
pub fn bind_to_query_with<T, R>(
    item: Bindable<T>,
    key: Option<&str>,
    router: R,
    options: &SyncOptions,
) -> Bindable<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    if let Err(err) = attach(&item, key, router, options) {
        err.report();
    }
    item
}

fn attach<T, R>(
    item: &Bindable<T>,
    key: Option<&str>,
    router: R,
    options: &SyncOptions,
) -> Result<WatchHandle, SyncError>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    match item {
        Bindable::Slot(slot) => {
            let key = key.ok_or_else(|| SyncError::usage("a single-slot binding needs a key"))?;
            attach_scalar(slot, key, router, options)
        }
        Bindable::Record(record) => attach_record(record, router, options),
        Bindable::Detached(_) => Err(SyncError::usage(
            "expected a slot or a record, got a plain value",
        )),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::reactive::reactive;
    use crate::router::memory::MemoryRouter;
    use serde_json::json;

    #[test]
    fn slot_binds_under_key() {
        let router = MemoryRouter::from_href("?count=5");
        let item = bind_to_query(Bindable::Slot(reactive(0)), Some("count"), router.clone());
        let count = item.into_reactive().unwrap();
        assert_eq!(count.get(), 5);

        count.set(6);
        assert_eq!(router.query()["count"], "6");
    }

    #[test]
    fn slot_without_key_is_left_alone() {
        let router = MemoryRouter::from_href("?count=5");
        let item = bind_to_query(Bindable::Slot(reactive(0)), None, router.clone());
        let count = item.reactive().unwrap();
        assert_eq!(count.get(), 0);
        assert_eq!(count.watcher_count(), 0);

        count.set(1);
        assert_eq!(router.navigation_count(), 0);

        let err = attach(&Bindable::Slot(reactive(0)), None, router, &SyncOptions::default())
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn record_ignores_key() {
        let router = MemoryRouter::from_href("?age=40");
        let item = bind_to_query(
            Bindable::Record(reactive(json!({ "name": "John", "age": 30 }))),
            Some("ignored"),
            router.clone(),
        );
        let person = item.into_reactive().unwrap();
        assert_eq!(person.get()["age"], json!(40));

        person.update(|p| p["age"] = json!(41));
        assert_eq!(router.query()["age"], "41");
        assert!(!router.query().contains_key("ignored"));
    }

    #[test]
    fn detached_value_returned_unchanged() {
        let router = MemoryRouter::from_href("?n=5");
        let item = bind_to_query(Bindable::Detached(1), Some("n"), router.clone());
        match item {
            Bindable::Detached(v) => assert_eq!(v, 1),
            other => panic!("expected detached value, got {other:?}"),
        }
        assert_eq!(router.navigation_count(), 0);

        let err = attach(&Bindable::Detached(1), Some("n"), router, &SyncOptions::default())
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn same_reactive_is_returned() {
        let router = MemoryRouter::new();
        let value = reactive(0);
        let item = bind_to_query(Bindable::Slot(value.clone()), Some("v"), router);
        assert!(item.reactive().unwrap().ptr_eq(&value));
    }
}
