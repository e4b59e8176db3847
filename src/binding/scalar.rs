// ============================================================================
// spark-query-sync - Scalar Binding
// One reactive slot <-> one query key
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::binding::codec::{decode_query_value, encode_query_value};
use crate::core::config::SyncOptions;
use crate::core::error::SyncError;
use crate::core::types::{QuerySource, ReactiveObserver};
use crate::primitives::watch::WatchHandle;

/// Bind a single-slot value to the query key `key`, with default options.
///
/// If the query already holds `key`, its JSON value is decoded into the
/// slot. From then on every change of the slot pushes its JSON encoding to
/// the URL, keeping all other query parameters. Returns the slot.
///
/// # Example
///
/// ```
/// use spark_query_sync::{bind_scalar, reactive, MemoryRouter, QuerySource};
///
/// let router = MemoryRouter::from_href("/?count=5");
/// let count = bind_scalar(reactive(0), "count", router.clone());
/// assert_eq!(count.get(), 5);
///
/// count.set(6);
/// assert_eq!(router.query()["count"], "6");
/// ```
pub fn bind_scalar<S, R>(slot: S, key: &str, router: R) -> S
where
    S: ReactiveObserver + 'static,
    S::Value: Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    bind_scalar_with(slot, key, router, &SyncOptions::default())
}

/// [`bind_scalar`] with explicit options.
pub fn bind_scalar_with<S, R>(slot: S, key: &str, router: R, options: &SyncOptions) -> S
where
    S: ReactiveObserver + 'static,
    S::Value: Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    if let Err(err) = attach_scalar(&slot, key, router, options) {
        err.report();
    }
    slot
}

/// Hydrate and observe; returns the watcher so callers can stop it.
pub(crate) fn attach_scalar<S, R>(
    slot: &S,
    key: &str,
    router: R,
    options: &SyncOptions,
) -> Result<WatchHandle, SyncError>
where
    S: ReactiveObserver + 'static,
    S::Value: Serialize + DeserializeOwned + 'static,
    R: QuerySource + 'static,
{
    if key.is_empty() {
        return Err(SyncError::usage("a single-slot binding needs a non-empty key"));
    }

    if options.hydrate {
        hydrate_scalar(slot, key, &router);
    }

    let key = key.to_string();
    let mode = options.navigation;
    Ok(slot.observe(Box::new(move |value: &S::Value| {
        let encoded = match encode_query_value(&key, value) {
            Ok(encoded) => encoded,
            Err(err) => return err.report(),
        };
        let mut query = router.query();
        query.insert(key.clone(), encoded);
        tracing::debug!(key = %key, "pushing slot to query");
        router.navigate(query, mode);
    })))
}

/// Apply the query value under `key`, if any. A bad value leaves the slot as is.
fn hydrate_scalar<S, R>(slot: &S, key: &str, router: &R)
where
    S: ReactiveObserver + 'static,
    S::Value: DeserializeOwned,
    R: QuerySource,
{
    let query = router.query();
    let Some(raw) = query.get(key) else {
        return;
    };
    match decode_query_value::<S::Value>(key, raw) {
        Ok(value) => {
            tracing::debug!(key = %key, "hydrated slot from query");
            slot.replace(value);
        }
        Err(err) => err.report(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
