// ============================================================================
// spark-query-sync - Type Definitions
// Shared aliases and the capability traits the bindings run against
// ============================================================================

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::constants::*;
use crate::primitives::watch::WatchHandle;

// =============================================================================
// DATA SHAPES
// =============================================================================

/// URL query parameters: string keys to string values.
///
/// Ordered so that serialized query strings are deterministic.
pub type QueryMap = BTreeMap<String, String>;

/// Single-level mapping produced by `flatten` and consumed by `unflatten`.
pub type FlatMap = Map<String, Value>;

/// Callback invoked with the current value after every observed change.
pub type ObserverFn<T> = Box<dyn FnMut(&T)>;

/// Equality function deciding whether a write counts as a change.
pub type EqualsFn<T> = fn(&T, &T) -> bool;

/// Default equality function using PartialEq
pub fn default_equals<T: PartialEq>(a: &T, b: &T) -> bool {
    a == b
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// How a navigation request treats the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Add a history entry (the default; back returns to the previous query)
    #[default]
    Push,
    /// Overwrite the current history entry
    Replace,
}

// =============================================================================
// CAPABILITY TRAITS
// =============================================================================
//
// The bindings never talk to a concrete router or UI framework. They need
// exactly two capabilities:
// - QuerySource: read the current query, request a navigation
// - ReactiveObserver: read/write a value in place, observe deep changes
//
// `MemoryRouter` and `Reactive<T>` are the in-crate implementations; a host
// framework adapts its own router and reactive cells to these traits.
// =============================================================================

/// Read access to the current URL query plus a way to request an update.
///
/// `navigate` is fire-and-forget: the binding never waits for completion.
pub trait QuerySource {
    /// The current query mapping
    fn query(&self) -> QueryMap;

    /// Replace the query mapping wholesale (no page reload)
    fn navigate(&self, query: QueryMap, mode: NavigationMode);
}

impl<Q: QuerySource + ?Sized> QuerySource for Rc<Q> {
    fn query(&self) -> QueryMap {
        (**self).query()
    }

    fn navigate(&self, query: QueryMap, mode: NavigationMode) {
        (**self).navigate(query, mode)
    }
}

/// A reactive container whose contents can be read, replaced and observed.
pub trait ReactiveObserver {
    /// The value held by the container
    type Value;

    /// Clone of the current value
    fn snapshot(&self) -> Self::Value;

    /// Replace the value in place, notifying observers if it changed
    fn replace(&self, value: Self::Value);

    /// Register a deep-change observer
    fn observe(&self, observer: ObserverFn<Self::Value>) -> WatchHandle;
}

// =============================================================================
// TYPE-ERASED WATCHER
// =============================================================================
//
// The flush queue holds watchers of every value type, so the scheduler only
// sees this trait. Running a watcher re-reads its source and calls the
// callback; the value type stays inside the concrete implementation.
// =============================================================================

/// Type-erased watcher interface used by the scheduler.
pub trait AnyWatcher {
    /// Get the flags bitmask
    fn flags(&self) -> u32;

    /// Set the flags bitmask
    fn set_flags(&self, flags: u32);

    /// Run the callback against the source's current value
    fn run(&self);

    /// Stop the watcher permanently and release its callback
    fn stop(&self);

    /// Check if this watcher is queued
    fn is_pending(&self) -> bool {
        self.flags() & PENDING != 0
    }

    /// Check if this watcher was stopped
    fn is_stopped(&self) -> bool {
        self.flags() & STOPPED != 0
    }

    /// Queue marker on
    fn mark_pending(&self) {
        self.set_flags(self.flags() | PENDING);
    }

    /// Queue marker off
    fn clear_pending(&self) {
        self.set_flags(self.flags() & !PENDING);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingSource {
        query: RefCell<QueryMap>,
        modes: RefCell<Vec<NavigationMode>>,
    }

    impl QuerySource for RecordingSource {
        fn query(&self) -> QueryMap {
            self.query.borrow().clone()
        }

        fn navigate(&self, query: QueryMap, mode: NavigationMode) {
            *self.query.borrow_mut() = query;
            self.modes.borrow_mut().push(mode);
        }
    }

    #[test]
    fn rc_forwards_query_source() {
        let source = Rc::new(RecordingSource {
            query: RefCell::new(QueryMap::new()),
            modes: RefCell::new(Vec::new()),
        });
        let as_trait: Rc<dyn QuerySource> = source.clone();

        let mut next = QueryMap::new();
        next.insert("page".into(), "2".into());
        as_trait.navigate(next.clone(), NavigationMode::Replace);

        assert_eq!(source.query(), next);
        assert_eq!(*source.modes.borrow(), vec![NavigationMode::Replace]);
    }

    #[test]
    fn navigation_mode_serde() {
        assert_eq!(NavigationMode::default(), NavigationMode::Push);
        let mode: NavigationMode = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(mode, NavigationMode::Replace);
        assert_eq!(serde_json::to_string(&NavigationMode::Push).unwrap(), "\"push\"");
    }

    #[test]
    fn default_equals_uses_partial_eq() {
        assert!(default_equals(&1, &1));
        assert!(!default_equals(&"a", &"b"));
    }
}
