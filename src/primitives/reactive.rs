// ============================================================================
// spark-query-sync - Reactive Primitive
// A shared, observable value: the host side of a query binding
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::context::with_context;
use crate::core::types::{AnyWatcher, EqualsFn, ObserverFn, ReactiveObserver};
use crate::primitives::watch::{WatchHandle, WatcherInner};
use crate::reactivity::scheduling::schedule_watcher;

// =============================================================================
// REACTIVE INNER
// =============================================================================

/// Shared state behind every clone of a `Reactive<T>`.
pub struct ReactiveInner<T> {
    /// The current value
    value: RefCell<T>,

    /// Equality used to decide whether a write is a change
    equals: EqualsFn<T>,

    /// Global write version at the last change
    write_version: Cell<u32>,

    /// Registered watchers (stopped ones are pruned on the next change)
    watchers: RefCell<Vec<Rc<WatcherInner<T>>>>,
}

impl<T> ReactiveInner<T> {
    fn new(value: T, equals: EqualsFn<T>) -> Self {
        Self {
            value: RefCell::new(value),
            equals,
            write_version: Cell::new(0),
            watchers: RefCell::new(Vec::new()),
        }
    }

    /// Clone of the current value
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }
}

// =============================================================================
// REACTIVE<T> - The public handle
// =============================================================================

/// A reactive value that notifies its watchers on every change.
///
/// Cloning the handle shares the value. Writes go through [`Reactive::set`]
/// or [`Reactive::update`]; both compare against the previous value and only
/// notify when it actually changed, however deep inside the value the
/// mutation happened.
///
/// # Example
///
/// ```
/// use spark_query_sync::reactive;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let count = reactive(0);
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let seen_clone = seen.clone();
/// count.watch(move |v| seen_clone.borrow_mut().push(*v));
///
/// count.set(1);
/// count.set(1); // unchanged, no notification
/// count.update(|n| *n += 1);
///
/// assert_eq!(*seen.borrow(), vec![1, 2]);
/// ```
pub struct Reactive<T> {
    inner: Rc<ReactiveInner<T>>,
}

impl<T> Clone for Reactive<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Reactive<T> {
    /// Create a new reactive value with the given initial value.
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::new_with_equals(value, crate::reactivity::equality::equals)
    }

    /// Create a new reactive value with a custom equality function.
    pub fn new_with_equals(value: T, equals: EqualsFn<T>) -> Self {
        Self {
            inner: Rc::new(ReactiveInner::new(value, equals)),
        }
    }

    /// Get the current value (cloning).
    pub fn get(&self) -> T {
        self.inner.snapshot()
    }

    /// Access the current value with a closure (avoids cloning).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    /// Set the value.
    ///
    /// Returns true if the value changed (based on the equality function).
    /// If it didn't change, no watcher runs.
    pub fn set(&self, value: T) -> bool {
        let changed = !(self.inner.equals)(&*self.inner.value.borrow(), &value);
        if changed {
            *self.inner.value.borrow_mut() = value;
            self.notify();
        }
        changed
    }

    /// Mutate the value in place.
    ///
    /// Watchers run if the value after `f` differs from the value before it,
    /// which is what makes nested field edits observable.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let before = self.inner.snapshot();
        f(&mut *self.inner.value.borrow_mut());
        let changed = !(self.inner.equals)(&before, &*self.inner.value.borrow());
        if changed {
            self.notify();
        }
        changed
    }

    /// Register a deep-change watcher.
    ///
    /// The callback receives the value after each change. It keeps running
    /// until the returned handle is stopped or the value is dropped.
    pub fn watch(&self, f: impl FnMut(&T) + 'static) -> WatchHandle {
        self.watch_boxed(Box::new(f))
    }

    fn watch_boxed(&self, f: ObserverFn<T>) -> WatchHandle {
        let watcher = WatcherInner::new(Rc::downgrade(&self.inner), f);
        self.inner.watchers.borrow_mut().push(watcher.clone());
        WatchHandle::new(watcher)
    }

    /// Number of watchers that have not been stopped.
    pub fn watcher_count(&self) -> usize {
        self.inner
            .watchers
            .borrow()
            .iter()
            .filter(|w| !w.is_stopped())
            .count()
    }

    /// Global write version at this value's last change (0 if never changed).
    pub fn write_version(&self) -> u32 {
        self.inner.write_version.get()
    }

    /// Whether two handles share the same value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn notify(&self) {
        let version = with_context(|ctx| ctx.increment_write_version());
        self.inner.write_version.set(version);

        // Collect-then-schedule: watchers may register or stop watchers
        let watchers: Vec<Rc<WatcherInner<T>>> = {
            let mut list = self.inner.watchers.borrow_mut();
            list.retain(|w| !w.is_stopped());
            list.clone()
        };

        tracing::trace!(watchers = watchers.len(), version, "reactive value changed");

        for watcher in watchers {
            schedule_watcher(watcher);
        }
    }
}

impl<T: Clone + 'static> ReactiveObserver for Reactive<T> {
    type Value = T;

    fn snapshot(&self) -> T {
        self.get()
    }

    fn replace(&self, value: T) {
        self.set(value);
    }

    fn observe(&self, observer: ObserverFn<T>) -> WatchHandle {
        self.watch_boxed(observer)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Reactive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactive")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

// =============================================================================
// CREATION FUNCTIONS
// =============================================================================

/// Create a new reactive value.
///
/// # Example
///
/// ```
/// use spark_query_sync::reactive;
///
/// let name = reactive(String::from("John"));
/// name.set("Jane".to_string());
/// assert_eq!(name.get(), "Jane");
/// ```
pub fn reactive<T>(value: T) -> Reactive<T>
where
    T: Clone + PartialEq + 'static,
{
    Reactive::new(value)
}

/// Create a reactive value with a custom equality function.
pub fn reactive_with_equals<T>(value: T, equals: EqualsFn<T>) -> Reactive<T>
where
    T: Clone + 'static,
{
    Reactive::new_with_equals(value, equals)
}

/// Create a reactive value where every write counts as a change.
///
/// # Example
///
/// ```
/// use spark_query_sync::mutable_reactive;
///
/// let data = mutable_reactive(vec![1, 2, 3]);
/// assert!(data.set(vec![1, 2, 3]));
/// ```
pub fn mutable_reactive<T>(value: T) -> Reactive<T>
where
    T: Clone + 'static,
{
    Reactive::new_with_equals(value, crate::reactivity::equality::never_equals)
}

// =============================================================================
// TESTS
// =============================================================================
