// ============================================================================
// spark-query-sync - Watchers
// Deep-change observers attached to a reactive value
// ============================================================================
//
// A watcher belongs to exactly one reactive value. The value keeps it alive;
// the watcher only holds a Weak back-reference, so dropping the last handle
// to a value drops its watchers and their callbacks with it.
//
// Watchers are not tied to the lifetime of their handle. Like a framework
// `watch()` registered in a component's setup, they run until stopped
// explicitly or until the value goes away.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::types::{AnyWatcher, ObserverFn};
use crate::primitives::reactive::ReactiveInner;

// =============================================================================
// WATCHER INNER
// =============================================================================

/// The inner watcher implementation.
pub struct WatcherInner<T> {
    /// Flags bitmask for state tracking
    flags: Cell<u32>,

    /// The callback; taken out while it runs so it may touch its own source
    callback: RefCell<Option<ObserverFn<T>>>,

    /// The value being watched
    source: Weak<ReactiveInner<T>>,
}

impl<T> WatcherInner<T> {
    /// Create a new active watcher
    pub fn new(source: Weak<ReactiveInner<T>>, callback: ObserverFn<T>) -> Rc<Self> {
        Rc::new(Self {
            flags: Cell::new(ACTIVE),
            callback: RefCell::new(Some(callback)),
            source,
        })
    }
}

impl<T: Clone + 'static> AnyWatcher for WatcherInner<T> {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn run(&self) {
        let Some(source) = self.source.upgrade() else {
            self.stop();
            return;
        };

        // Snapshot first: the callback may write back into the same value
        let value = source.snapshot();
        drop(source);

        let Some(mut callback) = self.callback.borrow_mut().take() else {
            return;
        };

        callback(&value);

        if !self.is_stopped() {
            *self.callback.borrow_mut() = Some(callback);
        }
    }

    fn stop(&self) {
        self.set_flags((self.flags() & !ACTIVE) | STOPPED);
        self.callback.borrow_mut().take();
    }
}

// =============================================================================
// WATCH HANDLE
// =============================================================================

/// Handle to a registered watcher.
///
/// Dropping the handle does NOT stop the watcher; call [`WatchHandle::stop`].
#[derive(Clone)]
pub struct WatchHandle {
    watcher: Weak<dyn AnyWatcher>,
}

impl WatchHandle {
    pub(crate) fn new(watcher: Rc<dyn AnyWatcher>) -> Self {
        Self {
            watcher: Rc::downgrade(&watcher),
        }
    }

    /// Stop the watcher. Idempotent.
    pub fn stop(&self) {
        if let Some(watcher) = self.watcher.upgrade() {
            watcher.stop();
        }
    }

    /// Whether the watcher still exists and has not been stopped
    pub fn is_active(&self) -> bool {
        self.watcher.upgrade().is_some_and(|w| !w.is_stopped())
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
