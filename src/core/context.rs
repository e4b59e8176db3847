// ============================================================================
// spark-query-sync - Runtime Context
// Per-thread bookkeeping: write counter, open batches, the watcher queue
// ============================================================================
//
// Reactive handles are `Rc`-based and never leave their thread, so each
// thread owns exactly one context. Nothing outside `reactivity/` and the
// write path of `Reactive<T>` should need to touch it.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Weak;

use super::types::AnyWatcher;

/// Runtime state shared by every reactive value on the current thread.
pub struct ReactiveContext {
    /// Bumped on every accepted write; starts at 1 so 0 means "never written"
    writes: Cell<u32>,
    /// Open `batch` calls
    batch_depth: Cell<u32>,
    /// Watchers waiting for the next flush, in scheduling order
    queue: RefCell<Vec<Weak<dyn AnyWatcher>>>,
    flushing: Cell<bool>,
}

impl ReactiveContext {
    pub fn new() -> Self {
        Self {
            writes: Cell::new(1),
            batch_depth: Cell::new(0),
            queue: RefCell::new(Vec::new()),
            flushing: Cell::new(false),
        }
    }

    /// Record a write and return its version
    pub fn increment_write_version(&self) -> u32 {
        let next = self.writes.get().wrapping_add(1);
        self.writes.set(next);
        next
    }

    pub fn get_write_version(&self) -> u32 {
        self.writes.get()
    }

    /// Open a batch; returns the new depth
    pub fn enter_batch(&self) -> u32 {
        self.batch_depth.set(self.batch_depth.get() + 1);
        self.batch_depth.get()
    }

    /// Close a batch; returns the remaining depth, never below zero
    pub fn exit_batch(&self) -> u32 {
        self.batch_depth.set(self.batch_depth.get().saturating_sub(1));
        self.batch_depth.get()
    }

    pub fn get_batch_depth(&self) -> u32 {
        self.batch_depth.get()
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth.get() > 0
    }

    pub fn add_pending_watcher(&self, watcher: Weak<dyn AnyWatcher>) {
        self.queue.borrow_mut().push(watcher);
    }

    /// Drain the queue, leaving it empty for watchers scheduled meanwhile
    pub fn take_pending_watchers(&self) -> Vec<Weak<dyn AnyWatcher>> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Set the flushing flag, returning its previous value
    pub fn set_flushing(&self, value: bool) -> bool {
        self.flushing.replace(value)
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

/// Run `f` against this thread's context.
pub fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Whether a `batch` is open on this thread
pub fn is_batching() -> bool {
    with_context(|ctx| ctx.is_batching())
}

/// Version of the most recent write on this thread
pub fn write_version() -> u32 {
    with_context(|ctx| ctx.get_write_version())
}

// =============================================================================
// TESTS
// =============================================================================
