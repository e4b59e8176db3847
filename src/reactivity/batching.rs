// ============================================================================
// spark-query-sync - Batching
// Group multiple updates into a single watcher run
// ============================================================================

use crate::core::context::with_context;
use crate::reactivity::scheduling::flush_pending_watchers;

// =============================================================================
// BATCH
// =============================================================================

/// Batch multiple updates so each watcher runs once, after all of them.
///
/// This is how rapid mutations coalesce into a single navigation: a bound
/// value changed three times inside `batch` pushes one query update carrying
/// the final state.
///
/// # Example
///
/// ```
/// use spark_query_sync::{batch, reactive};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = reactive(0);
/// let runs = Rc::new(Cell::new(0));
///
/// let runs_clone = runs.clone();
/// let _handle = count.watch(move |_| runs_clone.set(runs_clone.get() + 1));
///
/// batch(|| {
///     count.set(1);
///     count.set(2);
///     count.set(3);
/// });
///
/// assert_eq!(runs.get(), 1);
/// assert_eq!(count.get(), 3);
/// ```
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    let _open = OpenBatch::enter();
    f()
}

/// Closes its batch on drop, including during unwinding.
///
/// Only the outermost batch flushes, and not while a panic is unwinding:
/// the queued watchers stay queued for the next write or [`flush_sync`].
///
/// [`flush_sync`]: crate::reactivity::scheduling::flush_sync
struct OpenBatch;

impl OpenBatch {
    fn enter() -> Self {
        with_context(|ctx| ctx.enter_batch());
        OpenBatch
    }
}

impl Drop for OpenBatch {
    fn drop(&mut self) {
        let outermost = with_context(|ctx| ctx.exit_batch()) == 0;
        if outermost && !std::thread::panicking() {
            flush_pending_watchers();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::is_batching;
    use crate::primitives::reactive::reactive;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn batch_returns_value() {
        let result = batch(|| 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn batch_flag_is_scoped() {
        assert!(!is_batching());
        batch(|| {
            assert!(is_batching());
            batch(|| assert!(is_batching()));
            assert!(is_batching());
        });
        assert!(!is_batching());
    }

    #[test]
    fn nested_batch_flushes_once_at_outermost() {
        let value = reactive(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let _handle = value.watch(move |v| seen_clone.borrow_mut().push(*v));

        batch(|| {
            value.set(1);
            batch(|| {
                value.set(2);
            });
            // Inner batch ended but outer still open
            assert!(seen.borrow().is_empty());
            value.set(3);
        });

        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn panicking_batch_defers_watchers_to_flush_sync() {
        let value = reactive(0);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let _handle = value.watch(move |_| runs_clone.set(runs_clone.get() + 1));

        let value_clone = value.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch(|| {
                value_clone.set(5);
                panic!("boom");
            })
        }));

        assert!(result.is_err());
        assert!(!is_batching());
        assert_eq!(runs.get(), 0);

        crate::reactivity::scheduling::flush_sync();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn write_after_panicking_batch_flushes_leftovers() {
        let value = reactive(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let _handle = value.watch(move |v| seen_clone.borrow_mut().push(*v));

        let value_clone = value.clone();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            batch(|| {
                value_clone.set(1);
                panic!("boom");
            })
        }));
        assert!(seen.borrow().is_empty());

        value.set(2);
        assert_eq!(*seen.borrow(), vec![2]);
    }
}
