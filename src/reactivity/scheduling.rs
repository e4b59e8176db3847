// ============================================================================
// spark-query-sync - Watcher Scheduling
// Queues watchers and flushes them in mutation order
// ============================================================================
//
// There is no microtask queue to defer to, so a change flushes synchronously
// unless a batch is open or a flush is already running. Watchers that write
// to reactive values while running are queued behind the current round and
// picked up by the same flush loop.
// ============================================================================

use std::rc::{Rc, Weak};

use crate::core::constants::MAX_FLUSH_COUNT;
use crate::core::context::with_context;
use crate::core::types::AnyWatcher;

// =============================================================================
// SCHEDULE WATCHER
// =============================================================================

/// Queue a watcher and flush unless the runtime is batching.
///
/// A watcher already waiting in the queue is not queued twice, so several
/// changes inside one batch coalesce into a single run.
pub fn schedule_watcher(watcher: Rc<dyn AnyWatcher>) {
    if watcher.is_stopped() {
        return;
    }

    // Already queued: flush anyway, the queue may be left over from a panic
    let should_flush = with_context(|ctx| {
        if !watcher.is_pending() {
            watcher.mark_pending();
            ctx.add_pending_watcher(Rc::downgrade(&watcher));
        }
        !ctx.is_batching() && !ctx.is_flushing()
    });

    if should_flush {
        flush_pending_watchers();
    }
}

// =============================================================================
// FLUSH
// =============================================================================

/// Run every queued watcher until the queue is empty.
///
/// Watchers queued by other watchers run in later rounds of the same flush.
/// A watcher that keeps re-queueing itself is cut off after
/// `MAX_FLUSH_COUNT` rounds: the rest of the queue is dropped and an error
/// is logged.
pub fn flush_pending_watchers() {
    let was_flushing = with_context(|ctx| ctx.set_flushing(true));
    if was_flushing {
        return;
    }

    let mut flush = FlushGuard { round: Vec::new() };
    let mut flush_count = 0u32;
    loop {
        flush.round = with_context(|ctx| ctx.take_pending_watchers());
        if flush.round.is_empty() {
            break;
        }

        flush_count += 1;
        if flush_count > MAX_FLUSH_COUNT {
            tracing::error!(
                dropped = flush.round.len(),
                "maximum update depth exceeded; a watcher keeps triggering itself"
            );
            break;
        }

        for idx in 0..flush.round.len() {
            let Some(watcher) = flush.round[idx].upgrade() else {
                continue;
            };
            watcher.clear_pending();
            if !watcher.is_stopped() {
                watcher.run();
            }
        }
    }
}

/// Ends a flush, also when a watcher callback panics.
///
/// Watchers of the current round that never ran lose their pending mark so
/// later changes can schedule them again.
struct FlushGuard {
    round: Vec<Weak<dyn AnyWatcher>>,
}

impl Drop for FlushGuard {
    fn drop(&mut self) {
        for watcher in self.round.drain(..).filter_map(|w| w.upgrade()) {
            watcher.clear_pending();
        }
        with_context(|ctx| ctx.set_flushing(false));
    }
}

/// Synchronously flush anything still queued.
///
/// Regular writes flush on their own. This picks up watchers left in the
/// queue by a batch or a watcher that panicked.
pub fn flush_sync() {
    flush_pending_watchers();
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::*;
    use std::cell::Cell;

    struct CountingWatcher {
        flags: Cell<u32>,
        runs: Cell<u32>,
        requeue: Cell<bool>,
        self_rc: std::cell::RefCell<Option<std::rc::Weak<CountingWatcher>>>,
    }

    impl CountingWatcher {
        fn new() -> Rc<Self> {
            let w = Rc::new(Self {
                flags: Cell::new(ACTIVE),
                runs: Cell::new(0),
                requeue: Cell::new(false),
                self_rc: std::cell::RefCell::new(None),
            });
            *w.self_rc.borrow_mut() = Some(Rc::downgrade(&w));
            w
        }
    }

    impl AnyWatcher for CountingWatcher {
        fn flags(&self) -> u32 {
            self.flags.get()
        }

        fn set_flags(&self, flags: u32) {
            self.flags.set(flags);
        }

        fn run(&self) {
            self.runs.set(self.runs.get() + 1);
            if self.requeue.get() {
                let me = self.self_rc.borrow().as_ref().and_then(|w| w.upgrade());
                if let Some(me) = me {
                    schedule_watcher(me);
                }
            }
        }

        fn stop(&self) {
            self.flags.set(STOPPED);
        }
    }

    #[test]
    fn runs_immediately_outside_batch() {
        let w = CountingWatcher::new();
        schedule_watcher(w.clone());
        assert_eq!(w.runs.get(), 1);
        assert!(!w.is_pending());
    }

    #[test]
    fn stopped_watcher_never_runs() {
        let w = CountingWatcher::new();
        w.stop();
        schedule_watcher(w.clone());
        assert_eq!(w.runs.get(), 0);
    }

    #[test]
    fn coalesces_inside_batch() {
        let w = CountingWatcher::new();
        crate::reactivity::batching::batch(|| {
            schedule_watcher(w.clone());
            schedule_watcher(w.clone());
            schedule_watcher(w.clone());
            assert_eq!(w.runs.get(), 0);
        });
        assert_eq!(w.runs.get(), 1);
    }

    #[test]
    fn self_triggering_watcher_is_cut_off() {
        let w = CountingWatcher::new();
        w.requeue.set(true);
        schedule_watcher(w.clone());
        assert_eq!(w.runs.get(), MAX_FLUSH_COUNT);
        assert!(!w.is_pending());
        assert!(!with_context(|ctx| ctx.is_flushing()));
        assert_eq!(with_context(|ctx| ctx.pending_count()), 0);
    }

    #[test]
    fn panicking_watcher_does_not_wedge_the_queue() {
        use crate::primitives::reactive::reactive;

        let faulty = reactive(0);
        let _faulty_handle = faulty.watch(|v| {
            if *v == 1 {
                panic!("watcher failed");
            }
        });

        let healthy = reactive(0);
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let _healthy_handle = healthy.watch(move |_| runs_clone.set(runs_clone.get() + 1));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| faulty.set(1)));
        assert!(result.is_err());
        assert!(!with_context(|ctx| ctx.is_flushing()));

        healthy.set(1);
        assert_eq!(runs.get(), 1);
    }
}
