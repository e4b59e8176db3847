// ============================================================================
// spark-query-sync - Primitives Module
// Reactive values and their watchers
// ============================================================================

pub mod reactive;
pub mod watch;

// Re-export for convenience
pub use reactive::{mutable_reactive, reactive, reactive_with_equals, Reactive, ReactiveInner};
pub use watch::{WatchHandle, WatcherInner};
