// ============================================================================
// spark-query-sync - Reactivity Module
// Batching, scheduling and change detection for the watcher runtime
// ============================================================================

pub mod batching;
pub mod equality;
pub mod scheduling;

// Re-export scheduling functions
pub use scheduling::{flush_pending_watchers, flush_sync, schedule_watcher};

// Re-export batching functions
pub use batching::batch;
