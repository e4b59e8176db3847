// ============================================================================
// spark-query-sync - Constants
// Watcher flags and limits shared by the runtime and the transforms
// ============================================================================

// =============================================================================
// WATCHER STATE FLAGS
// =============================================================================

/// Watcher is registered and will run on the next change
pub const ACTIVE: u32 = 1 << 0;

/// Watcher is queued for the current (or next) flush
pub const PENDING: u32 = 1 << 1;

/// Watcher was stopped through its handle and never runs again
pub const STOPPED: u32 = 1 << 2;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum flush iterations before a self-triggering watcher is cut off
pub const MAX_FLUSH_COUNT: u32 = 1000;

/// Largest array index unflatten will materialize from a numeric key segment.
///
/// Query strings are user controlled; `items4294967295` must not allocate
/// four billion `null`s.
pub const MAX_ARRAY_INDEX: usize = 1024;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Section name under which a host configuration document stores options
pub const CONFIG_KEY: &str = "querySync";

// =============================================================================
// TESTS
// =============================================================================
