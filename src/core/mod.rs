// ============================================================================
// spark-query-sync - Core Module
// Shared types, capability traits, errors, options and runtime context
// ============================================================================

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::SyncOptions;
pub use constants::*;
pub use context::{is_batching, with_context, write_version, ReactiveContext};
pub use error::{KeyError, SyncError};
pub use types::{
    default_equals, AnyWatcher, EqualsFn, FlatMap, NavigationMode, ObserverFn, QueryMap,
    QuerySource, ReactiveObserver,
};
