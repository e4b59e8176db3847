// ============================================================================
// spark-query-sync - Transform Module
// Pure conversions between nested values and flat query-safe mappings
// ============================================================================

pub mod flatten;
pub mod keys;
pub mod unflatten;

pub use flatten::{flatten, flatten_value};
pub use keys::{join_key, split_key};
pub use unflatten::{try_unflatten, unflatten};
