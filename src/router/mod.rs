// ============================================================================
// spark-query-sync - Router Module
// Query-string codec and an in-memory QuerySource
// ============================================================================

pub mod memory;
pub mod query;

pub use memory::{MemoryRouter, Navigation};
pub use query::{parse_query, to_query_string};
