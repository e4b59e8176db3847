// ============================================================================
// spark-query-sync - Binding Module
// Hydrate reactive values from the query and push their changes back
// ============================================================================

pub mod codec;
pub mod persistence;
pub mod record;
pub mod scalar;

pub use codec::{decode_query_value, encode_query_value};
pub use persistence::{bind_to_query, bind_to_query_with, Bindable};
pub use record::{bind_record, bind_record_with};
pub use scalar::{bind_scalar, bind_scalar_with};
