//! # Access Log Indexer Shared
//!
//! Plain data types passed between the layers of the access log indexer:
//! parsed records, the location of a source object, and per-object run
//! counters.

mod location;
mod record;
mod stats;

pub use location::ObjectLocation;
pub use record::{FieldValue, Record};
pub use stats::FileRunStats;
