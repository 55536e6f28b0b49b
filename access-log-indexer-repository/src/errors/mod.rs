//! Error types for the access log indexer repository.

mod indexing_error;

pub use indexing_error::IndexingError;
