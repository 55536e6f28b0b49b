//! # Access Log Indexer Repository
//!
//! This crate provides the interface for writing parsed access log records
//! to the indexing backend, together with a concrete implementation for
//! OpenSearch. It includes definitions for errors, bulk outcome types and
//! time-bucketed index naming.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::IndexConfig;
pub use errors::IndexingError;
pub use interfaces::IndexingBackend;
pub use opensearch::{OpenSearchClient, OpenSearchCredentials};
pub use types::{BulkDocument, BulkItemError, BulkSummary};
