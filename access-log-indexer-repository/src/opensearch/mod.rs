//! OpenSearch implementation of the indexing backend.
//!
//! This module provides a concrete implementation of `IndexingBackend`
//! using OpenSearch as the backend.

mod client;
mod index_config;

pub use client::{OpenSearchClient, OpenSearchCredentials};
pub use index_config::get_index_template;
