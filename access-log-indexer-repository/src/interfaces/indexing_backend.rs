//! Indexing backend trait definition.

use async_trait::async_trait;

use crate::errors::IndexingError;
use crate::types::{BulkDocument, BulkSummary};

/// Abstract interface for the bulk indexing backend.
///
/// One instance is constructed per process and shared (behind an `Arc`)
/// by every pipeline run, so implementations must tolerate several bulk
/// calls in flight at once.
///
/// # Error Handling
///
/// `Err` always means the request failed as a whole. Documents rejected
/// individually are reported in the returned [`BulkSummary`].
#[async_trait]
pub trait IndexingBackend: Send + Sync {
    /// Write documents in a single bulk request.
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents, each addressed to its own index
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - Per-document outcomes
    /// * `Err(IndexingError)` - If the request failed as a whole
    async fn bulk_write(&self, documents: &[BulkDocument]) -> Result<BulkSummary, IndexingError>;

    /// Install the index template covering the daily indices.
    ///
    /// This should be called during application startup.
    async fn ensure_index_template(&self) -> Result<(), IndexingError>;

    /// Check if the backend is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the backend answered successfully
    /// * `Ok(false)` - If the backend answered with an error status
    /// * `Err(IndexingError)` - If the check could not be executed
    async fn health_check(&self) -> Result<bool, IndexingError>;
}
