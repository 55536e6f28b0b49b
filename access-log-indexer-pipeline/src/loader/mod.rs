//! Loader module for the access log indexer pipeline.
//!
//! Batches records and bulk-writes them into daily indices.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use access_log_indexer_repository::{BulkDocument, IndexConfig, IndexingBackend};
use access_log_indexer_shared::Record;
use tracing::{debug, info, instrument, warn};

use crate::errors::PipelineError;

/// Default number of records per bulk request.
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

/// Configuration for the batching indexer.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of records per bulk request.
    pub page_size: usize,
    /// Deadline for a single bulk request. `None` waits indefinitely.
    pub flush_timeout: Option<Duration>,
    /// Field holding the time that selects the daily index.
    pub timestamp_field: String,
    /// Index naming.
    pub index: IndexConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            flush_timeout: Some(Duration::from_secs(60)),
            timestamp_field: "@timestamp".to_string(),
            index: IndexConfig::default(),
        }
    }
}

/// Counters kept across the flushes of one indexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    /// Bulk requests sent.
    pub flushes: usize,
    /// Documents sent across all bulk requests.
    pub submitted: usize,
    /// Documents the backend accepted.
    pub indexed: usize,
    /// Documents the backend rejected individually.
    pub item_errors: usize,
    /// Records dropped because their timestamp was missing or unparseable.
    pub dropped_timestamps: usize,
}

/// Buffers records and writes them in bulk.
///
/// The indexer is responsible for:
/// - Addressing each record to its daily index
/// - Flushing a full page before accepting more records
/// - Logging and counting per-document rejections
///
/// A failed bulk request is returned to the caller and never retried.
pub struct BatchingIndexer {
    backend: Arc<dyn IndexingBackend>,
    config: LoaderConfig,
    pending: Vec<BulkDocument>,
    stats: LoaderStats,
}

impl BatchingIndexer {
    /// Create a new indexer with the default configuration.
    pub fn new(backend: Arc<dyn IndexingBackend>) -> Self {
        Self::with_config(backend, LoaderConfig::default())
    }

    /// Create a new indexer with custom configuration.
    pub fn with_config(backend: Arc<dyn IndexingBackend>, mut config: LoaderConfig) -> Self {
        config.page_size = config.page_size.max(1);
        Self {
            backend,
            pending: Vec::with_capacity(config.page_size.min(DEFAULT_PAGE_SIZE)),
            config,
            stats: LoaderStats::default(),
        }
    }

    /// Add a record, flushing first if the buffer already holds a full page.
    ///
    /// Records without a usable timestamp are dropped and counted.
    pub async fn push(&mut self, record: Record) -> Result<(), PipelineError> {
        if self.pending.len() >= self.config.page_size {
            self.flush().await?;
        }

        let Some(timestamp) = record.timestamp(&self.config.timestamp_field) else {
            self.stats.dropped_timestamps += 1;
            debug!(field = %self.config.timestamp_field, "Dropping record without usable timestamp");
            return Ok(());
        };

        self.pending.push(BulkDocument {
            index: self.config.index.index_for(&timestamp),
            document_type: self.config.index.document_type.clone(),
            id: record.id.clone(),
            source: record.to_document(),
        });
        Ok(())
    }

    /// Write every buffered record in one bulk request.
    ///
    /// Does nothing when the buffer is empty.
    #[instrument(skip(self))]
    pub async fn flush(&mut self) -> Result<(), PipelineError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let documents: Vec<BulkDocument> = self.pending.drain(..).collect();
        let count = documents.len();
        let indices = documents.iter().map(|d| d.index.as_str()).collect::<HashSet<_>>().len();
        self.stats.flushes += 1;
        self.stats.submitted += count;

        let request = self.backend.bulk_write(&documents);
        let summary = match self.config.flush_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| PipelineError::timeout("bulk write", limit))??,
            None => request.await?,
        };

        for item in &summary.item_errors {
            warn!(
                position = item.position,
                index = %item.index,
                status = item.status,
                reason = %item.reason,
                "Document rejected by backend"
            );
        }

        self.stats.indexed += summary.succeeded;
        self.stats.item_errors += summary.failed;

        info!(
            count = count,
            indices = indices,
            succeeded = summary.succeeded,
            failed = summary.failed,
            dropped_timestamps = self.stats.dropped_timestamps,
            "Flushed documents"
        );
        Ok(())
    }

    /// Flush whatever remains and return the final counters.
    pub async fn finish(mut self) -> Result<LoaderStats, PipelineError> {
        self.flush().await?;
        Ok(self.stats)
    }

    /// Number of buffered records.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> LoaderStats {
        self.stats
    }
}
