//! Error types for the access log indexer pipeline.

use std::time::Duration;

use access_log_indexer_repository::IndexingError;
use thiserror::Error;

use crate::processor::GrokError;
use crate::source::SourceError;

/// Errors that abort the processing of a source object.
///
/// Line-level and member-level problems never surface here; they are
/// absorbed and counted in the run statistics.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The object could not be fetched.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// The backend failed a whole batch.
    #[error("Indexing error: {0}")]
    IndexingError(#[from] IndexingError),

    /// A field extraction pattern failed to compile.
    #[error("Pattern error: {0}")]
    PatternError(#[from] GrokError),

    /// An operation exceeded its deadline.
    #[error("{operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },

    /// I/O error while reading the reconstructed stream.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PipelineError {
    /// Create a timeout error.
    pub fn timeout(operation: &'static str, elapsed: Duration) -> Self {
        Self::Timeout { operation, elapsed }
    }
}
