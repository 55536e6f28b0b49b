//! # Access Log Indexer
//!
//! Main library for the load balancer access log indexer.
//!
//! This crate provides the entry point, configuration and logging setup
//! for running the ingest pipeline against newly arrived log objects.

pub mod config;
pub mod telemetry;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] access_log_indexer_pipeline::PipelineError),

    /// Indexing backend error.
    #[error("Indexing error: {0}")]
    IndexingError(#[from] access_log_indexer_repository::IndexingError),

    /// Notification or object source error.
    #[error("Source error: {0}")]
    SourceError(#[from] access_log_indexer_pipeline::SourceError),

    /// Some objects of the trigger failed.
    #[error("{failed} of {total} objects failed")]
    IngestFailed { failed: usize, total: usize },

    /// The run was interrupted before it finished.
    #[error("Interrupted")]
    Interrupted,

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
