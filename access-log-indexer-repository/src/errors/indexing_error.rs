//! Indexing error types.
//!
//! Every variant is a batch-level failure: the whole request is considered
//! lost. Rejections of individual documents are not errors, they are
//! reported through [`crate::BulkSummary`].

use thiserror::Error;

/// Errors that can occur while talking to the indexing backend.
#[derive(Error, Debug, Clone)]
pub enum IndexingError {
    /// Failed to establish connection to the backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The bulk request failed as a whole (transport or server error).
    #[error("Bulk request error: {0}")]
    BulkRequestError(String),

    /// Failed to parse a response from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to install the index template.
    #[error("Index template error: {0}")]
    TemplateError(String),
}

impl IndexingError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk request error.
    pub fn bulk_request(msg: impl Into<String>) -> Self {
        Self::BulkRequestError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an index template error.
    pub fn template(msg: impl Into<String>) -> Self {
        Self::TemplateError(msg.into())
    }
}
