//! Source module for the access log indexer pipeline.
//!
//! Fetches log objects and decodes the notifications that announce them.

mod notification;
mod object_store_source;

use access_log_indexer_shared::ObjectLocation;
use async_trait::async_trait;
use thiserror::Error;

pub use notification::{parse_notification, ObjectNotification};
pub use object_store_source::ObjectStoreSource;

/// Errors raised while locating or reading a source object.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The object does not exist.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The store could not be configured or reached.
    #[error("Object store error: {0}")]
    StoreError(String),

    /// The notification payload could not be decoded.
    #[error("Invalid notification: {0}")]
    InvalidNotification(String),
}

impl SourceError {
    /// Create an object store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    /// Create an invalid notification error.
    pub fn invalid_notification(msg: impl Into<String>) -> Self {
        Self::InvalidNotification(msg.into())
    }
}

/// A fetched object body.
#[derive(Debug, Clone)]
pub struct SourceObject {
    /// The full object body.
    pub data: Vec<u8>,
    /// Length reported by the store, used only for logging.
    pub declared_len: u64,
}

/// Abstract interface for reading log objects.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Read a whole object into memory.
    async fn fetch(&self, location: &ObjectLocation) -> Result<SourceObject, SourceError>;
}
