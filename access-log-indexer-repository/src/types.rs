//! Request and response types for bulk indexing.

use serde_json::Value;

/// One document of a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkDocument {
    /// Target index.
    pub index: String,
    /// Document-type tag.
    pub document_type: String,
    /// Explicit document id; `None` lets the backend assign one.
    pub id: Option<String>,
    /// The document body.
    pub source: Value,
}

/// A document the backend rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemError {
    /// Position of the document in the submitted request.
    pub position: usize,
    /// Index the document was addressed to.
    pub index: String,
    /// HTTP-style status reported for the item.
    pub status: u16,
    /// Backend-supplied reason.
    pub reason: String,
}

/// Outcome of a bulk request that reached the backend.
///
/// Individual failures are reported here rather than as an `Err` so that
/// callers can log them without failing the whole batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSummary {
    /// Number of documents in the request.
    pub total: usize,
    /// Number of documents accepted.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Details of every rejected document.
    pub item_errors: Vec<BulkItemError>,
}

impl BulkSummary {
    /// Summary for a request in which every document was accepted.
    pub fn all_succeeded(total: usize) -> Self {
        Self {
            total,
            succeeded: total,
            failed: 0,
            item_errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }
}
