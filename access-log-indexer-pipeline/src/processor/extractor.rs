//! Field extraction interface.

use access_log_indexer_shared::FieldValue;

/// Pulls named fields out of a piece of text.
///
/// Implementations must be usable from several pipeline runs at once.
pub trait FieldExtractor: Send + Sync {
    /// Captured fields in pattern order, or `None` when the text does not match.
    fn extract(&self, text: &str) -> Option<Vec<(String, FieldValue)>>;
}
