//! Per-object counters.

use serde::Serialize;

/// Counters for one run of the orchestrator over one source object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileRunStats {
    /// Bytes fetched from the object store.
    pub bytes_read: u64,
    /// Gzip header candidates found by the scanner.
    pub members_found: usize,
    /// Candidates that failed to decompress and were skipped.
    pub members_skipped: usize,
    /// Lines read from the (reconstructed) stream, blank ones included.
    pub lines_seen: usize,
    /// Lines the primary pattern could not match.
    pub parse_misses: usize,
    /// Records excluded from a flush because their timestamp did not parse.
    pub dropped_timestamps: usize,
    /// Documents rejected individually by the backend.
    pub item_errors: usize,
    /// Documents accepted by the backend.
    pub lines_indexed: usize,
    /// Bulk requests sent.
    pub flushes: usize,
}

impl FileRunStats {
    /// All non-fatal errors absorbed while processing the object.
    pub fn errors(&self) -> usize {
        self.members_skipped + self.parse_misses + self.dropped_timestamps + self.item_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_total() {
        let stats = FileRunStats {
            members_skipped: 1,
            parse_misses: 2,
            dropped_timestamps: 3,
            item_errors: 4,
            ..Default::default()
        };
        assert_eq!(stats.errors(), 10);
    }
}
