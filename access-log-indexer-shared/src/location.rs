//! Identity of a source object in the object store.

use serde::{Deserialize, Serialize};

/// Suffix marking objects that hold concatenated gzip members.
const COMPRESSED_SUFFIX: &str = ".gz";

/// Where a log object lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    /// Region hosting the bucket.
    pub region: String,
    /// Bucket name. Also used as the record's source identifier.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl ObjectLocation {
    pub fn new(
        region: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the object needs multi-member gzip reconstruction before it can be read.
    pub fn is_compressed(&self) -> bool {
        self.key.ends_with(COMPRESSED_SUFFIX)
    }

    /// The value stamped on every record parsed from this object.
    pub fn source_id(&self) -> &str {
        &self.bucket
    }
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
