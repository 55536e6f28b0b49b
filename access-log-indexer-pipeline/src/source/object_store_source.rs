//! Object source backed by the `object_store` crate.

use std::path::PathBuf;
use std::sync::Arc;

use access_log_indexer_shared::ObjectLocation;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{Error as ObjectStoreError, ObjectStore};
use tracing::{debug, instrument};

use super::{ObjectSource, SourceError, SourceObject};

/// Where objects are read from.
#[derive(Debug, Clone)]
enum Backing {
    /// S3, with credentials taken from the environment.
    S3,
    /// A local directory holding one subdirectory per bucket.
    Local(PathBuf),
}

/// Reads objects from S3 or a local directory tree.
///
/// A store is built per bucket and region on each fetch, since a single
/// notification may reference several buckets.
#[derive(Debug, Clone)]
pub struct ObjectStoreSource {
    backing: Backing,
}

impl ObjectStoreSource {
    /// Read from S3 using the ambient AWS credentials.
    pub fn s3() -> Self {
        Self {
            backing: Backing::S3,
        }
    }

    /// Read from `root/<bucket>/<key>` on the local file system.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            backing: Backing::Local(root.into()),
        }
    }

    fn store_for(&self, location: &ObjectLocation) -> Result<Arc<dyn ObjectStore>, SourceError> {
        let store: Arc<dyn ObjectStore> = match &self.backing {
            Backing::S3 => Arc::new(
                AmazonS3Builder::from_env()
                    .with_bucket_name(&location.bucket)
                    .with_region(&location.region)
                    .build()
                    .map_err(|e| SourceError::store(e.to_string()))?,
            ),
            Backing::Local(root) => Arc::new(
                LocalFileSystem::new_with_prefix(root.join(&location.bucket))
                    .map_err(|e| SourceError::store(e.to_string()))?,
            ),
        };
        Ok(store)
    }
}

#[async_trait]
impl ObjectSource for ObjectStoreSource {
    #[instrument(skip(self), fields(location = %location))]
    async fn fetch(&self, location: &ObjectLocation) -> Result<SourceObject, SourceError> {
        let store = self.store_for(location)?;
        let path = Path::from(location.key.as_str());

        let result = store.get(&path).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => SourceError::NotFound(location.to_string()),
            other => SourceError::store(other.to_string()),
        })?;
        let declared_len = result.meta.size as u64;

        let data = result
            .bytes()
            .await
            .map_err(|e| SourceError::store(e.to_string()))?
            .to_vec();

        debug!(declared_len = declared_len, read = data.len(), "Fetched object");

        Ok(SourceObject { data, declared_len })
    }
}
