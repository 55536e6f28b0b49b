//! Dependency initialization and wiring for the access log indexer.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::AppError;
use access_log_indexer_pipeline::{IngestOrchestrator, ObjectSource, ObjectStoreSource, RecordTransformers};
use access_log_indexer_repository::{IndexingBackend, OpenSearchClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: IngestOrchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from the given settings.
    ///
    /// The backend client is created once here and shared by every object
    /// processed during the life of the process.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If initialization fails
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        settings.log_summary();

        // Initialize OpenSearch client
        let client = OpenSearchClient::new(
            &settings.opensearch_url,
            settings.credentials.clone(),
            settings.index.clone(),
        )
        .await
        .map_err(|e| AppError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        // Verify OpenSearch is reachable
        let healthy = client
            .health_check()
            .await
            .map_err(|e| AppError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(AppError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        if settings.manage_index_template {
            client.ensure_index_template().await?;
        } else {
            warn!("Index template management disabled");
        }

        let source: Arc<dyn ObjectSource> = match &settings.local_object_root {
            Some(root) => {
                info!(root = %root.display(), "Reading objects from local directory");
                Arc::new(ObjectStoreSource::local(root))
            }
            None => Arc::new(ObjectStoreSource::s3()),
        };

        // Compile the line patterns
        let transformers = RecordTransformers::load_balancer_defaults()?;

        let backend: Arc<dyn IndexingBackend> = Arc::new(client);
        let orchestrator =
            IngestOrchestrator::with_config(source, backend, transformers, settings.orchestrator_config());

        Ok(Self { orchestrator })
    }
}
