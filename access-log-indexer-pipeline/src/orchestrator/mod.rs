//! Orchestrator module for the access log indexer pipeline.
//!
//! Coordinates the source, decompression, transformer, and loader components.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use access_log_indexer_repository::IndexingBackend;
use access_log_indexer_shared::{FileRunStats, ObjectLocation};
use futures::{stream, StreamExt};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::gzip::MultiMemberDecompressor;
use crate::loader::{BatchingIndexer, LoaderConfig};
use crate::processor::RecordTransformers;
use crate::source::{ObjectNotification, ObjectSource};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Configuration handed to each per-object indexer.
    pub loader: LoaderConfig,
    /// Deadline for fetching one object. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
    /// Attach a deterministic id to every record.
    pub stable_document_ids: bool,
    /// Objects processed at once by [`IngestOrchestrator::process_notifications`].
    pub concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            read_timeout: Some(Duration::from_secs(120)),
            stable_document_ids: false,
            concurrency: 1,
        }
    }
}

/// Result of processing one notified object.
#[derive(Debug)]
pub struct ObjectOutcome {
    pub location: ObjectLocation,
    pub result: Result<FileRunStats, PipelineError>,
}

/// Results of one trigger, in notification order.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<ObjectOutcome>,
}

impl IngestReport {
    /// Number of objects whose processing failed.
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Documents accepted across every successful object.
    pub fn lines_indexed(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|stats| stats.lines_indexed)
            .sum()
    }
}

/// Orchestrator that drives source objects through the pipeline.
///
/// The orchestrator:
/// - Fetches each object under the read deadline
/// - Reconstructs multi-member gzip objects
/// - Transforms every line and feeds the batching indexer
/// - Reports per-object statistics
///
/// Runs over different objects share only the backend client.
pub struct IngestOrchestrator {
    source: Arc<dyn ObjectSource>,
    backend: Arc<dyn IndexingBackend>,
    transformers: RecordTransformers,
    config: OrchestratorConfig,
}

impl IngestOrchestrator {
    /// Create a new orchestrator with the default configuration.
    pub fn new(
        source: Arc<dyn ObjectSource>,
        backend: Arc<dyn IndexingBackend>,
        transformers: RecordTransformers,
    ) -> Self {
        Self::with_config(source, backend, transformers, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        source: Arc<dyn ObjectSource>,
        backend: Arc<dyn IndexingBackend>,
        transformers: RecordTransformers,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            source,
            backend,
            transformers,
            config,
        }
    }

    /// Process every notified object independently.
    ///
    /// A failed object is recorded in the report and does not stop the others.
    #[instrument(skip(self, notifications), fields(count = notifications.len()))]
    pub async fn process_notifications(&self, notifications: Vec<ObjectNotification>) -> IngestReport {
        let concurrency = self.config.concurrency.max(1);
        info!(concurrency = concurrency, "Processing notifications");

        let outcomes: Vec<ObjectOutcome> = stream::iter(notifications)
            .map(|notification| async move {
                let result = self.process_object(&notification.location).await;
                if let Err(e) = &result {
                    error!(location = %notification.location, error = %e, "Failed to process object");
                }
                ObjectOutcome {
                    location: notification.location,
                    result,
                }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let report = IngestReport { outcomes };
        info!(
            objects = report.outcomes.len(),
            failures = report.failures(),
            lines_indexed = report.lines_indexed(),
            "Trigger processed"
        );
        report
    }

    /// Process one object from fetch to final flush.
    ///
    /// Line and member problems are counted in the returned stats. A failed
    /// fetch or bulk request aborts the object.
    #[instrument(skip(self), fields(location = %location))]
    pub async fn process_object(&self, location: &ObjectLocation) -> Result<FileRunStats, PipelineError> {
        let fetch = self.source.fetch(location);
        let object = match self.config.read_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| PipelineError::timeout("object fetch", limit))??,
            None => fetch.await?,
        };

        let mut stats = FileRunStats {
            bytes_read: object.data.len() as u64,
            ..Default::default()
        };
        info!(declared_len = object.declared_len, "Processing object");
        if stats.bytes_read != object.declared_len {
            warn!(
                declared = object.declared_len,
                read = stats.bytes_read,
                "Object length differs from declared length"
            );
        }

        let body = if location.is_compressed() {
            let reconstructed = MultiMemberDecompressor::decompress(&object.data);
            stats.members_found = reconstructed.members_found();
            stats.members_skipped = reconstructed.members_skipped();
            debug!(
                members = stats.members_found,
                skipped = stats.members_skipped,
                bytes = reconstructed.len(),
                "Reconstructed compressed object"
            );
            if stats.members_skipped > 0 {
                warn!(
                    skipped = stats.members_skipped,
                    found = stats.members_found,
                    "Skipped gzip member candidates"
                );
            }
            reconstructed.into_reader()
        } else {
            std::io::Cursor::new(object.data)
        };

        let transformer = self.transformers.for_location(location);
        let mut indexer = BatchingIndexer::with_config(self.backend.clone(), self.config.loader.clone());

        for segment in body.split(b'\n') {
            let mut bytes = segment?;
            stats.lines_seen += 1;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }

            let line = String::from_utf8_lossy(&bytes);
            if line.trim().is_empty() {
                continue;
            }

            let Some(mut record) = transformer.transform(&line, location.source_id()) else {
                stats.parse_misses += 1;
                continue;
            };

            if self.config.stable_document_ids {
                record.id = Some(document_id(location, stats.lines_seen));
            }

            indexer.push(record).await?;
        }

        let loaded = indexer.finish().await?;
        stats.dropped_timestamps = loaded.dropped_timestamps;
        stats.item_errors = loaded.item_errors;
        stats.lines_indexed = loaded.indexed;
        stats.flushes = loaded.flushes;

        info!(
            bytes_read = stats.bytes_read,
            members_found = stats.members_found,
            members_skipped = stats.members_skipped,
            lines_seen = stats.lines_seen,
            parse_misses = stats.parse_misses,
            dropped_timestamps = stats.dropped_timestamps,
            item_errors = stats.item_errors,
            lines_indexed = stats.lines_indexed,
            flushes = stats.flushes,
            "Object processed"
        );
        Ok(stats)
    }
}

/// Deterministic id of the `line_number`-th line (1-based) of an object.
pub fn document_id(location: &ObjectLocation, line_number: usize) -> String {
    let name = format!("{}/{}#{}", location.bucket, location.key, line_number);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceError, SourceObject};
    use access_log_indexer_repository::{BulkDocument, BulkItemError, BulkSummary, IndexingError};
    use async_trait::async_trait;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const ELB_LINE: &str = r#"2015-05-13T23:39:43.945958Z my-loadbalancer 192.168.131.39:2817 10.0.0.1:80 0.000073 0.001048 0.000057 200 200 0 29 "GET http://www.example.com:80/ HTTP/1.1" "curl/7.38.0" - -"#;

    const ALB_LINE: &str = r#"https 2018-07-02T22:23:00.186641Z app/my-loadbalancer/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.086 0.048 0.037 200 200 0 57 "GET https://www.example.com:443/ HTTP/1.1" "curl/7.46.0" ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337281-1d84f3d73c47ec4e58577259""#;

    /// In-memory object source keyed by object key.
    struct MockSource {
        objects: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl ObjectSource for MockSource {
        async fn fetch(&self, location: &ObjectLocation) -> Result<SourceObject, SourceError> {
            let data = self
                .objects
                .get(&location.key)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(location.to_string()))?;
            Ok(SourceObject {
                declared_len: data.len() as u64,
                data,
            })
        }
    }

    /// Source whose fetch never completes.
    struct StalledSource;

    #[async_trait]
    impl ObjectSource for StalledSource {
        async fn fetch(&self, _location: &ObjectLocation) -> Result<SourceObject, SourceError> {
            std::future::pending().await
        }
    }

    /// Mock backend collecting every document.
    struct MockBackend {
        calls: AtomicUsize,
        documents: Mutex<Vec<BulkDocument>>,
        reject_first: bool,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                documents: Mutex::new(Vec::new()),
                reject_first: false,
            }
        }
    }

    #[async_trait]
    impl IndexingBackend for MockBackend {
        async fn bulk_write(&self, documents: &[BulkDocument]) -> Result<BulkSummary, IndexingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.documents.lock().unwrap().extend_from_slice(documents);

            if self.reject_first {
                return Ok(BulkSummary {
                    total: documents.len(),
                    succeeded: documents.len() - 1,
                    failed: 1,
                    item_errors: vec![BulkItemError {
                        position: 0,
                        index: documents[0].index.clone(),
                        status: 400,
                        reason: "mapper_parsing_exception".to_string(),
                    }],
                });
            }
            Ok(BulkSummary::all_succeeded(documents.len()))
        }

        async fn ensure_index_template(&self) -> Result<(), IndexingError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, IndexingError> {
            Ok(true)
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn orchestrator(
        objects: Vec<(&str, Vec<u8>)>,
        backend: Arc<MockBackend>,
        config: OrchestratorConfig,
    ) -> IngestOrchestrator {
        let source = MockSource {
            objects: objects.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        };
        IngestOrchestrator::with_config(
            Arc::new(source),
            backend,
            RecordTransformers::load_balancer_defaults().unwrap(),
            config,
        )
    }

    #[tokio::test]
    async fn test_plain_object() {
        let body = format!("{}\r\n\ngarbage line\n{}\n", ELB_LINE, ELB_LINE);
        let backend = Arc::new(MockBackend::new());
        let orchestrator = orchestrator(
            vec![("elb.log", body.into_bytes())],
            backend.clone(),
            OrchestratorConfig::default(),
        );

        let stats = orchestrator
            .process_object(&ObjectLocation::new("us-east-1", "my-logs", "elb.log"))
            .await
            .unwrap();

        assert_eq!(stats.lines_seen, 4);
        assert_eq!(stats.parse_misses, 1);
        assert_eq!(stats.lines_indexed, 2);
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.members_found, 0);

        let documents = backend.documents.lock().unwrap();
        assert_eq!(documents[0].index, "logstash-elb-2015.05.13");
        assert_eq!(documents[0].source["logbucket"], "my-logs");
        assert_eq!(documents[0].id, None);
    }

    #[tokio::test]
    async fn test_multi_member_object() {
        let mut raw = gzip(format!("{}\n", ALB_LINE).as_bytes());
        raw.extend(gzip(format!("{}\n{}\n", ALB_LINE, ALB_LINE).as_bytes()));
        let backend = Arc::new(MockBackend::new());
        let orchestrator = orchestrator(
            vec![("alb.log.gz", raw)],
            backend.clone(),
            OrchestratorConfig::default(),
        );

        let stats = orchestrator
            .process_object(&ObjectLocation::new("us-east-1", "my-logs", "alb.log.gz"))
            .await
            .unwrap();

        assert_eq!(stats.members_found, 2);
        assert_eq!(stats.members_skipped, 0);
        assert_eq!(stats.lines_indexed, 3);
        assert_eq!(
            backend.documents.lock().unwrap()[0].index,
            "logstash-elb-2018.07.02"
        );
    }

    #[tokio::test]
    async fn test_stable_ids_are_deterministic() {
        let body = format!("{}\n{}\n", ELB_LINE, ELB_LINE).into_bytes();
        let location = ObjectLocation::new("us-east-1", "my-logs", "elb.log");
        let config = OrchestratorConfig {
            stable_document_ids: true,
            ..Default::default()
        };

        let first = Arc::new(MockBackend::new());
        orchestrator(vec![("elb.log", body.clone())], first.clone(), config.clone())
            .process_object(&location)
            .await
            .unwrap();
        let second = Arc::new(MockBackend::new());
        orchestrator(vec![("elb.log", body)], second.clone(), config)
            .process_object(&location)
            .await
            .unwrap();

        let first_ids: Vec<_> = first.documents.lock().unwrap().iter().map(|d| d.id.clone()).collect();
        let second_ids: Vec<_> = second.documents.lock().unwrap().iter().map(|d| d.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
        assert_eq!(first_ids[0], Some(document_id(&location, 1)));
        assert_ne!(first_ids[0], first_ids[1]);
    }

    #[tokio::test]
    async fn test_notifications_are_independent() {
        let backend = Arc::new(MockBackend::new());
        let orchestrator = orchestrator(
            vec![("a.log", format!("{}\n", ELB_LINE).into_bytes())],
            backend.clone(),
            OrchestratorConfig {
                concurrency: 2,
                ..Default::default()
            },
        );
        let notifications = vec![
            ObjectNotification {
                location: ObjectLocation::new("us-east-1", "b", "missing.log"),
                size: None,
            },
            ObjectNotification {
                location: ObjectLocation::new("us-east-1", "b", "a.log"),
                size: None,
            },
        ];

        let report = orchestrator.process_notifications(notifications).await;

        assert_eq!(report.failures(), 1);
        assert!(!report.is_success());
        assert_eq!(report.outcomes[0].location.key, "missing.log");
        assert!(matches!(
            report.outcomes[0].result,
            Err(PipelineError::SourceError(SourceError::NotFound(_)))
        ));
        assert_eq!(report.lines_indexed(), 1);
    }

    #[tokio::test]
    async fn test_loader_counters_reach_file_stats() {
        // February 30th matches the line pattern but is not a date.
        let bad_time = ELB_LINE.replacen("2015-05-13", "2015-02-30", 1);
        let body = format!("{}\n{}\n{}\n", ELB_LINE, bad_time, ELB_LINE).into_bytes();
        let backend = Arc::new(MockBackend {
            reject_first: true,
            ..MockBackend::new()
        });
        let orchestrator = orchestrator(
            vec![("elb.log", body)],
            backend.clone(),
            OrchestratorConfig::default(),
        );

        let stats = orchestrator
            .process_object(&ObjectLocation::new("us-east-1", "my-logs", "elb.log"))
            .await
            .unwrap();

        assert_eq!(stats.lines_seen, 3);
        assert_eq!(stats.parse_misses, 0);
        assert_eq!(stats.dropped_timestamps, 1);
        assert_eq!(stats.item_errors, 1);
        assert_eq!(stats.lines_indexed, 1);
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.errors(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_deadline_fails_the_object() {
        let backend = Arc::new(MockBackend::new());
        let orchestrator = IngestOrchestrator::with_config(
            Arc::new(StalledSource),
            backend.clone(),
            RecordTransformers::load_balancer_defaults().unwrap(),
            OrchestratorConfig {
                read_timeout: Some(Duration::from_secs(5)),
                ..Default::default()
            },
        );

        let result = orchestrator
            .process_object(&ObjectLocation::new("us-east-1", "my-logs", "elb.log"))
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Timeout {
                operation: "object fetch",
                ..
            })
        ));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}
