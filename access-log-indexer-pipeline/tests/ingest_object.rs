//! End-to-end processing of objects read from a local object store.

use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use access_log_indexer_pipeline::{
    IngestOrchestrator, LoaderConfig, ObjectStoreSource, OrchestratorConfig, PipelineError,
    RecordTransformers,
};
use access_log_indexer_repository::{BulkDocument, BulkSummary, IndexingBackend, IndexingError};
use access_log_indexer_shared::ObjectLocation;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;

const BUCKET: &str = "my-logs";

/// Backend that stores documents and fails the n-th bulk call when asked to.
struct RecordingBackend {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
    documents: Mutex<Vec<BulkDocument>>,
}

impl RecordingBackend {
    fn new(fail_on_call: Option<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call,
            documents: Mutex::new(Vec::new()),
        }
    }

    fn stored(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl IndexingBackend for RecordingBackend {
    async fn bulk_write(&self, documents: &[BulkDocument]) -> Result<BulkSummary, IndexingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(IndexingError::bulk_request("status 500"));
        }
        self.documents.lock().unwrap().extend_from_slice(documents);
        Ok(BulkSummary::all_succeeded(documents.len()))
    }

    async fn ensure_index_template(&self) -> Result<(), IndexingError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, IndexingError> {
        Ok(true)
    }
}

fn alb_line(n: usize) -> String {
    format!(
        r#"https 2018-07-02T22:{:02}:{:02}.186641Z app/my-loadbalancer/50dc6c495c0c9188 192.168.131.39:2817 10.0.0.1:80 0.086 0.048 0.037 200 200 0 57 "GET https://www.example.com:443/item/{} HTTP/1.1" "curl/7.46.0" ECDHE-RSA-AES128-GCM-SHA256 TLSv1.2 arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/my-targets/73e2d6bc24d8a067 "Root=1-58337281-1d84f3d73c47ec4e58577259""#,
        (n / 60) % 60,
        n % 60,
        n
    )
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Write `lines` as a multi-member object, one member per `chunk` lines.
fn write_object(root: &Path, key: &str, lines: &[String], chunk: usize) {
    let mut raw = Vec::new();
    for part in lines.chunks(chunk) {
        let mut text = part.join("\n");
        text.push('\n');
        raw.extend(gzip(text.as_bytes()));
    }
    let dir = root.join(BUCKET);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(key), raw).unwrap();
}

fn orchestrator(root: &Path, backend: Arc<RecordingBackend>, page_size: usize) -> IngestOrchestrator {
    IngestOrchestrator::with_config(
        Arc::new(ObjectStoreSource::local(root)),
        backend,
        RecordTransformers::load_balancer_defaults().unwrap(),
        OrchestratorConfig {
            loader: LoaderConfig {
                page_size,
                ..Default::default()
            },
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn one_bad_line_among_many_is_isolated() {
    let root = tempfile::tempdir().unwrap();
    let mut lines: Vec<String> = (0..1000).map(alb_line).collect();
    lines[500] = "this line does not match anything".to_string();
    write_object(root.path(), "alb.log.gz", &lines, 100);

    let backend = Arc::new(RecordingBackend::new(None));
    let stats = orchestrator(root.path(), backend.clone(), 250)
        .process_object(&ObjectLocation::new("us-east-2", BUCKET, "alb.log.gz"))
        .await
        .unwrap();

    assert_eq!(stats.members_found, 10);
    assert_eq!(stats.members_skipped, 0);
    assert_eq!(stats.lines_seen, 1000);
    assert_eq!(stats.parse_misses, 1);
    assert_eq!(stats.lines_indexed, 999);
    assert_eq!(stats.flushes, 4);
    assert_eq!(backend.stored(), 999);
}

#[tokio::test]
async fn members_keep_their_order() {
    let root = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (0..30).map(alb_line).collect();
    write_object(root.path(), "ordered.log.gz", &lines, 7);

    let backend = Arc::new(RecordingBackend::new(None));
    orchestrator(root.path(), backend.clone(), 100)
        .process_object(&ObjectLocation::new("us-east-2", BUCKET, "ordered.log.gz"))
        .await
        .unwrap();

    let documents = backend.documents.lock().unwrap();
    let paths: Vec<String> = documents
        .iter()
        .map(|d| d.source["path"].as_str().unwrap_or_default().to_string())
        .collect();
    let expected: Vec<String> = (0..30).map(|n| format!("/item/{}", n)).collect();
    assert_eq!(paths, expected);
}

#[tokio::test]
async fn flush_failure_aborts_the_object() {
    let root = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (0..25).map(alb_line).collect();
    write_object(root.path(), "failing.log.gz", &lines, 25);

    let backend = Arc::new(RecordingBackend::new(Some(2)));
    let result = orchestrator(root.path(), backend.clone(), 10)
        .process_object(&ObjectLocation::new("us-east-2", BUCKET, "failing.log.gz"))
        .await;

    assert!(matches!(result, Err(PipelineError::IndexingError(_))));
    // The first page stays applied.
    assert_eq!(backend.stored(), 10);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}
