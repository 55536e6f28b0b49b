//! Record transformer implementation.
//!
//! Transforms access log lines into Record structures for indexing.

use std::collections::HashSet;
use std::sync::Arc;

use access_log_indexer_shared::{FieldValue, ObjectLocation, Record};
use tracing::{debug, instrument};

use super::extractor::FieldExtractor;
use super::grok::Grok;
use super::patterns::{ALB_LINE_PATTERN, ELB_LINE_PATTERN, HOST_PORT_PATTERN};
use crate::errors::PipelineError;

/// Fields stripped from every record before indexing.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "message",
    "urihost",
    "version",
    "port",
    "httpversion",
    "backendport",
    "backendip",
    "rawrequest",
    "user_agent",
    "inboundport",
    "request",
    "received_bytes",
    "params",
    "clientport",
    "@version",
];

/// Field names used by the transformer.
#[derive(Debug, Clone)]
pub struct TransformerConfig {
    /// Field whose value goes through the secondary extractor.
    pub composite_field: String,
    /// Timestamp field produced by the primary extractor.
    pub timestamp_field: String,
    /// Name the timestamp is moved to, the backend's time axis.
    pub normalized_timestamp_field: String,
    /// Field carrying the source object identifier.
    pub source_field: String,
    /// Fields removed from every record.
    pub denylist: HashSet<String>,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            composite_field: "urihost".to_string(),
            timestamp_field: "timestamp".to_string(),
            normalized_timestamp_field: "@timestamp".to_string(),
            source_field: "logbucket".to_string(),
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Transformer that turns log lines into records.
///
/// The transformer is responsible for:
/// - Extracting the primary fields of a line
/// - Splitting the composite field with the secondary extractor
/// - Normalizing the timestamp and pruning denylisted fields
/// - Stamping the source identifier
pub struct RecordTransformer {
    primary: Arc<dyn FieldExtractor>,
    secondary: Option<Arc<dyn FieldExtractor>>,
    config: TransformerConfig,
}

impl RecordTransformer {
    /// Create a new transformer with the default field names.
    pub fn new(primary: Arc<dyn FieldExtractor>, secondary: Option<Arc<dyn FieldExtractor>>) -> Self {
        Self::with_config(primary, secondary, TransformerConfig::default())
    }

    /// Create a new transformer with custom field names.
    pub fn with_config(
        primary: Arc<dyn FieldExtractor>,
        secondary: Option<Arc<dyn FieldExtractor>>,
        config: TransformerConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            config,
        }
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Transform a single line.
    ///
    /// # Arguments
    ///
    /// * `line` - One line of the log object
    /// * `source_id` - Identifier of the object the line came from
    ///
    /// # Returns
    ///
    /// The record, or `None` when the primary extractor does not match.
    pub fn transform(&self, line: &str, source_id: &str) -> Option<Record> {
        let Some(captures) = self.primary.extract(line) else {
            debug!(line_len = line.len(), "Line did not match primary pattern");
            return None;
        };

        let mut record = Record::new();
        for (name, value) in captures {
            record.insert(name, value);
        }

        self.merge_secondary(&mut record);

        if let Some(timestamp) = record.remove(&self.config.timestamp_field) {
            let normalized = timestamp
                .as_timestamp()
                .map(FieldValue::Timestamp)
                .unwrap_or(timestamp);
            record.insert(self.config.normalized_timestamp_field.clone(), normalized);
        }

        record
            .fields
            .retain(|name, _| !self.config.denylist.contains(name));

        record.insert(self.config.source_field.clone(), source_id);
        Some(record)
    }

    /// Apply the secondary extractor to the composite field and merge the
    /// derived fields, lower-casing string values.
    fn merge_secondary(&self, record: &mut Record) {
        let Some(secondary) = &self.secondary else {
            return;
        };
        let Some(composite) = record
            .get(&self.config.composite_field)
            .and_then(FieldValue::as_str)
            .map(str::to_string)
        else {
            return;
        };

        if let Some(derived) = secondary.extract(&composite) {
            for (name, value) in derived {
                let value = match value {
                    FieldValue::Text(text) => FieldValue::Text(text.to_lowercase()),
                    other => other,
                };
                record.insert(name, value);
            }
        }
    }
}

/// The two transformer variants, selected by object key.
pub struct RecordTransformers {
    compressed: RecordTransformer,
    plain: RecordTransformer,
}

impl RecordTransformers {
    pub fn new(compressed: RecordTransformer, plain: RecordTransformer) -> Self {
        Self { compressed, plain }
    }

    /// Compile the stock load balancer patterns.
    ///
    /// Gzip-delivered objects use the application load balancer layout,
    /// plain objects the classic layout. Both split `urihost` into
    /// `domain` and `inboundport`.
    #[instrument]
    pub fn load_balancer_defaults() -> Result<Self, PipelineError> {
        Self::from_patterns(ALB_LINE_PATTERN, ELB_LINE_PATTERN, HOST_PORT_PATTERN)
    }

    /// Compile one line pattern per object kind and a shared `host:port` pattern.
    pub fn from_patterns(
        compressed: &str,
        plain: &str,
        host_port: &str,
    ) -> Result<Self, PipelineError> {
        let host_port: Arc<dyn FieldExtractor> = Arc::new(Grok::compile(host_port)?);
        let compressed: Arc<dyn FieldExtractor> = Arc::new(Grok::compile(compressed)?);
        let plain: Arc<dyn FieldExtractor> = Arc::new(Grok::compile(plain)?);

        Ok(Self::new(
            RecordTransformer::new(compressed, Some(host_port.clone())),
            RecordTransformer::new(plain, Some(host_port)),
        ))
    }

    /// The transformer for an object.
    pub fn for_location(&self, location: &ObjectLocation) -> &RecordTransformer {
        if location.is_compressed() {
            &self.compressed
        } else {
            &self.plain
        }
    }
}
