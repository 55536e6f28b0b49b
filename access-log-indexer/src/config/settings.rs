//! Process settings read once from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use access_log_indexer_pipeline::{LoaderConfig, OrchestratorConfig, DEFAULT_PAGE_SIZE};
use access_log_indexer_repository::{IndexConfig, OpenSearchCredentials};
use tracing::info;

use crate::telemetry::LogFormat;
use crate::AppError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default region for notifications that do not name one.
const DEFAULT_REGION: &str = "us-east-1";

/// Everything the process reads from its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch_url: String,
    pub credentials: Option<OpenSearchCredentials>,
    pub index: IndexConfig,
    pub region: String,
    pub page_size: usize,
    /// `None` when the deadline is disabled with `0`.
    pub flush_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub concurrency: usize,
    pub stable_document_ids: bool,
    pub manage_index_template: bool,
    /// Serve objects from this directory instead of S3.
    pub local_object_root: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read the settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: basic credentials, both or neither
    /// - `INDEX_PREFIX`: daily index prefix (default: logstash-elb)
    /// - `DOCUMENT_TYPE`: document-type tag (default: elb-access-log)
    /// - `AWS_REGION`: fallback region (default: us-east-1)
    /// - `PAGE_SIZE`: records per bulk request (default: 10000)
    /// - `FLUSH_TIMEOUT_SECS` / `READ_TIMEOUT_SECS`: deadlines, `0` disables (default: 60 / 120)
    /// - `INGEST_CONCURRENCY`: objects processed at once (default: 1)
    /// - `STABLE_DOCUMENT_IDS`: deterministic document ids (default: false)
    /// - `MANAGE_INDEX_TEMPLATE`: install the index template at startup (default: true)
    /// - `LOCAL_OBJECT_ROOT`: read `{root}/{bucket}/{key}` instead of S3
    /// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = match (var("OPENSEARCH_USERNAME"), var("OPENSEARCH_PASSWORD")) {
            (Some(username), Some(password)) => Some(OpenSearchCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::config(
                    "OPENSEARCH_USERNAME and OPENSEARCH_PASSWORD must be set together",
                ))
            }
        };

        let mut index = IndexConfig::default();
        if let Some(prefix) = var("INDEX_PREFIX") {
            index.prefix = prefix;
        }
        if let Some(document_type) = var("DOCUMENT_TYPE") {
            index.document_type = document_type;
        }

        let page_size: usize = parse_or(&var, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(AppError::config("PAGE_SIZE must be at least 1"));
        }

        let log_format = match var("LOG_FORMAT") {
            Some(value) => LogFormat::parse(&value)
                .ok_or_else(|| AppError::config(format!("LOG_FORMAT: unknown format {:?}", value)))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            opensearch_url: var("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            credentials,
            index,
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            page_size,
            flush_timeout: seconds(parse_or(&var, "FLUSH_TIMEOUT_SECS", 60)?),
            read_timeout: seconds(parse_or(&var, "READ_TIMEOUT_SECS", 120)?),
            concurrency: parse_or::<usize, _>(&var, "INGEST_CONCURRENCY", 1)?.max(1),
            stable_document_ids: parse_bool(&var, "STABLE_DOCUMENT_IDS", false)?,
            manage_index_template: parse_bool(&var, "MANAGE_INDEX_TEMPLATE", true)?,
            local_object_root: var("LOCAL_OBJECT_ROOT").map(PathBuf::from),
            log_format,
        })
    }

    /// Orchestrator configuration derived from these settings.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            loader: LoaderConfig {
                page_size: self.page_size,
                flush_timeout: self.flush_timeout,
                index: self.index.clone(),
                ..Default::default()
            },
            read_timeout: self.read_timeout,
            stable_document_ids: self.stable_document_ids,
            concurrency: self.concurrency,
        }
    }

    /// Log the effective settings, without secrets.
    pub fn log_summary(&self) {
        info!(
            opensearch_url = %self.opensearch_url,
            authenticated = self.credentials.is_some(),
            index_prefix = %self.index.prefix,
            document_type = %self.index.document_type,
            region = %self.region,
            page_size = self.page_size,
            concurrency = self.concurrency,
            stable_document_ids = self.stable_document_ids,
            local_object_root = ?self.local_object_root,
            "Loaded settings"
        );
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("{}: {}", key, e))),
        None => Ok(default),
    }
}

fn parse_bool<F>(var: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(AppError::config(format!("{}: expected a boolean, got {:?}", key, v))),
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
