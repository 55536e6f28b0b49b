//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `IndexingBackend`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::IndicesPutIndexTemplateParts,
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::IndexConfig;
use crate::errors::IndexingError;
use crate::interfaces::IndexingBackend;
use crate::opensearch::index_config::get_index_template;
use crate::types::{BulkDocument, BulkItemError, BulkSummary};

/// Field carrying the document-type tag inside each document body.
const DOCUMENT_TYPE_FIELD: &str = "type";

/// Basic credentials for the OpenSearch cluster.
#[derive(Debug, Clone)]
pub struct OpenSearchCredentials {
    pub username: String,
    pub password: String,
}

/// OpenSearch client implementation.
///
/// Cheap to clone and safe to share: the underlying transport pools
/// connections, so one instance serves every concurrent bulk call.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200", None, IndexConfig::default()).await?;
/// let summary = client.bulk_write(&documents).await?;
/// ```
#[derive(Clone)]
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `credentials` - Optional basic credentials
    /// * `index_config` - Index naming used for the template
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(IndexingError)` - If connection setup fails
    pub async fn new(
        url: &str,
        credentials: Option<OpenSearchCredentials>,
        index_config: IndexConfig,
    ) -> Result<Self, IndexingError> {
        let parsed_url = Url::parse(url).map_err(|e| IndexingError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(creds) = credentials {
            builder = builder.auth(Credentials::Basic(creds.username, creds.password));
        }
        let transport = builder
            .build()
            .map_err(|e| IndexingError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            prefix = %index_config.prefix,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Build the newline-delimited bulk body: one action line and one source line per document.
    fn bulk_body(documents: &[BulkDocument]) -> Vec<JsonBody<Value>> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);

        for doc in documents {
            let action = match &doc.id {
                Some(id) => json!({ "index": { "_index": doc.index, "_id": id } }),
                None => json!({ "index": { "_index": doc.index } }),
            };
            body.push(action.into());

            let mut source = doc.source.clone();
            if let Value::Object(map) = &mut source {
                map.entry(DOCUMENT_TYPE_FIELD)
                    .or_insert_with(|| Value::String(doc.document_type.clone()));
            }
            body.push(source.into());
        }

        body
    }

    /// Turn a bulk response body into per-document outcomes.
    fn parse_bulk_response(
        response: &Value,
        documents: &[BulkDocument],
    ) -> Result<BulkSummary, IndexingError> {
        let items = response
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| IndexingError::parse("bulk response has no items array"))?;

        let mut item_errors = Vec::new();
        for (position, item) in items.iter().enumerate() {
            // Each item is keyed by its action name ("index", "create", ...).
            let Some(outcome) = item.as_object().and_then(|o| o.values().next()) else {
                return Err(IndexingError::parse(format!(
                    "malformed bulk item at position {}",
                    position
                )));
            };

            let status = outcome
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .unwrap_or(0);
            let error = outcome.get("error");
            if error.is_none() && (200..300).contains(&status) {
                continue;
            }

            let reason = match error {
                Some(err) => err
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string()),
                None => format!("unexpected item status {}", status),
            };
            let index = outcome
                .get("_index")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| documents.get(position).map(|d| d.index.clone()))
                .unwrap_or_default();

            item_errors.push(BulkItemError {
                position,
                index,
                status,
                reason,
            });
        }

        let failed = item_errors.len();
        Ok(BulkSummary {
            total: items.len(),
            succeeded: items.len() - failed,
            failed,
            item_errors,
        })
    }
}

#[async_trait]
impl IndexingBackend for OpenSearchClient {
    /// Write documents in a single `_bulk` request.
    ///
    /// A non-success HTTP status or a transport failure fails the whole
    /// request. Per-document rejections inside a successful response are
    /// returned in the summary.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_write(&self, documents: &[BulkDocument]) -> Result<BulkSummary, IndexingError> {
        if documents.is_empty() {
            return Ok(BulkSummary::default());
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(Self::bulk_body(documents))
            .send()
            .await
            .map_err(|e| IndexingError::bulk_request(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(IndexingError::bulk_request(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| IndexingError::parse(e.to_string()))?;

        let summary = Self::parse_bulk_response(&body, documents)?;
        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }

    async fn ensure_index_template(&self) -> Result<(), IndexingError> {
        let name = self.index_config.template_name();
        let response = self
            .client
            .indices()
            .put_index_template(IndicesPutIndexTemplateParts::Name(&name))
            .body(get_index_template(&self.index_config))
            .send()
            .await
            .map_err(|e| IndexingError::template(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index template request failed");
            return Err(IndexingError::template(format!(
                "Template install failed with status {}: {}",
                status, error_body
            )));
        }

        info!(template = %name, pattern = %self.index_config.index_pattern(), "Index template installed");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, IndexingError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| IndexingError::connection(e.to_string()))?;

        Ok(response.status_code().is_success())
    }
}
