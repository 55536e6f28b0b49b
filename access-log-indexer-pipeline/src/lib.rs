//! # Access Log Indexer Pipeline
//!
//! This crate provides the pipeline components for turning load balancer
//! access log objects into documents in a search backend.
//!
//! ## Architecture
//!
//! The pipeline follows the Source-Processor-Loader pattern:
//!
//! 1. **Source**: Fetches the object named by a notification
//! 2. **Gzip**: Reconstructs objects made of concatenated gzip members
//! 3. **Processor**: Parses each line into a record
//! 4. **Loader**: Batches records into bulk requests
//! 5. **Orchestrator**: Coordinates the pipeline flow per object

pub mod errors;
pub mod gzip;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod source;

pub use errors::PipelineError;
pub use loader::{BatchingIndexer, LoaderConfig, LoaderStats, DEFAULT_PAGE_SIZE};
pub use orchestrator::{document_id, IngestOrchestrator, IngestReport, ObjectOutcome, OrchestratorConfig};
pub use processor::RecordTransformers;
pub use source::{parse_notification, ObjectNotification, ObjectSource, ObjectStoreSource, SourceError, SourceObject};
