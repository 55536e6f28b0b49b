//! Processor module for the access log indexer pipeline.
//!
//! Turns raw log lines into structured records.

mod extractor;
mod grok;
mod patterns;
mod record_transformer;

pub use extractor::FieldExtractor;
pub use grok::{Grok, GrokError, PatternLibrary};
pub use patterns::{ALB_LINE_PATTERN, ELB_LINE_PATTERN, HOST_PORT_PATTERN};
pub use record_transformer::{RecordTransformer, RecordTransformers, TransformerConfig, DEFAULT_DENYLIST};
