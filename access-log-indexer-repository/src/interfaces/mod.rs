//! Interface definitions for the indexing backend.
//!
//! This module defines the abstract `IndexingBackend` trait that allows
//! for dependency injection and swappable backend implementations.

mod indexing_backend;

pub use indexing_backend::IndexingBackend;
