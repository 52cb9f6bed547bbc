//! The document-store boundary.
//!
//! Builders emit store-agnostic stage descriptors; implementations of this
//! trait bind them to a concrete aggregation-capable store and must
//! preserve stage order exactly as built.

use async_trait::async_trait;
use thiserror::Error;

use stocklens_core::{Document, DynamicSource, FilterOption};
use stocklens_pipeline::Pipeline;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed pipeline: {0}")]
    BadPipeline(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Execute an aggregation pipeline against a collection.
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>, StoreError>;

    /// Resolve a dynamic filter's `{value, label}` options. Callers treat
    /// failures as an empty option list, never as a report failure.
    async fn fetch_options(&self, source: &DynamicSource) -> Result<Vec<FilterOption>, StoreError>;
}
