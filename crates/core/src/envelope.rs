//! Response envelope: rows, pagination, summary, generation metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One result row. `serde_json::Map` keys are ordered, so serialized
/// envelopes are deterministic for identical inputs.
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    #[serde(rename = "pageSize")]
    pub page_size: usize,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl Pagination {
    /// `total_pages = ceil(total / page_size)`; zero when `total` is zero.
    pub fn new(page: usize, page_size: usize, total: u64) -> Self {
        let total_pages = if total == 0 || page_size == 0 {
            0
        } else {
            total.div_ceil(page_size as u64)
        };
        Self {
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

/// The cacheable part of a response: everything except per-call metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeBody {
    pub rows: Vec<Document>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<BTreeMap<String, Value>>,
}

/// Per-call generation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMeta {
    #[serde(rename = "reportId")]
    pub report_id: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(rename = "fromCache")]
    pub from_cache: bool,
}

/// Full report response. Produced fresh per call (or rebuilt from a cached
/// body); the generator keeps no reference to it after return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(flatten)]
    pub body: EnvelopeBody,
    pub meta: GenerationMeta,
}

impl ResponseEnvelope {
    pub fn rows(&self) -> &[Document] {
        &self.body.rows
    }

    pub fn pagination(&self) -> Pagination {
        self.body.pagination
    }

    pub fn summary(&self) -> Option<&BTreeMap<String, Value>> {
        self.body.summary.as_ref()
    }
}
