//! Report definitions: the immutable declarative description of one report.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use stocklens_core::{
    Category, Document, ExportFormat, FilterValues, ReportColumn, ReportFilter, ReportResult,
    SortSpec,
};
use stocklens_pipeline::Pipeline;

/// Request-time context threaded into pipeline builders: the clock and the
/// configured dead-stock trailing window.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext {
    pub now: DateTime<Utc>,
    pub dead_stock_window_days: i64,
}

impl BuildContext {
    pub fn new(now: DateTime<Utc>, dead_stock_window_days: i64) -> Self {
        Self {
            now,
            dead_stock_window_days,
        }
    }

    /// The dead-stock cutoff instant: sales on or after it are "recent".
    pub fn dead_stock_cutoff(&self) -> DateTime<Utc> {
        self.now - chrono::Duration::days(self.dead_stock_window_days)
    }
}

/// Compile a report's raw filter values into an aggregation pipeline.
/// Fails only for structurally invalid parameters.
pub type BuildFn = fn(&FilterValues, &BuildContext) -> ReportResult<Pipeline>;

/// Optional per-report result shaping, with no-op defaults so the executor
/// needs no null checks.
pub trait ReportBehavior: Send + Sync {
    /// Pure transform over raw result rows (e.g. flattening a facet
    /// document), applied before summarization.
    fn post_process(&self, rows: Vec<Document>) -> Vec<Document> {
        rows
    }

    /// Pure reduction over the (post-processed) returned rows into named
    /// scalar metrics. Operates on the page only; reports needing
    /// whole-dataset semantics pre-aggregate in their pipeline.
    fn summarize(&self, rows: &[Document]) -> Option<BTreeMap<String, Value>> {
        let _ = rows;
        None
    }
}

/// The default behavior: rows pass through untouched, no summary.
pub struct DefaultBehavior;

impl ReportBehavior for DefaultBehavior {}

/// One registered report. Constructed at process start and immutable for
/// the process lifetime.
#[derive(Clone)]
pub struct ReportDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    /// Store collection the pipeline runs against.
    pub collection: &'static str,
    pub columns: Vec<ReportColumn>,
    pub filters: Vec<ReportFilter>,
    pub default_sort: Option<SortSpec>,
    pub formats: Vec<ExportFormat>,
    pub build: BuildFn,
    pub behavior: Arc<dyn ReportBehavior>,
}

impl ReportDefinition {
    pub fn column(&self, key: &str) -> Option<&ReportColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn filter(&self, key: &str) -> Option<&ReportFilter> {
        self.filters.iter().find(|f| f.key == key)
    }

    pub fn exportable_columns(&self) -> Vec<&ReportColumn> {
        self.columns.iter().filter(|c| c.exportable).collect()
    }

    pub fn supports(&self, format: ExportFormat) -> bool {
        self.formats.contains(&format)
    }
}

impl core::fmt::Debug for ReportDefinition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReportDefinition")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("collection", &self.collection)
            .field("columns", &self.columns.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}
