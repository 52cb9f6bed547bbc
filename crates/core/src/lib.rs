//! `stocklens-core` — report domain foundation.
//!
//! This crate contains the **pure domain** model of the reporting engine:
//! column and filter schemas, request parameters, the response envelope,
//! and the error taxonomy. No IO, no store, no HTTP.

pub mod column;
pub mod daterange;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod params;

pub use column::{ColumnKind, ReportColumn};
pub use daterange::DateRange;
pub use envelope::{Document, EnvelopeBody, GenerationMeta, Pagination, ResponseEnvelope};
pub use error::{ReportError, ReportResult};
pub use filter::{
    is_blank, DynamicSource, FilterKind, FilterOption, FilterOptions, FilterValues, ReportFilter,
};
pub use params::{Category, ExportFormat, RequestParams, SortDirection, SortSpec};
