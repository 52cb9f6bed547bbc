//! Report error model.

use std::time::Duration;

use thiserror::Error;

/// Result type used across the reporting engine.
pub type ReportResult<T> = Result<T, ReportError>;

/// Reporting-engine error.
///
/// Validation failures always carry the offending field so callers can name
/// it to the user. Query failures carry internal detail for logging; the API
/// boundary is responsible for not leaking that detail to clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// A request parameter failed validation before any query executed.
    #[error("validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// The requested report id is not registered.
    #[error("report not found: {0}")]
    NotFound(String),

    /// The data store rejected or failed the aggregation.
    #[error("query execution failed: {0}")]
    Query(String),

    /// The query did not complete within the configured deadline.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// Serialization of an export payload failed, or the payload was empty
    /// where rows were expected.
    #[error("export failed: {0}")]
    Export(String),

    /// An export was cancelled between render batches.
    #[error("export cancelled")]
    Cancelled,
}

impl ReportError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// True for failures a client may retry as-is (transient), as opposed to
    /// a request that must be corrected first.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Query(_) | Self::Timeout(_) | Self::Export(_))
    }
}
