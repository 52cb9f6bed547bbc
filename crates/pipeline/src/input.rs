//! Typed extraction of builder parameters from raw filter values.
//!
//! Builders take typed params; these helpers bridge from the request's
//! filter map, failing fast only on structurally invalid values (malformed
//! dates, unknown granularity). Absent or blank values are simply `None`.

use serde_json::Value;

use stocklens_core::filter::{is_blank, FilterValues};
use stocklens_core::{DateRange, ReportError, ReportResult};

use crate::stage::Granularity;

/// Read a date-range filter value: `{ "start": ..., "end": ... }` or a
/// two-element string array.
pub fn date_range(filters: &FilterValues, key: &str) -> ReportResult<Option<DateRange>> {
    let value = match filters.get(key) {
        Some(v) if !is_blank(Some(v)) => v,
        _ => return Ok(None),
    };
    let (start, end) = match value {
        Value::Object(map) => (
            str_field(map.get("start"), key)?,
            str_field(map.get("end"), key)?,
        ),
        Value::Array(items) if items.len() == 2 => (
            str_field(items.first(), key)?,
            str_field(items.get(1), key)?,
        ),
        _ => {
            return Err(ReportError::validation(
                key,
                "expected { start, end } or a [start, end] pair",
            ))
        }
    };
    DateRange::parse(key, start, end).map(Some)
}

/// Like [`date_range`] but rejects absence, for builders whose window is
/// structurally mandatory.
pub fn required_date_range(filters: &FilterValues, key: &str) -> ReportResult<DateRange> {
    date_range(filters, key)?
        .ok_or_else(|| ReportError::validation(key, "missing required date range"))
}

/// Read an optional scope filter (warehouse, category, status, segment).
///
/// The literal `"all"` and blank values both mean "no filter" and must
/// never be used as a match value.
pub fn scope(filters: &FilterValues, key: &str) -> Option<String> {
    let value = filters.get(key)?;
    if is_blank(Some(value)) {
        return None;
    }
    let s = value.as_str()?.trim();
    if s.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(s.to_string())
    }
}

/// Read a time-bucket granularity, defaulting when absent.
pub fn granularity(
    filters: &FilterValues,
    key: &str,
    default: Granularity,
) -> ReportResult<Granularity> {
    let value = match filters.get(key) {
        Some(v) if !is_blank(Some(v)) => v,
        _ => return Ok(default),
    };
    let s = value
        .as_str()
        .ok_or_else(|| ReportError::validation(key, "granularity must be a string"))?;
    Granularity::parse(s)
        .ok_or_else(|| ReportError::validation(key, format!("unknown granularity '{s}'")))
}

/// Read a positive integer limit, defaulting when absent or non-numeric.
pub fn limit(filters: &FilterValues, key: &str, default: u64) -> u64 {
    filters
        .get(key)
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Read a free-text search filter; blank means no search.
pub fn text(filters: &FilterValues, key: &str) -> Option<String> {
    let value = filters.get(key)?;
    if is_blank(Some(value)) {
        return None;
    }
    value.as_str().map(|s| s.trim().to_string())
}

fn str_field<'a>(value: Option<&'a Value>, key: &str) -> ReportResult<&'a str> {
    value
        .and_then(Value::as_str)
        .ok_or_else(|| ReportError::validation(key, "date bounds must be strings"))
}
