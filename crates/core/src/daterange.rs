//! Date-range value object used by date filters and builders.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

/// An inclusive UTC time window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parse a window from caller-supplied date-like strings.
    ///
    /// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates; a plain end
    /// date extends to the end of that day so the window stays inclusive.
    /// Fails fast with a validation error naming `field` on malformed input
    /// or an inverted window.
    pub fn parse(field: &str, start: &str, end: &str) -> ReportResult<Self> {
        let start = parse_start(field, start)?;
        let end = parse_end(field, end)?;
        if end < start {
            return Err(ReportError::validation(field, "end date precedes start date"));
        }
        Ok(Self { start, end })
    }

    /// The window of identical length immediately preceding this one, used
    /// as the default comparison period for KPI reports.
    pub fn prior_period(&self) -> Self {
        let span = self.end - self.start;
        let end = self.start - Duration::seconds(1);
        Self {
            start: end - span,
            end,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Parse one date-like string to UTC, start-of-day for plain dates.
pub fn parse_date(field: &str, raw: &str) -> ReportResult<DateTime<Utc>> {
    parse_start(field, raw)
}

fn parse_start(field: &str, raw: &str) -> ReportResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        return Ok(DateTime::from_naive_utc_and_offset(
            d.and_hms_opt(0, 0, 0).unwrap_or_default(),
            Utc,
        ));
    }
    Err(ReportError::validation(
        field,
        format!("malformed date '{raw}' (expected YYYY-MM-DD or RFC 3339)"),
    ))
}

fn parse_end(field: &str, raw: &str) -> ReportResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        return Ok(DateTime::from_naive_utc_and_offset(
            d.and_hms_opt(23, 59, 59).unwrap_or_default(),
            Utc,
        ));
    }
    Err(ReportError::validation(
        field,
        format!("malformed date '{raw}' (expected YYYY-MM-DD or RFC 3339)"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_dates_produce_an_inclusive_day_window() {
        let r = DateRange::parse("date_range", "2026-08-01", "2026-08-31").unwrap();
        assert_eq!(r.start.to_rfc3339(), "2026-08-01T00:00:00+00:00");
        assert_eq!(r.end.to_rfc3339(), "2026-08-31T23:59:59+00:00");
    }

    #[test]
    fn rfc3339_accepted() {
        let r = DateRange::parse("d", "2026-01-01T12:00:00Z", "2026-01-02T12:00:00Z").unwrap();
        assert!(r.contains("2026-01-02T00:00:00Z".parse().unwrap()));
    }

    #[test]
    fn malformed_date_names_the_field() {
        let err = DateRange::parse("order_date", "nonsense", "2026-01-01").unwrap_err();
        match err {
            ReportError::Validation { field, message } => {
                assert_eq!(field, "order_date");
                assert!(message.contains("nonsense"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn inverted_window_rejected() {
        assert!(DateRange::parse("d", "2026-02-01", "2026-01-01").is_err());
    }

    #[test]
    fn prior_period_has_identical_length_and_precedes() {
        let r = DateRange::parse("d", "2026-08-11", "2026-08-20").unwrap();
        let prior = r.prior_period();
        assert_eq!(r.end - r.start, prior.end - prior.start);
        assert!(prior.end < r.start);
    }
}
