//! Compiled-in report catalog.
//!
//! One module per back-office area; `definitions()` collects them all for
//! registry population.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use stocklens_core::{Document, DynamicSource, FilterKind, ReportFilter};

use crate::definition::{ReportBehavior, ReportDefinition};

mod customers;
mod inventory;
mod procurement;
mod sales;

/// Every compiled-in report definition, in registration order.
pub fn definitions() -> Vec<ReportDefinition> {
    let mut defs = Vec::new();
    defs.extend(sales::definitions());
    defs.extend(inventory::definitions());
    defs.extend(customers::definitions());
    defs.extend(procurement::definitions());
    defs
}

// -------------------------
// Shared filter schemas
// -------------------------

pub(crate) fn date_range_filter() -> ReportFilter {
    ReportFilter::new("date_range", "Date range", FilterKind::DateRange).required()
}

pub(crate) fn warehouse_filter() -> ReportFilter {
    ReportFilter::new("warehouse", "Warehouse", FilterKind::Select)
        .with_dynamic_options(DynamicSource::new("warehouses", "id", "name"))
        .with_default(json!("all"))
}

pub(crate) fn granularity_filter() -> ReportFilter {
    ReportFilter::new("granularity", "Granularity", FilterKind::Select)
        .with_static_options(vec![
            stocklens_core::FilterOption::new("day", "Daily"),
            stocklens_core::FilterOption::new("week", "Weekly"),
            stocklens_core::FilterOption::new("month", "Monthly"),
        ])
        .with_default(json!("month"))
}

pub(crate) fn limit_filter(default: u64) -> ReportFilter {
    ReportFilter::new("limit", "Limit", FilterKind::Number).with_default(json!(default))
}

// -------------------------
// Shared behavior helpers
// -------------------------

/// Sums the named numeric fields over the returned page's rows.
pub(crate) struct SumSummary {
    pub fields: &'static [&'static str],
}

impl ReportBehavior for SumSummary {
    fn summarize(&self, rows: &[Document]) -> Option<BTreeMap<String, Value>> {
        if rows.is_empty() {
            return None;
        }
        let mut summary = BTreeMap::new();
        summary.insert("rows".to_string(), json!(rows.len()));
        for field in self.fields {
            let total: f64 = rows.iter().map(|r| num(r, field)).sum();
            summary.insert(format!("total_{field}"), number(total));
        }
        Some(summary)
    }
}

/// Numeric view of a row field; missing/non-numeric reads as zero.
pub(crate) fn num(doc: &Document, key: &str) -> f64 {
    doc.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// First document of a facet branch array on a row.
pub(crate) fn branch_first<'a>(row: &'a Document, name: &str) -> Option<&'a Document> {
    row.get(name)?.as_array()?.first()?.as_object()
}

/// JSON number rounded to two decimals (money-safe display precision).
pub(crate) fn number(v: f64) -> Value {
    let rounded = (v * 100.0).round() / 100.0;
    serde_json::Number::from_f64(rounded)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Whole-number JSON value for counts.
pub(crate) fn count(v: f64) -> Value {
    json!(v.round() as i64)
}
