//! Sales report definitions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use stocklens_core::column::fmt;
use stocklens_core::{
    Category, ColumnKind, Document, ExportFormat, FilterValues, ReportColumn, ReportResult,
};
use stocklens_pipeline::sales::{
    kpi_snapshot, sales_by_category, sales_trend, top_products, CategoryBreakdownParams,
    KpiParams, TopProductsParams, TrendParams, ORDERS, ORDER_LINES,
};
use stocklens_pipeline::{input, Granularity, Pipeline};

use crate::catalog::{
    branch_first, count, date_range_filter, granularity_filter, limit_filter, number, num,
    warehouse_filter, SumSummary,
};
use crate::definition::{BuildContext, ReportBehavior, ReportDefinition};

pub(crate) fn definitions() -> Vec<ReportDefinition> {
    vec![kpi_definition(), trend_definition(), by_category_definition(), top_products_definition()]
}

const ALL_FORMATS: [ExportFormat; 3] =
    [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];

// -------------------------
// sales-kpi-snapshot
// -------------------------

fn kpi_definition() -> ReportDefinition {
    ReportDefinition {
        id: "sales-kpi-snapshot",
        name: "Sales KPI Snapshot",
        category: Category::Sales,
        collection: ORDERS,
        columns: vec![
            ReportColumn::new("total_orders", "Orders", ColumnKind::Number)
                .with_formatter(fmt::integer)
                .not_sortable(),
            ReportColumn::new("total_revenue", "Revenue", ColumnKind::Currency).not_sortable(),
            ReportColumn::new("avg_order_value", "Avg Order Value", ColumnKind::Currency)
                .not_sortable(),
            ReportColumn::new("prev_total_orders", "Orders (prev)", ColumnKind::Number)
                .with_formatter(fmt::integer)
                .not_sortable(),
            ReportColumn::new("prev_total_revenue", "Revenue (prev)", ColumnKind::Currency)
                .not_sortable(),
            ReportColumn::new("revenue_change_pct", "Revenue Change %", ColumnKind::Percentage)
                .not_sortable(),
        ],
        filters: vec![
            date_range_filter(),
            stocklens_core::ReportFilter::new(
                "comparison_range",
                "Comparison range",
                stocklens_core::FilterKind::DateRange,
            ),
            warehouse_filter(),
        ],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_kpi,
        behavior: Arc::new(KpiBehavior),
    }
}

fn build_kpi(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let range = input::required_date_range(filters, "date_range")?;
    let comparison = input::date_range(filters, "comparison_range")?;
    let warehouse = input::scope(filters, "warehouse");
    Ok(kpi_snapshot(&KpiParams {
        range,
        comparison,
        warehouse,
    }))
}

/// Flattens the KPI facet document into a single metrics row. A missing
/// comparison branch reads as zeroed comparison metrics.
struct KpiBehavior;

impl ReportBehavior for KpiBehavior {
    fn post_process(&self, rows: Vec<Document>) -> Vec<Document> {
        rows.into_iter().map(flatten_kpi_row).collect()
    }

    fn summarize(&self, rows: &[Document]) -> Option<BTreeMap<String, Value>> {
        let row = rows.first()?;
        Some(row.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

fn flatten_kpi_row(row: Document) -> Document {
    let current = branch_first(&row, "current");
    let comparison = branch_first(&row, "comparison");

    let cur_orders = current.map(|d| num(d, "total_orders")).unwrap_or(0.0);
    let cur_revenue = current.map(|d| num(d, "total_revenue")).unwrap_or(0.0);
    let cur_avg = current.map(|d| num(d, "avg_order_value")).unwrap_or(0.0);
    let prev_orders = comparison.map(|d| num(d, "total_orders")).unwrap_or(0.0);
    let prev_revenue = comparison.map(|d| num(d, "total_revenue")).unwrap_or(0.0);

    let mut out = Document::new();
    out.insert("total_orders".to_string(), count(cur_orders));
    out.insert("total_revenue".to_string(), number(cur_revenue));
    out.insert("avg_order_value".to_string(), number(cur_avg));
    out.insert("prev_total_orders".to_string(), count(prev_orders));
    out.insert("prev_total_revenue".to_string(), number(prev_revenue));
    let change = if prev_revenue > 0.0 {
        number((cur_revenue - prev_revenue) / prev_revenue * 100.0)
    } else {
        Value::Null
    };
    out.insert("revenue_change_pct".to_string(), change);
    out
}

// -------------------------
// sales-trend
// -------------------------

fn trend_definition() -> ReportDefinition {
    ReportDefinition {
        id: "sales-trend",
        name: "Sales Trend",
        category: Category::Sales,
        collection: ORDERS,
        columns: vec![
            ReportColumn::new("period", "Period", ColumnKind::Date),
            ReportColumn::new("orders", "Orders", ColumnKind::Number).with_formatter(fmt::integer),
            ReportColumn::new("revenue", "Revenue", ColumnKind::Currency),
        ],
        filters: vec![date_range_filter(), granularity_filter(), warehouse_filter()],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_trend,
        behavior: Arc::new(SumSummary {
            fields: &["orders", "revenue"],
        }),
    }
}

fn build_trend(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let range = input::required_date_range(filters, "date_range")?;
    let granularity = input::granularity(filters, "granularity", Granularity::Month)?;
    let warehouse = input::scope(filters, "warehouse");
    Ok(sales_trend(&TrendParams {
        range,
        granularity,
        warehouse,
    }))
}

// -------------------------
// sales-by-category
// -------------------------

fn by_category_definition() -> ReportDefinition {
    ReportDefinition {
        id: "sales-by-category",
        name: "Sales by Category",
        category: Category::Sales,
        collection: ORDER_LINES,
        columns: vec![
            ReportColumn::new("category", "Category", ColumnKind::String),
            ReportColumn::new("units", "Units", ColumnKind::Number).with_formatter(fmt::integer),
            ReportColumn::new("revenue", "Revenue", ColumnKind::Currency),
        ],
        filters: vec![date_range_filter(), warehouse_filter()],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_by_category,
        behavior: Arc::new(SumSummary {
            fields: &["units", "revenue"],
        }),
    }
}

fn build_by_category(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let range = input::required_date_range(filters, "date_range")?;
    let warehouse = input::scope(filters, "warehouse");
    Ok(sales_by_category(&CategoryBreakdownParams { range, warehouse }))
}

// -------------------------
// top-products
// -------------------------

fn top_products_definition() -> ReportDefinition {
    ReportDefinition {
        id: "top-products",
        name: "Top Products",
        category: Category::Sales,
        collection: ORDER_LINES,
        columns: vec![
            ReportColumn::new("product_id", "Product ID", ColumnKind::String).not_exportable(),
            ReportColumn::new("product_name", "Product", ColumnKind::String),
            ReportColumn::new("units", "Units", ColumnKind::Number).with_formatter(fmt::integer),
            ReportColumn::new("revenue", "Revenue", ColumnKind::Currency),
        ],
        filters: vec![date_range_filter(), warehouse_filter(), limit_filter(10)],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_top_products,
        behavior: Arc::new(SumSummary {
            fields: &["units", "revenue"],
        }),
    }
}

fn build_top_products(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let range = input::required_date_range(filters, "date_range")?;
    let warehouse = input::scope(filters, "warehouse");
    let limit = input::limit(filters, "limit", 10);
    Ok(top_products(&TopProductsParams {
        range,
        warehouse,
        limit,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kpi_flatten_reads_both_branches() {
        let row: Document = serde_json::from_value(json!({
            "current": [{"window": null, "total_orders": 10, "total_revenue": 1000.0, "avg_order_value": 100.0}],
            "comparison": [{"window": null, "total_orders": 8, "total_revenue": 800.0, "avg_order_value": 100.0}],
        }))
        .unwrap();
        let flat = flatten_kpi_row(row);
        assert_eq!(flat["total_orders"], json!(10));
        assert_eq!(flat["total_revenue"], json!(1000.0));
        assert_eq!(flat["avg_order_value"], json!(100.0));
        assert_eq!(flat["prev_total_orders"], json!(8));
        assert_eq!(flat["prev_total_revenue"], json!(800.0));
        assert_eq!(flat["revenue_change_pct"], json!(25.0));
    }

    #[test]
    fn kpi_flatten_handles_absent_comparison() {
        let row: Document = serde_json::from_value(json!({
            "current": [{"window": null, "total_orders": 3, "total_revenue": 90.0, "avg_order_value": 30.0}],
        }))
        .unwrap();
        let flat = flatten_kpi_row(row);
        assert_eq!(flat["prev_total_orders"], json!(0));
        assert_eq!(flat["revenue_change_pct"], Value::Null);
    }

    #[test]
    fn kpi_builder_requires_date_range() {
        let ctx = BuildContext::new(chrono::Utc::now(), 90);
        let err = build_kpi(&FilterValues::new(), &ctx).unwrap_err();
        match err {
            stocklens_core::ReportError::Validation { field, .. } => {
                assert_eq!(field, "date_range")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
