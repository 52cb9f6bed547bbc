//! Procurement report definitions (payables).

use std::sync::Arc;

use stocklens_core::column::fmt;
use stocklens_core::{
    Category, ColumnKind, ExportFormat, FilterKind, FilterOption, FilterValues, ReportColumn,
    ReportFilter, ReportResult,
};
use stocklens_pipeline::procurement::{
    purchase_trend, supplier_spend, PurchaseTrendParams, SupplierSpendParams, PURCHASE_ORDERS,
};
use stocklens_pipeline::{input, Granularity, Pipeline};

use crate::catalog::{date_range_filter, granularity_filter, limit_filter, SumSummary};
use crate::definition::{BuildContext, ReportDefinition};

pub(crate) fn definitions() -> Vec<ReportDefinition> {
    vec![supplier_spend_definition(), purchase_trend_definition()]
}

const ALL_FORMATS: [ExportFormat; 3] =
    [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];

fn status_filter() -> ReportFilter {
    ReportFilter::new("status", "Order status", FilterKind::Select)
        .with_static_options(vec![
            FilterOption::new("open", "Open"),
            FilterOption::new("received", "Received"),
            FilterOption::new("cancelled", "Cancelled"),
        ])
        .with_default(serde_json::json!("all"))
}

fn supplier_spend_definition() -> ReportDefinition {
    ReportDefinition {
        id: "supplier-spend",
        name: "Supplier Spend",
        category: Category::Payables,
        collection: PURCHASE_ORDERS,
        columns: vec![
            ReportColumn::new("supplier_id", "Supplier ID", ColumnKind::String).not_exportable(),
            ReportColumn::new("supplier_name", "Supplier", ColumnKind::String),
            ReportColumn::new("orders", "Orders", ColumnKind::Number).with_formatter(fmt::integer),
            ReportColumn::new("spend", "Spend", ColumnKind::Currency),
        ],
        filters: vec![date_range_filter(), status_filter(), limit_filter(20)],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_supplier_spend,
        behavior: Arc::new(SumSummary {
            fields: &["orders", "spend"],
        }),
    }
}

fn build_supplier_spend(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let range = input::required_date_range(filters, "date_range")?;
    Ok(supplier_spend(&SupplierSpendParams {
        range,
        status: input::scope(filters, "status"),
        limit: input::limit(filters, "limit", 20),
    }))
}

fn purchase_trend_definition() -> ReportDefinition {
    ReportDefinition {
        id: "purchase-trend",
        name: "Purchase Trend",
        category: Category::Payables,
        collection: PURCHASE_ORDERS,
        columns: vec![
            ReportColumn::new("period", "Period", ColumnKind::Date),
            ReportColumn::new("orders", "Orders", ColumnKind::Number).with_formatter(fmt::integer),
            ReportColumn::new("spend", "Spend", ColumnKind::Currency),
        ],
        filters: vec![date_range_filter(), granularity_filter(), status_filter()],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_purchase_trend,
        behavior: Arc::new(SumSummary {
            fields: &["orders", "spend"],
        }),
    }
}

fn build_purchase_trend(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let range = input::required_date_range(filters, "date_range")?;
    Ok(purchase_trend(&PurchaseTrendParams {
        range,
        granularity: input::granularity(filters, "granularity", Granularity::Month)?,
        status: input::scope(filters, "status"),
    }))
}
