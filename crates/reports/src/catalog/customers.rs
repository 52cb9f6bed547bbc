//! Customer report definitions (receivables + activity).

use std::sync::Arc;

use stocklens_core::column::fmt;
use stocklens_core::{
    Category, ColumnKind, ExportFormat, FilterKind, FilterOption, FilterValues, ReportColumn,
    ReportFilter, ReportResult,
};
use stocklens_pipeline::customers::{
    customer_activity, customer_balances, ActivityParams, BalanceParams, CUSTOMERS,
};
use stocklens_pipeline::sales::ORDERS;
use stocklens_pipeline::{input, Pipeline};

use crate::catalog::{date_range_filter, limit_filter, SumSummary};
use crate::definition::{BuildContext, ReportDefinition};

pub(crate) fn definitions() -> Vec<ReportDefinition> {
    vec![balances_definition(), activity_definition()]
}

const ALL_FORMATS: [ExportFormat; 3] =
    [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];

fn segment_filter() -> ReportFilter {
    ReportFilter::new("segment", "Segment", FilterKind::Select)
        .with_static_options(vec![
            FilterOption::new("retail", "Retail"),
            FilterOption::new("wholesale", "Wholesale"),
            FilterOption::new("online", "Online"),
        ])
        .with_default(serde_json::json!("all"))
}

// -------------------------
// customer-balances
// -------------------------

fn balances_definition() -> ReportDefinition {
    ReportDefinition {
        id: "customer-balances",
        name: "Customer Balances",
        category: Category::Receivables,
        collection: CUSTOMERS,
        columns: vec![
            ReportColumn::new("customer_id", "Customer ID", ColumnKind::String).not_exportable(),
            ReportColumn::new("name", "Customer", ColumnKind::String),
            ReportColumn::new("segment", "Segment", ColumnKind::String),
            ReportColumn::new("outstanding_balance", "Outstanding", ColumnKind::Currency),
            ReportColumn::new("credit_limit", "Credit Limit", ColumnKind::Currency),
            ReportColumn::new("credit_utilization", "Utilization", ColumnKind::Percentage),
        ],
        filters: vec![
            segment_filter(),
            ReportFilter::new("search", "Customer search", FilterKind::Search),
            limit_filter(50),
        ],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_balances,
        behavior: Arc::new(SumSummary {
            fields: &["outstanding_balance"],
        }),
    }
}

fn build_balances(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    Ok(customer_balances(&BalanceParams {
        segment: input::scope(filters, "segment"),
        search: input::text(filters, "search"),
        limit: input::limit(filters, "limit", 50),
    }))
}

// -------------------------
// customer-activity
// -------------------------

fn activity_definition() -> ReportDefinition {
    ReportDefinition {
        id: "customer-activity",
        name: "Customer Activity",
        category: Category::Activity,
        collection: ORDERS,
        columns: vec![
            ReportColumn::new("customer_id", "Customer ID", ColumnKind::String).not_exportable(),
            ReportColumn::new("customer_name", "Customer", ColumnKind::String),
            ReportColumn::new("orders", "Orders", ColumnKind::Number).with_formatter(fmt::integer),
            ReportColumn::new("revenue", "Revenue", ColumnKind::Currency),
            ReportColumn::new("last_order_at", "Last Order", ColumnKind::Date),
        ],
        filters: vec![date_range_filter(), limit_filter(25)],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_activity,
        behavior: Arc::new(SumSummary {
            fields: &["orders", "revenue"],
        }),
    }
}

fn build_activity(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let range = input::required_date_range(filters, "date_range")?;
    let limit = input::limit(filters, "limit", 25);
    Ok(customer_activity(&ActivityParams { range, limit }))
}
