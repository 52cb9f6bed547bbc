//! Inventory report definitions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use stocklens_core::column::fmt;
use stocklens_core::{
    Category, ColumnKind, Document, ExportFormat, FilterValues, ReportColumn, ReportResult,
};
use stocklens_pipeline::inventory::{
    dead_stock, inventory_valuation, stock_health, DeadStockParams, StockHealthParams,
    ValuationParams, INVENTORY,
};
use stocklens_pipeline::{input, Pipeline};

use crate::catalog::{branch_first, count, num, warehouse_filter, SumSummary};
use crate::definition::{BuildContext, ReportBehavior, ReportDefinition};

pub(crate) fn definitions() -> Vec<ReportDefinition> {
    vec![
        stock_health_definition(),
        dead_stock_definition(),
        valuation_definition(),
    ]
}

const ALL_FORMATS: [ExportFormat; 3] =
    [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Pdf];

// -------------------------
// stock-health
// -------------------------

fn stock_health_definition() -> ReportDefinition {
    ReportDefinition {
        id: "stock-health",
        name: "Stock Health",
        category: Category::Inventory,
        collection: INVENTORY,
        columns: vec![
            ReportColumn::new("below_reorder", "Below Reorder Point", ColumnKind::Number)
                .with_formatter(fmt::integer)
                .not_sortable(),
            ReportColumn::new("overstock", "Overstock", ColumnKind::Number)
                .with_formatter(fmt::integer)
                .not_sortable(),
            ReportColumn::new("out_of_stock", "Out of Stock", ColumnKind::Number)
                .with_formatter(fmt::integer)
                .not_sortable(),
        ],
        filters: vec![warehouse_filter()],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_stock_health,
        behavior: Arc::new(StockHealthBehavior),
    }
}

fn build_stock_health(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let warehouse = input::scope(filters, "warehouse");
    Ok(stock_health(&StockHealthParams { warehouse }))
}

/// Flattens the stock-health facet into one row of three counts.
struct StockHealthBehavior;

impl ReportBehavior for StockHealthBehavior {
    fn post_process(&self, rows: Vec<Document>) -> Vec<Document> {
        rows.into_iter()
            .map(|row| {
                let mut out = Document::new();
                for branch in ["below_reorder", "overstock", "out_of_stock"] {
                    let n = branch_first(&row, branch)
                        .map(|d| num(d, "count"))
                        .unwrap_or(0.0);
                    out.insert(branch.to_string(), count(n));
                }
                out
            })
            .collect()
    }

    fn summarize(&self, rows: &[Document]) -> Option<BTreeMap<String, Value>> {
        let row = rows.first()?;
        let mut summary: BTreeMap<String, Value> =
            row.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let flagged = num(row, "below_reorder") + num(row, "overstock") + num(row, "out_of_stock");
        summary.insert("total_flagged".to_string(), count(flagged));
        Some(summary)
    }
}

// -------------------------
// dead-stock
// -------------------------

fn dead_stock_definition() -> ReportDefinition {
    ReportDefinition {
        id: "dead-stock",
        name: "Dead Stock",
        category: Category::Inventory,
        collection: INVENTORY,
        columns: vec![
            ReportColumn::new("product_id", "Product ID", ColumnKind::String).not_exportable(),
            ReportColumn::new("product_name", "Product", ColumnKind::String),
            ReportColumn::new("warehouse", "Warehouse", ColumnKind::String),
            ReportColumn::new("quantity", "On Hand", ColumnKind::Number)
                .with_formatter(fmt::integer),
            ReportColumn::new("unit_cost", "Unit Cost", ColumnKind::Currency),
            ReportColumn::new("stock_value", "Stock Value", ColumnKind::Currency),
        ],
        filters: vec![warehouse_filter()],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_dead_stock,
        behavior: Arc::new(SumSummary {
            fields: &["quantity", "stock_value"],
        }),
    }
}

fn build_dead_stock(filters: &FilterValues, ctx: &BuildContext) -> ReportResult<Pipeline> {
    let warehouse = input::scope(filters, "warehouse");
    Ok(dead_stock(&DeadStockParams {
        warehouse,
        cutoff: ctx.dead_stock_cutoff(),
    }))
}

// -------------------------
// inventory-valuation
// -------------------------

fn valuation_definition() -> ReportDefinition {
    ReportDefinition {
        id: "inventory-valuation",
        name: "Inventory Valuation",
        category: Category::Inventory,
        collection: INVENTORY,
        columns: vec![
            ReportColumn::new("category", "Category", ColumnKind::String),
            ReportColumn::new("units", "Units", ColumnKind::Number).with_formatter(fmt::integer),
            ReportColumn::new("stock_value", "Stock Value", ColumnKind::Currency),
        ],
        filters: vec![
            warehouse_filter(),
            stocklens_core::ReportFilter::new(
                "category",
                "Category",
                stocklens_core::FilterKind::Select,
            )
            .with_dynamic_options(stocklens_core::DynamicSource::new("categories", "id", "name"))
            .with_default(serde_json::json!("all")),
        ],
        default_sort: None,
        formats: ALL_FORMATS.to_vec(),
        build: build_valuation,
        behavior: Arc::new(SumSummary {
            fields: &["units", "stock_value"],
        }),
    }
}

fn build_valuation(filters: &FilterValues, _ctx: &BuildContext) -> ReportResult<Pipeline> {
    let warehouse = input::scope(filters, "warehouse");
    let category = input::scope(filters, "category");
    Ok(inventory_valuation(&ValuationParams {
        warehouse,
        category,
    }))
}
