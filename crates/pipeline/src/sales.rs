//! Sales analytics builders: KPI snapshot, revenue trend, category
//! breakdown, top products.
//!
//! Order-level questions run against `orders`; line-level questions run
//! against `order_lines` (denormalized line facts carrying product,
//! category and warehouse).

use stocklens_core::DateRange;

use crate::stage::{
    date_value, Accumulator, Condition, Expr, Granularity, GroupKey, Pipeline, SortKey, Stage,
};

pub const ORDERS: &str = "orders";
pub const ORDER_LINES: &str = "order_lines";

const ORDER_DATE: &str = "ordered_at";

#[derive(Debug, Clone)]
pub struct KpiParams {
    pub range: DateRange,
    /// Optional comparison window (typically the prior period of identical
    /// length). Absent ⇒ the facet carries no comparison branch and the
    /// comparison metrics come back empty.
    pub comparison: Option<DateRange>,
    pub warehouse: Option<String>,
}

/// Current and comparison sales KPIs in a single round trip.
pub fn kpi_snapshot(p: &KpiParams) -> Pipeline {
    let mut pipeline = vec![Stage::NormalizeDate {
        field: ORDER_DATE.to_string(),
    }];
    if let Some(w) = &p.warehouse {
        pipeline.push(Stage::Match(Condition::Eq(
            "warehouse".to_string(),
            w.clone().into(),
        )));
    }

    let mut branches = vec![("current".to_string(), kpi_branch(&p.range))];
    if let Some(cmp) = &p.comparison {
        branches.push(("comparison".to_string(), kpi_branch(cmp)));
    }
    pipeline.push(Stage::Facet(branches));
    pipeline
}

fn kpi_branch(range: &DateRange) -> Pipeline {
    vec![
        Stage::Match(in_window(ORDER_DATE, range)),
        Stage::Group {
            key: GroupKey::Null,
            key_field: "window".to_string(),
            fields: vec![
                ("total_orders".to_string(), Accumulator::Count),
                ("total_revenue".to_string(), Accumulator::Sum(Expr::field("total"))),
                ("avg_order_value".to_string(), Accumulator::Avg(Expr::field("total"))),
            ],
        },
    ]
}

#[derive(Debug, Clone)]
pub struct TrendParams {
    pub range: DateRange,
    pub granularity: Granularity,
    pub warehouse: Option<String>,
}

/// Revenue/order-count trend bucketed by the requested granularity,
/// ascending by bucket key.
pub fn sales_trend(p: &TrendParams) -> Pipeline {
    let mut conditions = vec![in_window(ORDER_DATE, &p.range)];
    if let Some(w) = &p.warehouse {
        conditions.push(Condition::Eq("warehouse".to_string(), w.clone().into()));
    }
    vec![
        Stage::NormalizeDate {
            field: ORDER_DATE.to_string(),
        },
        Stage::Match(Condition::All(conditions)),
        Stage::Group {
            key: GroupKey::DateBucket {
                field: ORDER_DATE.to_string(),
                granularity: p.granularity,
            },
            key_field: "period".to_string(),
            fields: vec![
                ("orders".to_string(), Accumulator::Count),
                ("revenue".to_string(), Accumulator::Sum(Expr::field("total"))),
            ],
        },
        Stage::Sort(vec![SortKey::asc("period")]),
    ]
}

#[derive(Debug, Clone)]
pub struct CategoryBreakdownParams {
    pub range: DateRange,
    pub warehouse: Option<String>,
}

/// Units and revenue per product category.
pub fn sales_by_category(p: &CategoryBreakdownParams) -> Pipeline {
    let mut conditions = vec![in_window(ORDER_DATE, &p.range)];
    if let Some(w) = &p.warehouse {
        conditions.push(Condition::Eq("warehouse".to_string(), w.clone().into()));
    }
    vec![
        Stage::NormalizeDate {
            field: ORDER_DATE.to_string(),
        },
        Stage::Match(Condition::All(conditions)),
        Stage::Group {
            key: GroupKey::Field("category".to_string()),
            key_field: "category".to_string(),
            fields: vec![
                ("units".to_string(), Accumulator::Sum(Expr::field("quantity"))),
                ("revenue".to_string(), Accumulator::Sum(Expr::field("line_total"))),
            ],
        },
        Stage::Sort(vec![SortKey::desc("revenue"), SortKey::asc("category")]),
    ]
}

#[derive(Debug, Clone)]
pub struct TopProductsParams {
    pub range: DateRange,
    pub warehouse: Option<String>,
    pub limit: u64,
}

/// Top products by revenue. Ties break deterministically on product id so
/// "top N" is stable across runs.
pub fn top_products(p: &TopProductsParams) -> Pipeline {
    let mut conditions = vec![in_window(ORDER_DATE, &p.range)];
    if let Some(w) = &p.warehouse {
        conditions.push(Condition::Eq("warehouse".to_string(), w.clone().into()));
    }
    vec![
        Stage::NormalizeDate {
            field: ORDER_DATE.to_string(),
        },
        Stage::Match(Condition::All(conditions)),
        Stage::Group {
            key: GroupKey::Field("product_id".to_string()),
            key_field: "product_id".to_string(),
            fields: vec![
                (
                    "product_name".to_string(),
                    Accumulator::First(Expr::field("product_name")),
                ),
                ("units".to_string(), Accumulator::Sum(Expr::field("quantity"))),
                ("revenue".to_string(), Accumulator::Sum(Expr::field("line_total"))),
            ],
        },
        Stage::Sort(vec![SortKey::desc("revenue"), SortKey::asc("product_id")]),
        Stage::Limit(p.limit),
    ]
}

pub(crate) fn in_window(field: &str, range: &DateRange) -> Condition {
    Condition::Between {
        field: field.to_string(),
        start: date_value(range.start),
        end: date_value(range.end),
    }
}
