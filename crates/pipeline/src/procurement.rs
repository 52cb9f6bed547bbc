//! Procurement analytics builders: supplier spend, purchase trend.

use stocklens_core::DateRange;

use crate::sales::in_window;
use crate::stage::{
    Accumulator, Condition, Expr, Granularity, GroupKey, Pipeline, SortKey, Stage,
};

pub const PURCHASE_ORDERS: &str = "purchase_orders";

#[derive(Debug, Clone)]
pub struct SupplierSpendParams {
    pub range: DateRange,
    pub status: Option<String>,
    pub limit: u64,
}

/// Suppliers ranked by purchase spend in the window.
pub fn supplier_spend(p: &SupplierSpendParams) -> Pipeline {
    let mut conditions = vec![in_window("ordered_at", &p.range)];
    if let Some(s) = &p.status {
        conditions.push(Condition::Eq("status".to_string(), s.clone().into()));
    }
    vec![
        Stage::NormalizeDate {
            field: "ordered_at".to_string(),
        },
        Stage::Match(Condition::All(conditions)),
        Stage::Group {
            key: GroupKey::Field("supplier_id".to_string()),
            key_field: "supplier_id".to_string(),
            fields: vec![
                (
                    "supplier_name".to_string(),
                    Accumulator::First(Expr::field("supplier_name")),
                ),
                ("orders".to_string(), Accumulator::Count),
                ("spend".to_string(), Accumulator::Sum(Expr::field("total"))),
            ],
        },
        Stage::Sort(vec![SortKey::desc("spend"), SortKey::asc("supplier_id")]),
        Stage::Limit(p.limit),
    ]
}

#[derive(Debug, Clone)]
pub struct PurchaseTrendParams {
    pub range: DateRange,
    pub granularity: Granularity,
    pub status: Option<String>,
}

/// Purchase spend trend bucketed by the requested granularity.
pub fn purchase_trend(p: &PurchaseTrendParams) -> Pipeline {
    let mut conditions = vec![in_window("ordered_at", &p.range)];
    if let Some(s) = &p.status {
        conditions.push(Condition::Eq("status".to_string(), s.clone().into()));
    }
    vec![
        Stage::NormalizeDate {
            field: "ordered_at".to_string(),
        },
        Stage::Match(Condition::All(conditions)),
        Stage::Group {
            key: GroupKey::DateBucket {
                field: "ordered_at".to_string(),
                granularity: p.granularity,
            },
            key_field: "period".to_string(),
            fields: vec![
                ("orders".to_string(), Accumulator::Count),
                ("spend".to_string(), Accumulator::Sum(Expr::field("total"))),
            ],
        },
        Stage::Sort(vec![SortKey::asc("period")]),
    ]
}
