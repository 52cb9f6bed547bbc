//! Customer analytics builders: outstanding balances, order activity.

use stocklens_core::DateRange;

use crate::sales::in_window;
use crate::stage::{Accumulator, Condition, Expr, GroupKey, Pipeline, SortKey, Stage};

pub const CUSTOMERS: &str = "customers";

#[derive(Debug, Clone)]
pub struct BalanceParams {
    pub segment: Option<String>,
    /// Free-text match against the customer name.
    pub search: Option<String>,
    pub limit: u64,
}

/// Customers ranked by outstanding balance, with credit utilization.
pub fn customer_balances(p: &BalanceParams) -> Pipeline {
    let mut conditions = vec![Condition::Gt("outstanding_balance".to_string(), 0.into())];
    if let Some(s) = &p.segment {
        conditions.push(Condition::Eq("segment".to_string(), s.clone().into()));
    }
    if let Some(needle) = &p.search {
        conditions.push(Condition::Contains {
            field: "name".to_string(),
            needle: needle.clone(),
        });
    }
    vec![
        Stage::Match(Condition::All(conditions)),
        Stage::Project(vec![
            ("customer_id".to_string(), Expr::field("customer_id")),
            ("name".to_string(), Expr::field("name")),
            ("segment".to_string(), Expr::field("segment")),
            (
                "outstanding_balance".to_string(),
                Expr::field("outstanding_balance"),
            ),
            ("credit_limit".to_string(), Expr::field("credit_limit")),
            (
                "credit_utilization".to_string(),
                Expr::multiply(
                    Expr::divide(
                        Expr::field("outstanding_balance"),
                        Expr::field("credit_limit"),
                    ),
                    Expr::Literal(100.into()),
                ),
            ),
        ]),
        Stage::Sort(vec![
            SortKey::desc("outstanding_balance"),
            SortKey::asc("customer_id"),
        ]),
        Stage::Limit(p.limit),
    ]
}

#[derive(Debug, Clone)]
pub struct ActivityParams {
    pub range: DateRange,
    pub limit: u64,
}

/// Most active customers in the window: order count, revenue, last order.
pub fn customer_activity(p: &ActivityParams) -> Pipeline {
    vec![
        Stage::NormalizeDate {
            field: "ordered_at".to_string(),
        },
        Stage::Match(in_window("ordered_at", &p.range)),
        Stage::Group {
            key: GroupKey::Field("customer_id".to_string()),
            key_field: "customer_id".to_string(),
            fields: vec![
                (
                    "customer_name".to_string(),
                    Accumulator::First(Expr::field("customer_name")),
                ),
                ("orders".to_string(), Accumulator::Count),
                ("revenue".to_string(), Accumulator::Sum(Expr::field("total"))),
                (
                    "last_order_at".to_string(),
                    Accumulator::Max(Expr::field("ordered_at")),
                ),
            ],
        },
        Stage::Sort(vec![SortKey::desc("revenue"), SortKey::asc("customer_id")]),
        Stage::Limit(p.limit),
    ]
}
