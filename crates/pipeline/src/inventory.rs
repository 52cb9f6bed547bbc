//! Inventory analytics builders: stock health, dead stock, valuation.
//!
//! Stock documents are one row per (product, warehouse). Scoping: a named
//! warehouse narrows to that location; "all" (surfaced here as `None`)
//! evaluates every location, so scoped counts partition the unscoped ones.

use chrono::{DateTime, Utc};

use crate::stage::{
    date_value, Accumulator, Condition, Expr, GroupKey, Pipeline, SortKey, Stage,
};

pub const INVENTORY: &str = "inventory";

#[derive(Debug, Clone)]
pub struct StockHealthParams {
    pub warehouse: Option<String>,
}

/// Below-reorder-point / overstock / out-of-stock counts in one facet.
pub fn stock_health(p: &StockHealthParams) -> Pipeline {
    let mut pipeline = Vec::new();
    if let Some(w) = &p.warehouse {
        pipeline.push(Stage::Match(Condition::Eq(
            "warehouse".to_string(),
            w.clone().into(),
        )));
    }
    pipeline.push(Stage::Facet(vec![
        (
            "below_reorder".to_string(),
            vec![
                Stage::Match(Condition::All(vec![
                    Condition::Gt("quantity".to_string(), 0.into()),
                    Condition::FieldLte("quantity".to_string(), "reorder_point".to_string()),
                ])),
                Stage::Count {
                    field: "count".to_string(),
                },
            ],
        ),
        (
            "overstock".to_string(),
            vec![
                Stage::Match(Condition::FieldGte(
                    "quantity".to_string(),
                    "max_stock".to_string(),
                )),
                Stage::Count {
                    field: "count".to_string(),
                },
            ],
        ),
        (
            "out_of_stock".to_string(),
            vec![
                Stage::Match(Condition::Lte("quantity".to_string(), 0.into())),
                Stage::Count {
                    field: "count".to_string(),
                },
            ],
        ),
    ]));
    pipeline
}

#[derive(Debug, Clone)]
pub struct DeadStockParams {
    pub warehouse: Option<String>,
    /// Items sold on or after this instant are excluded. Derived from the
    /// configured trailing window (default 90 days), not a hidden constant.
    pub cutoff: DateTime<Utc>,
}

/// Positive-stock items with zero sales since the cutoff, via a correlated
/// lookup against order history.
pub fn dead_stock(p: &DeadStockParams) -> Pipeline {
    let mut conditions = vec![Condition::Gt("quantity".to_string(), 0.into())];
    if let Some(w) = &p.warehouse {
        conditions.push(Condition::Eq("warehouse".to_string(), w.clone().into()));
    }
    vec![
        Stage::Match(Condition::All(conditions)),
        Stage::Lookup {
            from: crate::sales::ORDER_LINES.to_string(),
            local_field: "product_id".to_string(),
            foreign_field: "product_id".to_string(),
            as_field: "recent_sales".to_string(),
            filter: Some(Condition::Gte(
                "ordered_at".to_string(),
                date_value(p.cutoff),
            )),
        },
        Stage::Match(Condition::IsEmpty("recent_sales".to_string())),
        Stage::Project(vec![
            ("product_id".to_string(), Expr::field("product_id")),
            ("product_name".to_string(), Expr::field("product_name")),
            ("warehouse".to_string(), Expr::field("warehouse")),
            ("quantity".to_string(), Expr::field("quantity")),
            ("unit_cost".to_string(), Expr::field("unit_cost")),
            (
                "stock_value".to_string(),
                Expr::multiply(Expr::field("quantity"), Expr::field("unit_cost")),
            ),
        ]),
        Stage::Sort(vec![SortKey::desc("stock_value"), SortKey::asc("product_id")]),
    ]
}

#[derive(Debug, Clone)]
pub struct ValuationParams {
    pub warehouse: Option<String>,
    pub category: Option<String>,
}

/// On-hand valuation grouped by category.
pub fn inventory_valuation(p: &ValuationParams) -> Pipeline {
    let mut pipeline = Vec::new();
    let mut conditions = Vec::new();
    if let Some(w) = &p.warehouse {
        conditions.push(Condition::Eq("warehouse".to_string(), w.clone().into()));
    }
    if let Some(c) = &p.category {
        conditions.push(Condition::Eq("category".to_string(), c.clone().into()));
    }
    if !conditions.is_empty() {
        pipeline.push(Stage::Match(Condition::All(conditions)));
    }
    pipeline.push(Stage::Group {
        key: GroupKey::Field("category".to_string()),
        key_field: "category".to_string(),
        fields: vec![
            ("units".to_string(), Accumulator::Sum(Expr::field("quantity"))),
            (
                "stock_value".to_string(),
                Accumulator::Sum(Expr::multiply(
                    Expr::field("quantity"),
                    Expr::field("unit_cost"),
                )),
            ),
        ],
    });
    pipeline.push(Stage::Sort(vec![
        SortKey::desc("stock_value"),
        SortKey::asc("category"),
    ]));
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscoped_stock_health_has_no_match_before_facet() {
        let pipeline = stock_health(&StockHealthParams { warehouse: None });
        assert_eq!(pipeline.len(), 1);
        assert!(matches!(pipeline[0], Stage::Facet(_)));
    }

    #[test]
    fn scoped_stock_health_prefixes_warehouse_match() {
        let pipeline = stock_health(&StockHealthParams {
            warehouse: Some("east".to_string()),
        });
        assert_eq!(pipeline.len(), 2);
        match &pipeline[0] {
            Stage::Match(Condition::Eq(field, v)) => {
                assert_eq!(field, "warehouse");
                assert_eq!(v, "east");
            }
            other => panic!("expected warehouse match, got {other:?}"),
        }
    }

    #[test]
    fn stock_health_facet_has_all_three_branches() {
        let pipeline = stock_health(&StockHealthParams { warehouse: None });
        match &pipeline[0] {
            Stage::Facet(branches) => {
                let names: Vec<_> = branches.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, ["below_reorder", "overstock", "out_of_stock"]);
                for (_, branch) in branches {
                    assert!(matches!(branch.last(), Some(Stage::Count { .. })));
                }
            }
            other => panic!("expected facet, got {other:?}"),
        }
    }

    #[test]
    fn dead_stock_excludes_sales_after_cutoff() {
        let cutoff: DateTime<Utc> = "2026-05-28T00:00:00Z".parse().unwrap();
        let pipeline = dead_stock(&DeadStockParams {
            warehouse: None,
            cutoff,
        });
        match &pipeline[1] {
            Stage::Lookup {
                as_field, filter, ..
            } => {
                assert_eq!(as_field, "recent_sales");
                match filter {
                    Some(Condition::Gte(field, bound)) => {
                        assert_eq!(field, "ordered_at");
                        assert_eq!(bound.as_str().unwrap(), "2026-05-28T00:00:00Z");
                    }
                    other => panic!("expected cutoff filter, got {other:?}"),
                }
            }
            other => panic!("expected lookup, got {other:?}"),
        }
        assert!(matches!(
            &pipeline[2],
            Stage::Match(Condition::IsEmpty(f)) if f == "recent_sales"
        ));
    }
}
