//! `stocklens-pipeline` — aggregation stages and per-domain builders.
//!
//! Builders are pure functions from typed filter parameters to a
//! [`Pipeline`] of store-agnostic stages. A builder never fails for "no
//! matching rows"; it only fails fast on structurally invalid parameters.

pub mod customers;
pub mod input;
pub mod inventory;
pub mod procurement;
pub mod sales;
pub mod stage;

pub use stage::{
    date_value, Accumulator, Condition, Expr, Granularity, GroupKey, Pipeline, SortKey, Stage,
};
