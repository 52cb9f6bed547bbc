//! Aggregation pipeline as data.
//!
//! Builders assemble typed `Stage` values by ordinary conditional appends;
//! the executor binds the finished pipeline to a concrete store, preserving
//! stage order exactly as built. Keeping stages as an enum (rather than ad
//! hoc nested literals) makes stage order and presence unit-testable in
//! isolation from any store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use stocklens_core::SortDirection;

/// Canonical RFC 3339 UTC value for date bounds in conditions. Matches the
/// form `NormalizeDate` rewrites stored fields to, so string comparison
/// orders correctly.
pub fn date_value(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Ordered list of aggregation stages.
pub type Pipeline = Vec<Stage>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Keep documents matching a condition tree.
    Match(Condition),
    /// Defensive conversion of a stored date field to canonical RFC 3339
    /// UTC. Emitted before every date-range match so string-typed storage
    /// does not silently exclude rows.
    NormalizeDate { field: String },
    /// Group documents and compute accumulators. The group key is written
    /// to `key_field` of each output document.
    Group {
        key: GroupKey,
        key_field: String,
        fields: Vec<(String, Accumulator)>,
    },
    /// Reshape each document to exactly the named expressions.
    Project(Vec<(String, Expr)>),
    /// Stable multi-key sort.
    Sort(Vec<SortKey>),
    Skip(u64),
    Limit(u64),
    /// Terminal stage: a single document `{ <field>: n }`.
    Count { field: String },
    /// Correlated join: collect matching documents from another collection
    /// into an array field, optionally pre-filtered.
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
        filter: Option<Condition>,
    },
    /// Run independent sub-pipelines over the same input in one round trip;
    /// the single output document holds each branch's rows under its name.
    Facet(Vec<(String, Pipeline)>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Condition tree for `Match` and lookup filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Eq(String, Value),
    In(String, Vec<Value>),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    /// Inclusive range on one field.
    Between {
        field: String,
        start: Value,
        end: Value,
    },
    /// Case-insensitive substring match (free-text search filters).
    Contains { field: String, needle: String },
    /// Field-to-field comparison, `left <= right`.
    FieldLte(String, String),
    /// Field-to-field comparison, `left >= right`.
    FieldGte(String, String),
    /// Array field absent or empty.
    IsEmpty(String),
}

/// Time-bucket granularity for trend grouping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            _ => None,
        }
    }

    /// chrono format string producing a lexicographically sortable bucket
    /// key: `2026-08-26`, `2026-W35`, `2026-08`.
    pub fn format_str(&self) -> &'static str {
        match self {
            Granularity::Day => "%Y-%m-%d",
            Granularity::Week => "%G-W%V",
            Granularity::Month => "%Y-%m",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupKey {
    /// Single group over all input documents.
    Null,
    Field(String),
    DateBucket {
        field: String,
        granularity: Granularity,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Accumulator {
    Count,
    Sum(Expr),
    Avg(Expr),
    Min(Expr),
    Max(Expr),
    /// First value in encounter order; used to carry labels alongside a
    /// grouped id (e.g. product name next to product id).
    First(Expr),
}

/// Per-document value expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Field(String),
    Literal(Value),
    Multiply(Box<Expr>, Box<Expr>),
    Divide(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field(name.into())
    }

    pub fn multiply(a: Expr, b: Expr) -> Self {
        Expr::Multiply(Box::new(a), Box::new(b))
    }

    pub fn divide(a: Expr, b: Expr) -> Self {
        Expr::Divide(Box::new(a), Box::new(b))
    }
}
