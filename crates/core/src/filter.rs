//! Report filter schema and request filter values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape of a filter's value in a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    DateRange,
    Select,
    MultiSelect,
    Search,
    Number,
    NumberRange,
    Boolean,
}

/// One selectable option of a select/multi-select filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Where a select filter's options come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterOptions {
    /// No options (free-form kinds).
    None,
    /// Fixed options compiled into the definition.
    Static { options: Vec<FilterOption> },
    /// Options fetched at request time from a named collection. A fetch
    /// failure degrades this filter to an empty option list.
    Dynamic { source: DynamicSource },
}

/// Descriptor for dynamically-loaded filter options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSource {
    pub collection: String,
    pub value_field: String,
    pub label_field: String,
}

impl DynamicSource {
    pub fn new(
        collection: impl Into<String>,
        value_field: impl Into<String>,
        label_field: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            value_field: value_field.into(),
            label_field: label_field.into(),
        }
    }
}

/// One declared filter of a report.
#[derive(Debug, Clone)]
pub struct ReportFilter {
    /// Key in the request's filter map.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
    pub options: FilterOptions,
    pub default: Option<Value>,
    /// If set, the generator rejects a request missing this key before any
    /// query executes.
    pub required: bool,
}

impl ReportFilter {
    pub fn new(key: &'static str, label: &'static str, kind: FilterKind) -> Self {
        Self {
            key,
            label,
            kind,
            options: FilterOptions::None,
            default: None,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_static_options(mut self, options: Vec<FilterOption>) -> Self {
        self.options = FilterOptions::Static { options };
        self
    }

    pub fn with_dynamic_options(mut self, source: DynamicSource) -> Self {
        self.options = FilterOptions::Dynamic { source };
        self
    }
}

/// Filter key → value, as submitted by the caller. `BTreeMap` keeps the
/// serialized form deterministic, which cache-key hashing relies on.
pub type FilterValues = BTreeMap<String, Value>;

/// A filter value counts as missing when absent, null, blank, or an empty
/// list. Required-filter validation and scope handling share this notion.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}
