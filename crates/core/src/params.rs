//! Request parameters: filters, pagination, sort, export mode.

use serde::{Deserialize, Serialize};

use crate::filter::FilterValues;

/// Fixed report categories, mirroring the back-office navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sales,
    Inventory,
    Receivables,
    Payables,
    Activity,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sales => "sales",
            Category::Inventory => "inventory",
            Category::Receivables => "receivables",
            Category::Payables => "payables",
            Category::Activity => "activity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sales" => Some(Category::Sales),
            "inventory" => Some(Category::Inventory),
            "receivables" => Some(Category::Receivables),
            "payables" => Some(Category::Payables),
            "activity" => Some(Category::Activity),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Requested sort: a column key plus direction. The generator rejects sorts
/// on unknown or non-sortable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Supported export formats. Wire names follow the UI contract
/// (`csv` | `excel` | `pdf`); file extensions differ for the workbook.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// One report request. Owned by the caller and consumed per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    #[serde(default)]
    pub filters: FilterValues,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// When set, pagination ceilings widen and caching is bypassed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportFormat>,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    25
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            filters: FilterValues::new(),
            page: 1,
            page_size: default_page_size(),
            sort: None,
            export: None,
        }
    }
}

impl RequestParams {
    pub fn with_filter(mut self, key: &str, value: serde_json::Value) -> Self {
        self.filters.insert(key.to_string(), value);
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn exported_as(mut self, format: ExportFormat) -> Self {
        self.export = Some(format);
        self
    }

    pub fn is_export(&self) -> bool {
        self.export.is_some()
    }
}
