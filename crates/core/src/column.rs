//! Report column schema and cell formatting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic type of a report column. Drives default rendering in exports
/// and client-side alignment; it does not constrain the stored value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Number,
    Currency,
    Percentage,
    Date,
    Boolean,
}

/// Pure value-to-display function. Must be side-effect free.
pub type CellFormatter = fn(&Value) -> String;

/// One column of a report's result table.
#[derive(Debug, Clone)]
pub struct ReportColumn {
    /// Field key in a result row. Unique within a report.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    pub formatter: Option<CellFormatter>,
    pub sortable: bool,
    pub exportable: bool,
}

impl ReportColumn {
    pub fn new(key: &'static str, label: &'static str, kind: ColumnKind) -> Self {
        Self {
            key,
            label,
            kind,
            formatter: None,
            sortable: true,
            exportable: true,
        }
    }

    pub fn with_formatter(mut self, f: CellFormatter) -> Self {
        self.formatter = Some(f);
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn not_exportable(mut self) -> Self {
        self.exportable = false;
        self
    }

    /// Render a cell for display/export: the column formatter if present,
    /// otherwise `display_value`, falling back per `kind`.
    pub fn render(&self, value: Option<&Value>) -> String {
        let value = match value {
            Some(v) => v,
            None => return String::new(),
        };
        match self.formatter {
            Some(f) => f(value),
            None => match self.kind {
                ColumnKind::Currency => fmt::currency(value),
                ColumnKind::Percentage => fmt::percentage(value),
                _ => display_value(value),
            },
        }
    }
}

/// Default string form of a JSON value for table cells.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => {
            if *b {
                "yes".to_string()
            } else {
                "no".to_string()
            }
        }
        Value::Number(n) => {
            // Render integral floats without a trailing ".0".
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    return format!("{}", f as i64);
                }
            }
            n.to_string()
        }
        other => other.to_string(),
    }
}

/// Stock formatters for the common semantic kinds.
pub mod fmt {
    use serde_json::Value;

    pub fn currency(value: &Value) -> String {
        match value.as_f64() {
            Some(f) => format!("{:.2}", f),
            None => super::display_value(value),
        }
    }

    pub fn percentage(value: &Value) -> String {
        match value.as_f64() {
            Some(f) => format!("{:.1}%", f),
            None => super::display_value(value),
        }
    }

    pub fn integer(value: &Value) -> String {
        match value.as_f64() {
            Some(f) => format!("{}", f.round() as i64),
            None => super::display_value(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_uses_kind_defaults() {
        let col = ReportColumn::new("total", "Total", ColumnKind::Currency);
        assert_eq!(col.render(Some(&json!(1234.5))), "1234.50");

        let col = ReportColumn::new("rate", "Rate", ColumnKind::Percentage);
        assert_eq!(col.render(Some(&json!(12.34))), "12.3%");
    }

    #[test]
    fn render_prefers_explicit_formatter() {
        let col = ReportColumn::new("qty", "Qty", ColumnKind::Number).with_formatter(fmt::integer);
        assert_eq!(col.render(Some(&json!(7.0))), "7");
    }

    #[test]
    fn missing_and_null_cells_render_empty() {
        let col = ReportColumn::new("name", "Name", ColumnKind::String);
        assert_eq!(col.render(None), "");
        assert_eq!(col.render(Some(&Value::Null)), "");
    }

    #[test]
    fn integral_numbers_render_without_decimal_point() {
        assert_eq!(display_value(&json!(42.0)), "42");
        assert_eq!(display_value(&json!(42.5)), "42.5");
    }
}
