//! Response envelopes and JSON mapping from report definitions.

use serde::Serialize;
use serde_json::{json, Value};

use stocklens_core::FilterOptions;
use stocklens_reports::ReportDefinition;

/// The `{success, data?, error?}` wrapper every endpoint replies with.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> ApiEnvelope<T> {
    ApiEnvelope {
        success: true,
        data: Some(data),
        error: None,
    }
}

pub fn fail(message: impl Into<String>) -> ApiEnvelope<Value> {
    ApiEnvelope {
        success: false,
        data: None,
        error: Some(message.into()),
    }
}

/// Definition metadata as the UI consumes it: schema only, no pipeline.
pub fn definition_json(definition: &ReportDefinition) -> Value {
    json!({
        "id": definition.id,
        "name": definition.name,
        "category": definition.category,
        "columns": definition
            .columns
            .iter()
            .map(|c| json!({
                "key": c.key,
                "label": c.label,
                "kind": c.kind,
                "sortable": c.sortable,
                "exportable": c.exportable,
            }))
            .collect::<Vec<_>>(),
        "filters": definition
            .filters
            .iter()
            .map(|f| json!({
                "key": f.key,
                "label": f.label,
                "kind": f.kind,
                "required": f.required,
                "default": f.default,
                "dynamic": matches!(f.options, FilterOptions::Dynamic { .. }),
            }))
            .collect::<Vec<_>>(),
        "formats": definition.formats,
    })
}
