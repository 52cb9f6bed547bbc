//! Error-to-response mapping.
//!
//! Validation failures surface their message verbatim (it names the bad
//! field). Query and timeout failures reply with generic text; the store
//! detail stays in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use stocklens_core::ReportError;

use crate::app::dto;

pub fn report_error_to_response(err: ReportError) -> Response {
    let (status, message) = match &err {
        ReportError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        ReportError::NotFound(id) => (StatusCode::NOT_FOUND, format!("report not found: {id}")),
        ReportError::Query(detail) => {
            tracing::error!(detail = %detail, "report query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "report query failed".to_string(),
            )
        }
        ReportError::Timeout(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            "report timed out, narrow the filters and retry".to_string(),
        ),
        ReportError::Export(detail) => {
            tracing::error!(detail = %detail, "export failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "export failed, retry the request".to_string(),
            )
        }
        ReportError::Cancelled => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "export cancelled".to_string(),
        ),
    };
    (status, Json(dto::fail(message))).into_response()
}
