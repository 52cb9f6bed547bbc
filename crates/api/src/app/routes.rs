//! HTTP routes and handlers for the reporting surface.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use stocklens_core::{Category, ReportError, RequestParams};
use stocklens_export::export_report;

use crate::app::dto;
use crate::app::errors::report_error_to_response;
use crate::app::DevServices;

pub fn router() -> Router<Arc<DevServices>> {
    Router::new()
        .route("/reports/categories", get(list_categories))
        .route("/reports/:category", get(list_reports))
        .route("/reports/:category/:id", post(generate))
        .route("/reports/:category/:id/export", post(export))
        .route("/reports/:id/filters/:key/options", get(filter_options))
}

pub async fn health() -> Response {
    Json(dto::ok(json!({"status": "ok"}))).into_response()
}

async fn list_categories(State(services): State<Arc<DevServices>>) -> Response {
    let registry = services.generator.registry();
    let categories: Vec<_> = registry
        .categories()
        .into_iter()
        .map(|category| {
            json!({
                "id": category.as_str(),
                "reports": registry.list_by_category(category).len(),
            })
        })
        .collect();
    Json(dto::ok(categories)).into_response()
}

async fn list_reports(
    State(services): State<Arc<DevServices>>,
    Path(category): Path<String>,
) -> Response {
    let Some(category) = Category::parse(&category) else {
        return report_error_to_response(ReportError::not_found(category));
    };
    let reports: Vec<_> = services
        .generator
        .registry()
        .list_by_category(category)
        .iter()
        .map(|definition| dto::definition_json(definition))
        .collect();
    Json(dto::ok(reports)).into_response()
}

async fn generate(
    State(services): State<Arc<DevServices>>,
    Path((category, id)): Path<(String, String)>,
    Json(params): Json<RequestParams>,
) -> Response {
    if let Err(response) = check_category(&services, &category, &id) {
        return response;
    }
    match services.generator.generate(&id, &params).await {
        Ok(envelope) => Json(dto::ok(envelope)).into_response(),
        Err(err) => report_error_to_response(err),
    }
}

async fn export(
    State(services): State<Arc<DevServices>>,
    Path((category, id)): Path<(String, String)>,
    Json(params): Json<RequestParams>,
) -> Response {
    if let Err(response) = check_category(&services, &category, &id) {
        return response;
    }
    let cancel = CancellationToken::new();
    match export_report(&services.generator, &id, &params, &cancel).await {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, file.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.filename),
                ),
            ],
            file.bytes,
        )
            .into_response(),
        Err(err) => report_error_to_response(err),
    }
}

async fn filter_options(
    State(services): State<Arc<DevServices>>,
    Path((id, key)): Path<(String, String)>,
) -> Response {
    match services.generator.filter_options(&id).await {
        Ok(mut options) => match options.remove(&key) {
            Some(options) => Json(dto::ok(options)).into_response(),
            None => report_error_to_response(ReportError::not_found(format!("{id}/{key}"))),
        },
        Err(err) => report_error_to_response(err),
    }
}

/// The report must exist under the category named in the path.
fn check_category(services: &DevServices, category: &str, id: &str) -> Result<(), Response> {
    let definition = services
        .generator
        .registry()
        .get(id)
        .map_err(report_error_to_response)?;
    if Category::parse(category) != Some(definition.category) {
        return Err(report_error_to_response(ReportError::not_found(format!(
            "{category}/{id}"
        ))));
    }
    Ok(())
}
