//! `stocklens-export` — CSV, XLSX and chunked PDF serialization of
//! generated reports.
//!
//! Exports always run against the live store with widened pagination;
//! the generator's export ceiling bounds the result set. A failed query
//! produces no bytes, and a zero-byte payload where rows were expected
//! is an error, never a silently empty file.

mod csv;
mod pdf;
mod xlsx;

use tokio_util::sync::CancellationToken;

use stocklens_core::{ExportFormat, ReportError, ReportResult, RequestParams};
use stocklens_engine::{DocumentStore, ReportCache, ReportGenerator};

/// A finished export payload.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Run a report in export mode and serialize it in the requested format.
///
/// `params.filters` and `params.sort` are honored; pagination is replaced
/// with a single full page up to the configured export ceiling. The
/// cancellation token is checked between PDF render batches.
pub async fn export_report<S, C>(
    generator: &ReportGenerator<S, C>,
    report_id: &str,
    params: &RequestParams,
    cancel: &CancellationToken,
) -> ReportResult<ExportFile>
where
    S: DocumentStore,
    C: ReportCache,
{
    let format = params
        .export
        .ok_or_else(|| ReportError::validation("export", "no export format requested"))?;
    let definition = generator.registry().get(report_id)?;

    let widened = RequestParams {
        filters: params.filters.clone(),
        page: 1,
        page_size: generator.config().export_page_ceiling,
        sort: params.sort.clone(),
        export: Some(format),
    };
    let response = generator.generate(report_id, &widened).await?;
    let rows = response.rows();
    let columns = definition.exportable_columns();

    let bytes = match format {
        ExportFormat::Csv => csv::render(&columns, rows)?,
        ExportFormat::Excel => xlsx::render(definition.name, &columns, rows, response.summary())?,
        ExportFormat::Pdf => pdf::render(definition.name, &columns, rows, cancel)?,
    };
    if bytes.is_empty() {
        return Err(ReportError::export("serializer produced an empty payload"));
    }

    let filename = format!(
        "{}_{}.{}",
        slug(definition.name),
        response.meta.generated_at.format("%Y-%m-%d"),
        format.extension()
    );
    tracing::info!(
        report_id,
        format = format.extension(),
        bytes = bytes.len(),
        rows = rows.len(),
        "report exported"
    );
    Ok(ExportFile {
        bytes,
        filename,
        content_type: format.content_type(),
    })
}

/// Lowercase the report name and collapse anything non-alphanumeric into
/// single hyphens, for use in filenames.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use stocklens_engine::{EngineConfig, InMemoryStore, NoopCache};

    #[test]
    fn slugs_are_filename_safe() {
        assert_eq!(slug("Sales KPI Snapshot"), "sales-kpi-snapshot");
        assert_eq!(slug("Stock Health (all)"), "stock-health-all");
        assert_eq!(slug("  Trend  "), "trend");
    }

    fn seeded_generator() -> ReportGenerator<InMemoryStore, NoopCache> {
        let store = InMemoryStore::new();
        let mut orders = Vec::new();
        for day in 1..=6 {
            orders.push(json!({
                "ordered_at": format!("2026-08-{day:02}"),
                "total": 50.0 * day as f64,
                "warehouse": "east",
            }));
        }
        store.seed("orders", orders);
        ReportGenerator::new(Arc::new(store), NoopCache, EngineConfig::default())
    }

    fn trend_params(format: ExportFormat) -> RequestParams {
        RequestParams::default()
            .with_filter("date_range", json!({"start": "2026-08-01", "end": "2026-08-31"}))
            .with_filter("granularity", json!("day"))
            .exported_as(format)
    }

    #[tokio::test]
    async fn csv_export_carries_labels_and_all_rows() {
        let generator = seeded_generator();
        let file = export_report(
            &generator,
            "sales-trend",
            &trend_params(ExportFormat::Csv),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(file.content_type, "text/csv");
        assert!(file.filename.starts_with("sales-trend_"));
        assert!(file.filename.ends_with(".csv"));

        let text = String::from_utf8(file.bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "Period,Orders,Revenue");
        assert_eq!(lines.count(), 6);
    }

    #[tokio::test]
    async fn excel_and_pdf_exports_have_format_magic() {
        let generator = seeded_generator();
        let cancel = CancellationToken::new();

        let xlsx = export_report(
            &generator,
            "sales-trend",
            &trend_params(ExportFormat::Excel),
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(&xlsx.bytes[..2], b"PK");
        assert!(xlsx.filename.ends_with(".xlsx"));

        let pdf = export_report(
            &generator,
            "sales-trend",
            &trend_params(ExportFormat::Pdf),
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(&pdf.bytes[..5], b"%PDF-");
        assert!(pdf.filename.ends_with(".pdf"));
    }

    #[test]
    fn pdf_export_future_is_send() {
        fn assert_send<T: Send>(_: T) {}
        let generator = seeded_generator();
        let params = trend_params(ExportFormat::Pdf);
        let cancel = CancellationToken::new();
        // Spawned HTTP handlers need the export future to be Send; all
        // serializer state must stay inside the synchronous sections.
        assert_send(export_report(&generator, "sales-trend", &params, &cancel));
    }

    #[tokio::test]
    async fn export_without_format_is_a_validation_error() {
        let generator = seeded_generator();
        let params = trend_params(ExportFormat::Csv);
        let params = RequestParams {
            export: None,
            ..params
        };
        let err = export_report(&generator, "sales-trend", &params, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Validation { ref field, .. } if field == "export"));
    }

    #[tokio::test]
    async fn empty_result_is_a_valid_export_not_an_error() {
        let generator = seeded_generator();
        let params = RequestParams::default()
            .with_filter("date_range", json!({"start": "2027-01-01", "end": "2027-01-31"}))
            .exported_as(ExportFormat::Csv);
        let file = export_report(&generator, "sales-trend", &params, &CancellationToken::new())
            .await
            .unwrap();
        // Header-only file: no rows matched, but the export succeeded.
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[tokio::test]
    async fn rejected_export_produces_no_bytes() {
        let generator = ReportGenerator::new(
            Arc::new(stocklens_engine::InMemoryStore::new()),
            NoopCache,
            EngineConfig::default().with_page_ceilings(100, 0),
        );
        // A zero export ceiling rejects every export before any bytes exist.
        let err = export_report(
            &generator,
            "sales-trend",
            &trend_params(ExportFormat::Csv),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ReportError::Validation { .. }));
    }
}
