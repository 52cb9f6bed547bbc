//! Delimited-text serializer: header row from column labels, one record
//! per row, single pass.

use stocklens_core::{Document, ReportColumn, ReportError, ReportResult};

pub(crate) fn render(columns: &[&ReportColumn], rows: &[Document]) -> ReportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(|c| c.label))
        .map_err(csv_err)?;
    for row in rows {
        writer
            .write_record(columns.iter().map(|c| c.render(row.get(c.key))))
            .map_err(csv_err)?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::export(e.to_string()))
}

fn csv_err(e: csv::Error) -> ReportError {
    ReportError::export(e.to_string())
}
