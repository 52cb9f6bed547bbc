//! Workbook serializer: title row, optional summary block, styled header,
//! data rows, auto-sized columns.

use std::collections::BTreeMap;

use rust_xlsxwriter::{Color, Format, Workbook, XlsxError};
use serde_json::Value;

use stocklens_core::column::display_value;
use stocklens_core::{Document, ReportColumn, ReportError, ReportResult};

/// Widths beyond this read as layout bugs in every spreadsheet app.
const MAX_COLUMN_WIDTH: usize = 50;
const MIN_COLUMN_WIDTH: usize = 10;

pub(crate) fn render(
    title: &str,
    columns: &[&ReportColumn],
    rows: &[Document],
    summary: Option<&BTreeMap<String, Value>>,
) -> ReportResult<Vec<u8>> {
    build(title, columns, rows, summary).map_err(|e| ReportError::export(e.to_string()))
}

fn build(
    title: &str,
    columns: &[&ReportColumn],
    rows: &[Document],
    summary: Option<&BTreeMap<String, Value>>,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let title_format = Format::new().set_bold().set_font_size(14);
    let summary_key_format = Format::new().set_bold();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2));

    sheet.write_with_format(0, 0, title, &title_format)?;
    let mut next_row: u32 = 2;

    if let Some(summary) = summary {
        for (key, value) in summary {
            sheet.write_with_format(next_row, 0, key.as_str(), &summary_key_format)?;
            sheet.write(next_row, 1, display_value(value))?;
            next_row += 1;
        }
        next_row += 1;
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.label.chars().count()).collect();

    for (col, column) in columns.iter().enumerate() {
        sheet.write_with_format(next_row, col as u16, column.label, &header_format)?;
    }
    next_row += 1;

    for row in rows {
        for (col, column) in columns.iter().enumerate() {
            let cell = column.render(row.get(column.key));
            widths[col] = widths[col].max(cell.chars().count());
            sheet.write(next_row, col as u16, cell)?;
        }
        next_row += 1;
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (*width).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width as f64)?;
    }

    workbook.save_to_buffer()
}
