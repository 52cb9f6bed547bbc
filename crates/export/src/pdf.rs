//! Print serializer: a paginated table driven by an explicit vertical
//! cursor. Page assignment is computed by the same cursor that lays text
//! out, so no row is ever dropped or duplicated across page breaks.
//!
//! Rows are rendered in fixed-size batches with a cancellation check
//! between batches, so an abandoned export stops instead of burning
//! through tens of thousands of rows.

use std::ops::Range;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tokio_util::sync::CancellationToken;

use stocklens_core::{Document, ReportColumn, ReportError, ReportResult};

// A4 landscape.
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const MARGIN_MM: f32 = 15.0;

const TITLE_STEP_MM: f32 = 10.0;
const HEADER_STEP_MM: f32 = 8.0;
const ROW_STEP_MM: f32 = 6.0;

const TITLE_SIZE: f32 = 13.0;
const HEADER_SIZE: f32 = 9.0;
const BODY_SIZE: f32 = 8.0;

const ROWS_PER_BATCH: usize = 100;
const CELL_CHAR_CEILING: usize = 50;

/// Vertical cursor over one page. `take` claims a line of the given
/// height and returns its baseline, or `None` when the line would cross
/// the bottom margin.
struct Cursor {
    y: f32,
}

impl Cursor {
    fn top() -> Self {
        Self {
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn take(&mut self, step: f32) -> Option<f32> {
        if self.y - step < MARGIN_MM {
            return None;
        }
        self.y -= step;
        Some(self.y)
    }
}

/// Split `total_rows` into per-page index ranges by walking the cursor
/// through each page's title and header before counting row lines.
fn assign_pages(total_rows: usize) -> Vec<Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    loop {
        let mut cursor = Cursor::top();
        if cursor.take(TITLE_STEP_MM).is_none() || cursor.take(HEADER_STEP_MM).is_none() {
            break;
        }
        let mut end = start;
        while end < total_rows && cursor.take(ROW_STEP_MM).is_some() {
            end += 1;
        }
        if end == start && !pages.is_empty() {
            break;
        }
        pages.push(start..end);
        start = end;
        if start >= total_rows {
            break;
        }
    }
    pages
}

pub(crate) fn render(
    title: &str,
    columns: &[&ReportColumn],
    rows: &[Document],
    cancel: &CancellationToken,
) -> ReportResult<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "table");
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let pages = assign_pages(rows.len());
    let column_width = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / columns.len().max(1) as f32;
    let column_x = |col: usize| Mm(MARGIN_MM + col as f32 * column_width);

    let mut rendered = 0usize;
    for (page_no, range) in pages.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(ReportError::Cancelled);
        }
        let layer = if page_no == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "table");
            doc.get_page(page).get_layer(layer)
        };

        let mut cursor = Cursor::top();
        if let Some(y) = cursor.take(TITLE_STEP_MM) {
            let heading = format!("{title} (page {} of {})", page_no + 1, pages.len());
            layer.use_text(sanitize(&heading), TITLE_SIZE, Mm(MARGIN_MM), Mm(y), &bold_font);
        }
        if let Some(y) = cursor.take(HEADER_STEP_MM) {
            for (col, column) in columns.iter().enumerate() {
                layer.use_text(
                    sanitize(&truncate(column.label)),
                    HEADER_SIZE,
                    column_x(col),
                    Mm(y),
                    &bold_font,
                );
            }
        }

        for row in &rows[range.clone()] {
            if rendered > 0 && rendered % ROWS_PER_BATCH == 0 && cancel.is_cancelled() {
                return Err(ReportError::Cancelled);
            }
            let Some(y) = cursor.take(ROW_STEP_MM) else {
                break;
            };
            for (col, column) in columns.iter().enumerate() {
                let cell = truncate(&column.render(row.get(column.key)));
                layer.use_text(sanitize(&cell), BODY_SIZE, column_x(col), Mm(y), &body_font);
            }
            rendered += 1;
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}

fn pdf_err(e: printpdf::Error) -> ReportError {
    ReportError::export(e.to_string())
}

/// Bound horizontal layout: long cells get cut with an ellipsis.
fn truncate(text: &str) -> String {
    if text.chars().count() <= CELL_CHAR_CEILING {
        return text.to_string();
    }
    let cut: String = text.chars().take(CELL_CHAR_CEILING - 3).collect();
    format!("{cut}...")
}

/// Builtin PDF fonts only encode WinAnsi; anything outside printable
/// ASCII is replaced rather than risking a broken text stream.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect()
}
