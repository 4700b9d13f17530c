use std::path::Path;

use mupdf::{Page, TextPageFlags};

use pdftxt_core::cleanup::{TextRun, assemble_rows, expand_ligatures};
use pdftxt_core::{BackendError, ExtractionBackend, Method};

use crate::{mupdf_err, open_document, pages};

const DEFAULT_ROW_TOLERANCE: f32 = 3.0;

/// Layout-aware backend that rebuilds visual rows.
///
/// MuPDF groups text into blocks, which splits table rows into one block per
/// column. This backend instead collects every text line with its position,
/// then clusters lines on a shared baseline and orders them left to right, so
/// a table row comes out as one line of space-separated cells.
#[derive(Debug, Clone, Copy)]
pub struct LayoutBackend {
    row_tolerance: f32,
}

impl Default for LayoutBackend {
    fn default() -> Self {
        Self {
            row_tolerance: DEFAULT_ROW_TOLERANCE,
        }
    }
}

impl LayoutBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum baseline distance, in points, for two lines to share a row.
    pub fn with_row_tolerance(mut self, tolerance: f32) -> Self {
        self.row_tolerance = tolerance.max(0.0);
        self
    }

    fn page_runs(&self, page: &Page) -> Result<Vec<TextRun>, BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(mupdf_err)?;

        let mut runs = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let bounds = line.bounds();
                let baseline = line
                    .chars()
                    .next()
                    .map(|c| c.origin().y)
                    .unwrap_or(bounds.y1);
                let text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                runs.push(TextRun {
                    x0: bounds.x0,
                    x1: bounds.x1,
                    y: baseline,
                    text,
                });
            }
        }
        Ok(runs)
    }
}

impl ExtractionBackend for LayoutBackend {
    fn method(&self) -> Method {
        Method::Layout
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let document = open_document(path)?;

        pages(&document)?
            .iter()
            .map(|page| {
                let rows = assemble_rows(self.page_runs(page)?, self.row_tolerance);
                Ok(expand_ligatures(&rows.join("\n")))
            })
            .collect()
    }
}
