use std::path::{Path, PathBuf};

use mupdf::{Colorspace, ImageFormat, Matrix};

use pdftxt_core::{BackendError, PageRasterizer};

use crate::{mupdf_err, open_document, pages};

/// Renders pages to grayscale PNG files with MuPDF.
///
/// Used by the OCR backend when poppler's `pdftoppm` is missing or fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfRasterizer;

impl MupdfRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for MupdfRasterizer {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn rasterize(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
        let document = open_document(pdf)?;
        let scale = dpi as f32 / 72.0;
        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_gray();

        let mut images = Vec::new();
        for (index, page) in pages(&document)?.iter().enumerate() {
            let pixmap = page
                .to_pixmap(&matrix, &colorspace, false, false)
                .map_err(mupdf_err)?;
            let path = out_dir.join(format!("page-{:04}.png", index + 1));
            let path_str = path
                .to_str()
                .ok_or_else(|| BackendError::ExtractionError("invalid output path".into()))?;
            pixmap
                .save_as(path_str, ImageFormat::PNG)
                .map_err(mupdf_err)?;
            images.push(path);
        }

        tracing::debug!(pdf = %pdf.display(), pages = images.len(), dpi, "rendered pages");
        Ok(images)
    }
}
