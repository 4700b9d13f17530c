//! OCR backend: render each page to an image, clean it up, and run
//! Tesseract over it.
//!
//! Rendering goes through poppler's `pdftoppm` first and, when that is
//! missing or fails, through an optional in-process [`PageRasterizer`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;

use pdftxt_core::cleanup::{clean_ocr_page, correct_spacing};
use pdftxt_core::{BackendError, ExtractionBackend, Method, OcrSettings, PageRasterizer};

pub mod pdftoppm;
pub mod preprocess;
pub mod tesseract;

use pdftoppm::{ImageKind, Pdftoppm};
use tesseract::Tesseract;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<OcrError> for BackendError {
    fn from(e: OcrError) -> Self {
        match e {
            OcrError::Io(e) => BackendError::Io(e),
            other => BackendError::ExtractionError(other.to_string()),
        }
    }
}

/// Resolution for the in-process renderer: a 3x zoom of the 72 dpi page.
pub const IN_PROCESS_RENDER_DPI: u32 = 216;

/// Header line for a page that OCR produced text for.
pub fn page_header(page_number: usize) -> String {
    format!("[Page {}]", page_number)
}

/// Marker for a page where every Tesseract configuration came back empty.
pub fn unreadable_page_marker(page_number: usize) -> String {
    format!("[Page {}: OCR could not extract text]", page_number)
}

/// Format one OCR'd page from its cleaned lines.
pub fn format_page(page_number: usize, lines: &[String]) -> String {
    if lines.is_empty() {
        return unreadable_page_marker(page_number);
    }
    let mut text = page_header(page_number);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    text.push('\n');
    text
}

/// Tesseract-based [`ExtractionBackend`] for scanned, image-only PDFs.
pub struct OcrBackend {
    settings: OcrSettings,
    tesseract: Tesseract,
    fallback_rasterizer: Option<Arc<dyn PageRasterizer>>,
    available: OnceCell<bool>,
}

impl OcrBackend {
    pub fn new(settings: OcrSettings) -> Self {
        let binary = tesseract::locate(
            settings.tesseract_path.as_deref(),
            std::env::var_os("TESSERACT_PATH").map(PathBuf::from),
            Path::exists,
        );
        tracing::debug!(tesseract = %binary.display(), "resolved tesseract binary");
        Self {
            settings,
            tesseract: Tesseract::new(binary),
            fallback_rasterizer: None,
            available: OnceCell::new(),
        }
    }

    /// Renderer used when both `pdftoppm` attempts fail.
    pub fn with_fallback_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.fallback_rasterizer = Some(rasterizer);
        self
    }

    pub fn settings(&self) -> &OcrSettings {
        &self.settings
    }

    pub fn tesseract_binary(&self) -> &Path {
        self.tesseract.binary()
    }

    /// Rendering attempts in order: pdftoppm JPEG at `dpi`, pdftoppm PNG at
    /// `fallback_dpi`, then the fallback rasterizer at
    /// [`IN_PROCESS_RENDER_DPI`].
    fn rasterization_plan(&self) -> Vec<(Arc<dyn PageRasterizer>, u32)> {
        let mut plan: Vec<(Arc<dyn PageRasterizer>, u32)> = vec![
            (Arc::new(Pdftoppm::new(ImageKind::Jpeg)), self.settings.dpi),
            (
                Arc::new(Pdftoppm::new(ImageKind::Png)),
                self.settings.fallback_dpi,
            ),
        ];
        if let Some(fallback) = &self.fallback_rasterizer {
            plan.push((fallback.clone(), IN_PROCESS_RENDER_DPI));
        }
        plan
    }

    /// Render every page, trying each renderer in turn. The returned temp
    /// dir owns the images.
    fn render(&self, pdf: &Path) -> Result<(tempfile::TempDir, Vec<PathBuf>), BackendError> {
        let mut errors = Vec::new();

        for (rasterizer, dpi) in self.rasterization_plan() {
            let dir = tempfile::Builder::new().prefix("pdftxt-ocr-").tempdir()?;
            match rasterizer.rasterize(pdf, dpi, dir.path()) {
                Ok(images) if !images.is_empty() => {
                    tracing::debug!(renderer = rasterizer.name(), dpi, pages = images.len(), "pages rendered");
                    return Ok((dir, images));
                }
                Ok(_) => errors.push(format!("{}: produced no images", rasterizer.name())),
                Err(BackendError::Encrypted) => return Err(BackendError::Encrypted),
                Err(e) => {
                    tracing::warn!(renderer = rasterizer.name(), dpi, error = %e, "page rendering failed");
                    errors.push(format!("{}: {}", rasterizer.name(), e));
                }
            }
        }

        Err(BackendError::ExtractionError(format!(
            "could not render pages for OCR ({})",
            errors.join("; ")
        )))
    }

    /// OCR one rendered page, trying each configuration until one yields text.
    ///
    /// A page where tesseract ran but read nothing is empty; a page where
    /// every run failed returns the last tesseract error.
    fn recognize_page(&self, image_path: &Path, scratch: &Path, page_number: usize) -> Result<Vec<String>, OcrError> {
        let page = image::open(image_path)?;
        let prepared = preprocess::preprocess(&page, self.settings.quality);
        let prepared_path = scratch.join(format!("prepared-{:04}.png", page_number));
        prepared.save(&prepared_path)?;

        let mut ran = false;
        let mut last_error = None;
        for config in self.settings.quality.tesseract_configs() {
            match self
                .tesseract
                .recognize(&prepared_path, &self.settings.language, config)
            {
                Ok(text) if !text.trim().is_empty() => {
                    return Ok(clean_ocr_page(&correct_spacing(&text)));
                }
                Ok(_) => ran = true,
                Err(e) => {
                    tracing::debug!(page = page_number, config, error = %e, "tesseract config failed");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if !ran => Err(e),
            _ => Ok(Vec::new()),
        }
    }
}

impl ExtractionBackend for OcrBackend {
    fn method(&self) -> Method {
        Method::Ocr
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let tesseract = self.tesseract.is_runnable();
            let renderer = self.fallback_rasterizer.is_some()
                || Pdftoppm::new(ImageKind::Png).is_available();
            if !tesseract {
                tracing::debug!(tesseract = %self.tesseract.binary().display(), "tesseract not runnable");
            }
            tesseract && renderer
        })
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let (scratch, images) = self.render(path)?;
        tracing::info!(
            path = %path.display(),
            pages = images.len(),
            language = %self.settings.language,
            quality = %self.settings.quality,
            "running OCR"
        );

        let mut pages = Vec::with_capacity(images.len());
        let mut any_text = false;
        let mut last_error = None;
        for (index, image_path) in images.iter().enumerate() {
            let page_number = index + 1;
            let lines = match self.recognize_page(image_path, scratch.path(), page_number) {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "OCR failed for page");
                    last_error = Some(e);
                    Vec::new()
                }
            };
            any_text |= !lines.is_empty();
            pages.push(format_page(page_number, &lines));
        }

        if !any_text {
            // Surface the tool's own complaint (missing language data, etc.)
            return Err(last_error.map_or(BackendError::NoText, BackendError::from));
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn page_formatting() {
        assert_eq!(
            format_page(3, &["Hello".to_string(), "World".to_string()]),
            "[Page 3]\nHello\nWorld\n"
        );
        assert_eq!(format_page(4, &[]), "[Page 4: OCR could not extract text]");
    }

    struct Failing(AtomicUsize);

    impl PageRasterizer for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn rasterize(&self, _pdf: &Path, _dpi: u32, _out: &Path) -> Result<Vec<PathBuf>, BackendError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(BackendError::ExtractionError("renderer exploded".into()))
        }
    }

    #[test]
    fn fallback_rasterizer_is_last_in_plan() {
        let failing = Arc::new(Failing(AtomicUsize::new(0)));
        let backend = OcrBackend::new(OcrSettings::default()).with_fallback_rasterizer(failing);
        let plan: Vec<_> = backend
            .rasterization_plan()
            .iter()
            .map(|(r, dpi)| (r.name(), *dpi))
            .collect();
        assert_eq!(
            plan,
            vec![
                ("pdftoppm (jpeg)", 300),
                ("pdftoppm (png)", 200),
                ("failing", 216)
            ]
        );
    }

    #[test]
    fn render_failure_lists_every_cause() {
        let failing = Arc::new(Failing(AtomicUsize::new(0)));
        let backend =
            OcrBackend::new(OcrSettings::default()).with_fallback_rasterizer(failing.clone());
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");

        let err = backend.extract_pages(&missing).unwrap_err().to_string();
        assert!(err.contains("could not render pages"));
        assert!(err.contains("renderer exploded"));
        assert_eq!(failing.0.load(Ordering::SeqCst), 1);
    }

    /// Renders a single blank page no matter what it is given.
    struct OnePage;

    impl PageRasterizer for OnePage {
        fn name(&self) -> &'static str {
            "one-page"
        }
        fn rasterize(&self, _pdf: &Path, _dpi: u32, out: &Path) -> Result<Vec<PathBuf>, BackendError> {
            let path = out.join("page-1.png");
            image::GrayImage::from_pixel(40, 20, image::Luma([255]))
                .save(&path)
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            Ok(vec![path])
        }
    }

    #[cfg(unix)]
    fn fake_tesseract(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn tesseract_failure_is_reported_instead_of_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let settings = OcrSettings {
            tesseract_path: Some(fake_tesseract(
                dir.path(),
                "echo 'Error opening data file kor.traineddata' >&2\nexit 1",
            )),
            ..Default::default()
        };
        let backend = OcrBackend::new(settings).with_fallback_rasterizer(Arc::new(OnePage));
        let pdf = dir.path().join("scan.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 placeholder").unwrap();

        let err = backend.extract_pages(&pdf).unwrap_err();
        assert!(!matches!(err, BackendError::NoText));
        assert!(err.to_string().contains("kor.traineddata"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn blank_recognition_is_still_no_text() {
        let dir = tempfile::tempdir().unwrap();
        let settings = OcrSettings {
            tesseract_path: Some(fake_tesseract(dir.path(), "echo '   '")),
            ..Default::default()
        };
        let backend = OcrBackend::new(settings).with_fallback_rasterizer(Arc::new(OnePage));
        let pdf = dir.path().join("blank.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 placeholder").unwrap();

        assert!(matches!(
            backend.extract_pages(&pdf).unwrap_err(),
            BackendError::NoText
        ));
    }

    #[test]
    fn explicit_tesseract_path_is_used() {
        let settings = OcrSettings {
            tesseract_path: Some(PathBuf::from("/nowhere/tesseract")),
            ..Default::default()
        };
        let backend = OcrBackend::new(settings);
        assert_eq!(backend.tesseract_binary(), Path::new("/nowhere/tesseract"));
        assert!(!backend.is_available());
    }
}
