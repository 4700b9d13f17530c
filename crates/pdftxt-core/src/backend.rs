use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::method::Method;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("the PDF is encrypted and needs a password")]
    Encrypted,
    #[error("the PDF has no pages")]
    NoPages,
    #[error("no text could be extracted (the PDF may be image-based or empty)")]
    NoText,
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("{0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors wrap one third-party library (or external tool) and return
/// the text of each page. A page that yields nothing is returned as an empty
/// string and later replaced by [`page_marker`]; whole-document failures are
/// errors.
pub trait ExtractionBackend: Send + Sync {
    /// The method this backend implements.
    fn method(&self) -> Method;

    /// Whether the backend can run on this machine (external tools found, etc.).
    fn is_available(&self) -> bool {
        true
    }

    /// Extract the text of every page, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;

    /// Extract the full text content of a PDF file.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        assemble_pages(self.extract_pages(path)?, None)
    }
}

/// Renders PDF pages to image files for OCR.
///
/// Returns one image path per page, in page order, written inside `out_dir`.
pub trait PageRasterizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn rasterize(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, BackendError>;
}

/// Placeholder line for a page that produced no text.
pub fn page_marker(page_number: usize) -> String {
    format!("[Page {}: no extractable text - may be image-based]", page_number)
}

/// Join per-page texts into a document, replacing blank pages with a marker.
///
/// With a `separator`, it is placed on its own line between pages.
/// Returns [`BackendError::NoPages`] for an empty page list and
/// [`BackendError::NoText`] when every page is blank.
pub fn assemble_pages(pages: Vec<String>, separator: Option<&str>) -> Result<String, BackendError> {
    if pages.is_empty() {
        return Err(BackendError::NoPages);
    }
    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(BackendError::NoText);
    }

    let mut text = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0
            && let Some(sep) = separator
        {
            text.push_str(sep);
            text.push('\n');
        }
        if page.trim().is_empty() {
            text.push_str(&page_marker(i + 1));
        } else {
            text.push_str(page.trim_end_matches('\n'));
        }
        text.push('\n');
    }
    Ok(text)
}

/// Set of registered backends, one per [`Method`].
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: BTreeMap<Method, Arc<dyn ExtractionBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend, replacing any previous one for the same method.
    pub fn register(&mut self, backend: Arc<dyn ExtractionBackend>) {
        self.backends.insert(backend.method(), backend);
    }

    pub fn with(mut self, backend: Arc<dyn ExtractionBackend>) -> Self {
        self.register(backend);
        self
    }

    pub fn get(&self, method: Method) -> Option<&Arc<dyn ExtractionBackend>> {
        self.backends.get(&method)
    }

    pub fn is_available(&self, method: Method) -> bool {
        self.get(method).is_some_and(|b| b.is_available())
    }

    /// Methods that are registered and usable, in fallback order.
    pub fn available_methods(&self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| self.is_available(*m))
            .collect()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("methods", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}
