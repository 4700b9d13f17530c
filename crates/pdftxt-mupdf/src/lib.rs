use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use pdftxt_core::cleanup::expand_ligatures;
use pdftxt_core::{BackendError, ExtractionBackend, Method};

mod layout;
mod render;

pub use layout::LayoutBackend;
pub use render::MupdfRasterizer;

/// MuPDF-based text-layer backend.
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the rest of the workspace does not
/// transitively depend on it.
///
/// Text is read block by block, line by line. A page that comes back blank
/// is read a second time with whitespace and ligatures preserved, which
/// recovers text from some PDFs with unusual font setups.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionBackend for MupdfBackend {
    fn method(&self) -> Method {
        Method::Mupdf
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let document = open_document(path)?;
        let mut pages_text = Vec::new();

        for (index, page) in pages(&document)?.into_iter().enumerate() {
            let mut text = page_text(&page, TextPageFlags::empty())?;
            if text.trim().is_empty() {
                tracing::debug!(page = index + 1, "blank page, retrying with preserved spans");
                text = page_text(
                    &page,
                    TextPageFlags::PRESERVE_WHITESPACE | TextPageFlags::PRESERVE_LIGATURES,
                )?;
            }
            pages_text.push(expand_ligatures(&text));
        }

        Ok(pages_text)
    }
}

fn mupdf_err(e: mupdf::Error) -> BackendError {
    BackendError::ExtractionError(e.to_string())
}

/// Open a document, rejecting password-protected files.
pub(crate) fn open_document(path: &Path) -> Result<Document, BackendError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

    let document = Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;
    if document.needs_password().map_err(mupdf_err)? {
        return Err(BackendError::Encrypted);
    }
    Ok(document)
}

/// All pages of `document`, in order. Zero pages is an error.
pub(crate) fn pages(document: &Document) -> Result<Vec<Page>, BackendError> {
    let pages = document
        .pages()
        .map_err(mupdf_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(mupdf_err)?;
    if pages.is_empty() {
        return Err(BackendError::NoPages);
    }
    Ok(pages)
}

fn page_text(page: &Page, flags: TextPageFlags) -> Result<String, BackendError> {
    let text_page = page.to_text_page(flags).map_err(mupdf_err)?;

    let mut page_text = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let line_text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            page_text.push_str(&line_text);
            page_text.push('\n');
        }
    }
    Ok(page_text)
}
