use std::path::Path;

use lopdf::Document;

use pdftxt_core::cleanup::{collapse_blank_lines, expand_ligatures, normalize_newlines};
use pdftxt_core::{BackendError, ExtractionBackend, Method};

/// Pure-Rust text-layer backend built on lopdf.
///
/// Fast and dependency-free, but lopdf only understands simple font
/// encodings, so it is the least accurate of the text-layer methods. A page
/// that fails to decode is logged and left blank rather than failing the
/// whole document.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ExtractionBackend for LopdfBackend {
    fn method(&self) -> Method {
        Method::Lopdf
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let doc = Document::load(path).map_err(|e| BackendError::OpenError(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(BackendError::Encrypted);
        }

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        if page_numbers.is_empty() {
            return Err(BackendError::NoPages);
        }

        let pages = page_numbers
            .into_iter()
            .map(|page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => clean_page_text(&text),
                Err(e) => {
                    tracing::warn!(path = %path.display(), page = page_num, error = %e, "page text extraction failed");
                    String::new()
                }
            })
            .collect();
        Ok(pages)
    }
}

/// Sparse pages come back from lopdf with long runs of blank lines.
fn clean_page_text(raw: &str) -> String {
    collapse_blank_lines(&expand_ligatures(&normalize_newlines(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_text_is_normalized() {
        assert_eq!(
            clean_page_text("Title\r\n\r\n  \r\n\r\n\u{FB01}rst entry\r\n"),
            "Title\n\nfirst entry\n"
        );
    }
}
