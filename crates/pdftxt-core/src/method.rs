use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A text extraction method.
///
/// The order of [`Method::ALL`] is the order in which the fallback chain
/// tries alternates after the preferred method fails.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Full text layer through MuPDF. Handles the widest range of documents.
    Mupdf,
    /// Text layer with row reconstruction, so table cells on one baseline
    /// come out on one line.
    #[default]
    Layout,
    /// Pure-Rust text layer through lopdf. Fast, least accurate.
    Lopdf,
    /// Rasterize each page and run Tesseract over it. For scanned PDFs.
    Ocr,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Mupdf, Method::Layout, Method::Lopdf, Method::Ocr];

    /// Canonical lowercase name, as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mupdf => "mupdf",
            Self::Layout => "layout",
            Self::Lopdf => "lopdf",
            Self::Ocr => "ocr",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mupdf => "MuPDF",
            Self::Layout => "Layout",
            Self::Lopdf => "lopdf",
            Self::Ocr => "OCR",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Mupdf => "most robust text layer",
            Self::Layout => "recommended, keeps table rows together",
            Self::Lopdf => "fast, pure Rust",
            Self::Ocr => "image-based PDFs, slow",
        }
    }

    /// Methods other than `self`, in fallback order.
    pub fn alternates(self) -> impl Iterator<Item = Method> {
        Self::ALL.into_iter().filter(move |m| *m != self)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown extraction method '{0}' (expected one of: mupdf, layout, lopdf, ocr)")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mupdf" | "pymupdf" | "fitz" => Ok(Self::Mupdf),
            "layout" | "pdfplumber" | "plumber" => Ok(Self::Layout),
            "lopdf" | "pypdf2" | "fast" => Ok(Self::Lopdf),
            "ocr" | "tesseract" => Ok(Self::Ocr),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names_case_insensitively() {
        assert_eq!("MuPDF".parse::<Method>().unwrap(), Method::Mupdf);
        assert_eq!("layout".parse::<Method>().unwrap(), Method::Layout);
        assert_eq!(" LOPDF ".parse::<Method>().unwrap(), Method::Lopdf);
        assert_eq!("ocr".parse::<Method>().unwrap(), Method::Ocr);
    }

    #[test]
    fn parses_legacy_library_names() {
        assert_eq!("pymupdf".parse::<Method>().unwrap(), Method::Mupdf);
        assert_eq!("pdfplumber".parse::<Method>().unwrap(), Method::Layout);
        assert_eq!("pypdf2".parse::<Method>().unwrap(), Method::Lopdf);
    }

    #[test]
    fn unknown_method_is_an_error() {
        let err = "pdfminer".parse::<Method>().unwrap_err();
        assert!(err.to_string().contains("pdfminer"));
    }

    #[test]
    fn alternates_skip_self_and_keep_order() {
        let alts: Vec<_> = Method::Layout.alternates().collect();
        assert_eq!(alts, vec![Method::Mupdf, Method::Lopdf, Method::Ocr]);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for m in Method::ALL {
            assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
        }
    }
}
