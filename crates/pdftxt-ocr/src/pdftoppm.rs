use std::path::{Path, PathBuf};
use std::process::Command;

use pdftxt_core::{BackendError, PageRasterizer};

use crate::OcrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    fn flag(self) -> &'static str {
        match self {
            Self::Jpeg => "-jpeg",
            Self::Png => "-png",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Renders pages with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    binary: PathBuf,
    kind: ImageKind,
}

impl Pdftoppm {
    pub fn new(kind: ImageKind) -> Self {
        Self {
            binary: PathBuf::from("pdftoppm"),
            kind,
        }
    }

    /// Whether `pdftoppm -v` can be run.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    fn run(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        let output = Command::new(&self.binary)
            .arg("-r")
            .arg(dpi.to_string())
            .arg(self.kind.flag())
            .arg(pdf)
            .arg(out_dir.join("page"))
            .output()
            .map_err(|e| OcrError::Spawn {
                tool: "pdftoppm".into(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(OcrError::ToolFailed {
                tool: "pdftoppm".into(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(rendered_pages(out_dir, self.kind.extension())?)
    }
}

impl PageRasterizer for Pdftoppm {
    fn name(&self) -> &'static str {
        match self.kind {
            ImageKind::Jpeg => "pdftoppm (jpeg)",
            ImageKind::Png => "pdftoppm (png)",
        }
    }

    fn rasterize(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, BackendError> {
        Ok(self.run(pdf, dpi, out_dir)?)
    }
}

/// Files `page-*.<extension>` in `dir`, in page order.
///
/// pdftoppm zero-pads page numbers to a common width, so a lexical sort is
/// page order.
pub fn rendered_pages(dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension().is_some_and(|e| e == extension)
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("page-"))
        })
        .collect();
    pages.sort();
    Ok(pages)
}
