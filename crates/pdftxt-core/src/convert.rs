use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::BackendRegistry;
use crate::config::ConvertOptions;
use crate::fallback::{Attempt, extract_with_fallback};
use crate::method::Method;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of converting one PDF.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionStatus {
    Converted {
        method: Method,
        chars: usize,
        fell_back: bool,
    },
    Failed {
        /// Headline error (the last attempt's).
        error: String,
        attempts: Vec<Attempt>,
        /// Whether an explanatory report was written to the output path.
        report_written: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: ConversionStatus,
}

impl ConversionReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ConversionStatus::Converted { .. })
    }
}

/// `<stem>.txt` inside `output_dir`, or next to the PDF when `None`.
pub fn default_output_path(pdf: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    let mut name = stem;
    name.push(".txt");

    match output_dir {
        Some(dir) => dir.join(name),
        None => pdf.with_file_name(name),
    }
}

/// Text written in place of the output when every method fails.
pub fn failure_report(pdf: &Path, error: &str, ocr_available: bool) -> String {
    let mut report = String::new();
    report.push_str("PDF text extraction failed\n");
    report.push_str(&format!("File: {}\n", pdf.display()));
    report.push_str(&format!("Error: {}\n", error));
    report.push_str("\nThis file may be one of the following:\n");
    report.push_str("- an image-based (scanned) PDF: try the OCR method\n");
    report.push_str("- an encrypted PDF that needs a password\n");
    report.push_str("- a damaged PDF file\n");
    report.push_str("- a document with an unusual format or complex layout\n");
    report.push_str("- a PDF whose fonts are not embedded\n");
    if ocr_available {
        report.push_str("\n* For image-based PDFs, select the 'ocr' method and try again.\n");
    } else {
        report.push_str("\n* OCR needs the Tesseract engine and poppler's pdftoppm on PATH\n");
        report.push_str("  (or set TESSERACT_PATH to the tesseract binary).\n");
    }
    report
}

/// Convert one PDF and write the result to `output`.
pub fn convert_file(
    registry: &BackendRegistry,
    options: &ConvertOptions,
    pdf: &Path,
    output: &Path,
) -> Result<ConversionReport, ConvertError> {
    convert_file_with(registry, options, pdf, output, |_| {})
}

/// Like [`convert_file`], calling `on_attempt` before each method is tried.
pub fn convert_file_with(
    registry: &BackendRegistry,
    options: &ConvertOptions,
    pdf: &Path,
    output: &Path,
    on_attempt: impl FnMut(Method),
) -> Result<ConversionReport, ConvertError> {
    if !pdf.is_file() {
        return Err(ConvertError::InputNotFound(pdf.to_path_buf()));
    }

    let write = |contents: &str| {
        std::fs::write(output, contents).map_err(|source| ConvertError::Write {
            path: output.to_path_buf(),
            source,
        })
    };

    let status = match extract_with_fallback(registry, options, pdf, on_attempt) {
        Ok(extraction) => {
            write(&extraction.text)?;
            tracing::info!(
                input = %pdf.display(),
                output = %output.display(),
                method = %extraction.method,
                chars = extraction.text.chars().count(),
                "converted"
            );
            ConversionStatus::Converted {
                method: extraction.method,
                chars: extraction.text.chars().count(),
                fell_back: extraction.fell_back(),
            }
        }
        Err(e) => {
            let error = e
                .attempts()
                .last()
                .map(|a| a.error.clone())
                .unwrap_or_else(|| e.to_string());
            let report_written = if options.write_failure_report {
                let ocr_available = registry.is_available(Method::Ocr);
                write(&failure_report(pdf, &error, ocr_available))?;
                true
            } else {
                false
            };
            tracing::warn!(input = %pdf.display(), error = %error, "conversion failed");
            ConversionStatus::Failed {
                error,
                attempts: e.attempts().to_vec(),
                report_written,
            }
        }
    };

    Ok(ConversionReport {
        input: pdf.to_path_buf(),
        output: output.to_path_buf(),
        status,
    })
}
