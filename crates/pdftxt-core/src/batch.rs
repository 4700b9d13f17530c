use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::backend::BackendRegistry;
use crate::config::ConvertOptions;
use crate::convert::{
    ConversionReport, ConversionStatus, ConvertError, convert_file_with, default_output_path,
};
use crate::method::Method;

/// Progress events emitted by [`convert_batch`].
#[derive(Debug, Clone)]
pub enum BatchEvent {
    FileStarted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    /// A method is about to be tried for the current file.
    Attempt { index: usize, method: Method },
    FileFinished {
        index: usize,
        total: usize,
        report: Box<ConversionReport>,
    },
    Complete {
        succeeded: usize,
        total: usize,
        cancelled: bool,
    },
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// True when the batch stopped early; files after the last report were skipped.
    pub cancelled: bool,
    pub reports: Vec<ConversionReport>,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// PDF files in `dir`, sorted by path. Subdirectories are walked when
/// `recursive` is set.
///
/// Symlinked directories are not followed, so link loops cannot repeat a
/// file; symlinks to PDF files are kept. Unreadable entries are skipped
/// with a warning.
pub fn find_pdfs(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, ConvertError> {
    if !dir.is_dir() {
        return Err(ConvertError::InputNotFound(dir.to_path_buf()));
    }

    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut found = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let is_file =
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && is_pdf(entry.path()) {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

/// Where `pdf`'s text goes in a batch.
///
/// With both an `input_root` and an `output_dir`, the PDF's folders below
/// the root are mirrored under `output_dir`: `root/a/x.pdf` becomes
/// `output_dir/a/x.txt`. Otherwise this is [`default_output_path`].
pub fn batch_output_path(
    pdf: &Path,
    input_root: Option<&Path>,
    output_dir: Option<&Path>,
) -> PathBuf {
    let relative = input_root.and_then(|root| pdf.parent()?.strip_prefix(root).ok());
    match (output_dir, relative) {
        (Some(dir), Some(rel)) => default_output_path(pdf, Some(&dir.join(rel))),
        _ => default_output_path(pdf, output_dir),
    }
}

fn failed_report(pdf: &Path, output: &Path, error: String) -> ConversionReport {
    ConversionReport {
        input: pdf.to_path_buf(),
        output: output.to_path_buf(),
        status: ConversionStatus::Failed {
            error,
            attempts: Vec::new(),
            report_written: false,
        },
    }
}

fn create_parent(output: &Path) -> Result<(), ConvertError> {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| ConvertError::Write {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Convert `inputs` in order, writing `<stem>.txt` files into `output_dir`
/// (or next to each PDF).
///
/// Output paths come from [`batch_output_path`], so passing the folder the
/// inputs were found in as `input_root` keeps same-named PDFs from different
/// subfolders apart. A PDF whose output path was already written earlier in
/// the batch is reported as failed and nothing is overwritten.
///
/// The output directory is created if missing. Per-file errors are recorded
/// as failed reports; only failing to create the output directory aborts
/// the batch.
pub fn convert_batch(
    registry: &BackendRegistry,
    options: &ConvertOptions,
    inputs: &[PathBuf],
    input_root: Option<&Path>,
    output_dir: Option<&Path>,
    cancel: &CancellationToken,
    mut progress: impl FnMut(BatchEvent),
) -> Result<BatchSummary, ConvertError> {
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir).map_err(|source| ConvertError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let total = inputs.len();
    let mut summary = BatchSummary {
        total,
        ..Default::default()
    };
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

    for (index, pdf) in inputs.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(done = index, total, "batch cancelled");
            summary.cancelled = true;
            break;
        }

        progress(BatchEvent::FileStarted {
            index,
            total,
            path: pdf.clone(),
        });

        let output = batch_output_path(pdf, input_root, output_dir);
        let report = if let Some(earlier) = claimed.get(&output) {
            tracing::warn!(
                input = %pdf.display(),
                output = %output.display(),
                earlier = %earlier.display(),
                "output name collision"
            );
            failed_report(
                pdf,
                &output,
                format!(
                    "{} is already the output of {}",
                    output.display(),
                    earlier.display()
                ),
            )
        } else {
            claimed.insert(output.clone(), pdf);
            let converted = match output_dir {
                Some(_) => create_parent(&output),
                None => Ok(()),
            }
            .and_then(|()| {
                convert_file_with(registry, options, pdf, &output, |method| {
                    progress(BatchEvent::Attempt { index, method })
                })
            });
            converted.unwrap_or_else(|e| failed_report(pdf, &output, e.to_string()))
        };

        if report.is_success() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        progress(BatchEvent::FileFinished {
            index,
            total,
            report: Box::new(report.clone()),
        });
        summary.reports.push(report);
    }

    progress(BatchEvent::Complete {
        succeeded: summary.succeeded,
        total,
        cancelled: summary.cancelled,
    });
    Ok(summary)
}
