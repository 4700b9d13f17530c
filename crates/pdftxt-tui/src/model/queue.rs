use std::path::PathBuf;

use pdftxt_core::{ConversionReport, ConversionStatus, Method};

/// Conversion phase of a file in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePhase {
    Queued,
    Converting,
    Done,
    Failed,
}

impl FilePhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::Converting => "Converting...",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// State of a single PDF in the queue.
#[derive(Debug, Clone)]
pub struct FileState {
    pub path: PathBuf,
    pub filename: String,
    pub phase: FilePhase,
    /// Method currently being tried, then the one that succeeded.
    pub method: Option<Method>,
    pub fell_back: bool,
    pub chars: usize,
    pub output: Option<PathBuf>,
    pub error: Option<String>,
}

impl FileState {
    pub fn new(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            filename,
            phase: FilePhase::Queued,
            method: None,
            fell_back: false,
            chars: 0,
            output: None,
            error: None,
        }
    }

    /// Back to `Queued` before a new run.
    pub fn reset(&mut self) {
        self.phase = FilePhase::Queued;
        self.method = None;
        self.fell_back = false;
        self.chars = 0;
        self.output = None;
        self.error = None;
    }

    pub fn apply_report(&mut self, report: &ConversionReport) {
        self.output = Some(report.output.clone());
        match &report.status {
            ConversionStatus::Converted {
                method,
                chars,
                fell_back,
            } => {
                self.phase = FilePhase::Done;
                self.method = Some(*method);
                self.chars = *chars;
                self.fell_back = *fell_back;
                self.error = None;
            }
            ConversionStatus::Failed { error, .. } => {
                self.phase = FilePhase::Failed;
                self.method = None;
                self.error = Some(error.clone());
            }
        }
    }
}

/// Outcome of the last finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub total: usize,
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn status_line(&self) -> String {
        if self.cancelled {
            format!(
                "Conversion cancelled: {}/{} converted",
                self.succeeded, self.total
            )
        } else if self.succeeded == self.total {
            format!(
                "All conversions complete ({}/{})",
                self.succeeded, self.total
            )
        } else {
            format!(
                "Conversion complete: {}/{} (some failed)",
                self.succeeded, self.total
            )
        }
    }
}
