use std::path::PathBuf;

use pdftxt_core::{BatchEvent, ConversionReport, ConvertOptions, Method};

/// Commands sent from the TUI to the backend.
#[derive(Debug)]
pub enum BackendCommand {
    /// Convert `files` in order. Event indices refer to positions in `files`.
    ProcessFiles {
        files: Vec<PathBuf>,
        options: Box<ConvertOptions>,
        output_dir: Option<PathBuf>,
    },
    /// Stop the running batch after the current file.
    CancelProcessing,
}

/// Events flowing from the conversion task to the TUI.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    FileStarted {
        index: usize,
    },
    /// A method is being tried for the file at `index`.
    Attempt {
        index: usize,
        method: Method,
    },
    FileFinished {
        index: usize,
        report: Box<ConversionReport>,
    },
    BatchComplete {
        succeeded: usize,
        total: usize,
        cancelled: bool,
    },
    /// The batch could not run at all (e.g. the output folder could not be created).
    BatchFailed {
        error: String,
    },
}

impl From<BatchEvent> for BackendEvent {
    fn from(event: BatchEvent) -> Self {
        match event {
            BatchEvent::FileStarted { index, .. } => Self::FileStarted { index },
            BatchEvent::Attempt { index, method } => Self::Attempt { index, method },
            BatchEvent::FileFinished { index, report, .. } => Self::FileFinished { index, report },
            BatchEvent::Complete {
                succeeded,
                total,
                cancelled,
            } => Self::BatchComplete {
                succeeded,
                total,
                cancelled,
            },
        }
    }
}
