use std::path::PathBuf;
use std::time::Instant;

use super::App;
use crate::model::queue::FileState;
use crate::tui_event::BackendCommand;

impl App {
    /// Queue `paths`, skipping any already in the list. Returns how many were added.
    pub fn add_files(&mut self, paths: Vec<PathBuf>) -> usize {
        let mut added = 0;
        for path in paths {
            if self.files.iter().any(|f| f.path == path) {
                continue;
            }
            self.files.push(FileState::new(path));
            added += 1;
        }
        added
    }

    /// Send a start command to the backend. Ignored while a batch is running.
    pub fn start_processing(&mut self) {
        if self.processing {
            self.status_message = Some("Conversion is already running".into());
            return;
        }
        if self.files.is_empty() {
            self.status_message = Some("No files selected. Press o to add PDFs".into());
            return;
        }
        let Some(tx) = &self.backend_cmd_tx else {
            return;
        };

        for file in &mut self.files {
            file.reset();
        }
        let files: Vec<PathBuf> = self.files.iter().map(|f| f.path.clone()).collect();
        let command = BackendCommand::ProcessFiles {
            files,
            options: Box::new(self.settings.options.clone()),
            output_dir: self.settings.output_dir_path(),
        };
        if tx.send(command).is_err() {
            self.status_message = Some("Conversion backend is not running".into());
            return;
        }

        self.batch_files = (0..self.files.len()).collect();
        self.processing = true;
        self.cancel_requested = false;
        self.current_file = None;
        self.last_outcome = None;
        self.status_message = None;
        self.start_time = Some(Instant::now());
        self.frozen_elapsed = None;
    }

    /// Ask the running batch to stop after the current file.
    pub fn cancel_processing(&mut self) {
        if !self.processing {
            return;
        }
        self.request_cancel();
    }

    pub(super) fn request_cancel(&mut self) {
        if !self.processing || self.cancel_requested {
            return;
        }
        if let Some(tx) = &self.backend_cmd_tx {
            let _ = tx.send(BackendCommand::CancelProcessing);
        }
        self.cancel_requested = true;
    }
}
