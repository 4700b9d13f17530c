use super::App;
use crate::model::queue::{BatchOutcome, FilePhase};
use crate::tui_event::BackendEvent;

impl App {
    /// Process a backend event and update model state.
    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::FileStarted { index } => {
                let Some(queue_index) = self.batch_files.get(index).copied() else {
                    return;
                };
                self.current_file = Some(queue_index);
                if let Some(file) = self.files.get_mut(queue_index) {
                    file.phase = FilePhase::Converting;
                }
            }
            BackendEvent::Attempt { index, method } => {
                if let Some(file) = self
                    .batch_files
                    .get(index)
                    .and_then(|&i| self.files.get_mut(i))
                {
                    file.method = Some(method);
                }
            }
            BackendEvent::FileFinished { index, report } => {
                if let Some(file) = self
                    .batch_files
                    .get(index)
                    .and_then(|&i| self.files.get_mut(i))
                {
                    file.apply_report(&report);
                }
            }
            BackendEvent::BatchComplete {
                succeeded,
                total,
                cancelled,
            } => {
                self.finish_batch();
                self.last_outcome = Some(BatchOutcome {
                    succeeded,
                    total,
                    cancelled,
                });
            }
            BackendEvent::BatchFailed { error } => {
                self.finish_batch();
                self.status_message = Some(format!("Conversion failed: {}", error));
            }
        }
    }

    fn finish_batch(&mut self) {
        self.processing = false;
        self.cancel_requested = false;
        self.current_file = None;
        self.frozen_elapsed = self.start_time.map(|s| s.elapsed());
        // Files the batch never reached stay queued
        for file in &mut self.files {
            if file.phase == FilePhase::Converting {
                file.phase = FilePhase::Queued;
            }
        }
    }
}
