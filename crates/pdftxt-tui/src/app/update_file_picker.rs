use super::{App, Screen};
use crate::action::Action;

impl App {
    /// Handle input while on the file picker screen.
    pub(super) fn handle_file_picker_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.confirm_quit = true;
            }
            Action::NavigateBack => {
                // Add any selected files, go back to queue
                if !self.file_picker.selected.is_empty() {
                    self.add_files_from_picker();
                }
                self.screen = Screen::Queue;
            }
            Action::MoveDown => {
                let max = self.file_picker.entries.len().saturating_sub(1);
                if self.file_picker.cursor < max {
                    self.file_picker.cursor += 1;
                }
            }
            Action::MoveUp => {
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(1);
            }
            Action::PageDown => {
                let page = self.visible_rows.max(1);
                let max = self.file_picker.entries.len().saturating_sub(1);
                self.file_picker.cursor = (self.file_picker.cursor + page).min(max);
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1);
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(page);
            }
            Action::GoTop => {
                self.file_picker.cursor = 0;
            }
            Action::GoBottom => {
                self.file_picker.cursor = self.file_picker.entries.len().saturating_sub(1);
            }
            Action::ToggleSelect => {
                self.file_picker.toggle_selected();
            }
            Action::DrillIn => {
                // Enter on directory opens it, on file toggles selection
                if !self.file_picker.enter_directory() {
                    self.file_picker.toggle_selected();
                }
            }
            Action::SelectFolder => {
                let dir = self.file_picker.folder_under_cursor();
                match self.file_picker.select_folder(&dir) {
                    Ok(0) => {
                        self.status_message =
                            Some(format!("No new PDF files in {}", dir.display()));
                    }
                    Ok(n) => {
                        self.status_message =
                            Some(format!("Selected {} PDF file(s) from {}", n, dir.display()));
                    }
                    Err(e) => {
                        tracing::warn!(dir = %dir.display(), error = %e, "folder selection failed");
                        self.status_message = Some(e.to_string());
                    }
                }
            }
            Action::Clear => {
                self.file_picker.selected.clear();
            }
            Action::OpenSettings => self.open_settings(),
            Action::ToggleHelp => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Move the picker's selection into the queue, skipping files already queued.
    pub(super) fn add_files_from_picker(&mut self) {
        let selected = std::mem::take(&mut self.file_picker.selected);
        let added = self.add_files(selected);
        self.status_message = Some(format!("Added {} file(s)", added));
    }
}
