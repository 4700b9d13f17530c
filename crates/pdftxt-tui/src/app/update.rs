use super::{App, InputMode, Screen};
use crate::action::Action;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        // Housekeeping that applies on every screen
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                return false;
            }
            Action::Resize(_w, h) => {
                self.visible_rows = (h as usize).saturating_sub(8);
                return false;
            }
            _ => {}
        }

        // Quit confirmation modal: q confirms, Esc cancels
        if self.confirm_quit {
            match action {
                Action::Quit => {
                    self.request_cancel();
                    self.should_quit = true;
                    return true;
                }
                Action::NavigateBack => {
                    self.confirm_quit = false;
                }
                _ => {}
            }
            return false;
        }

        if self.show_help {
            match action {
                Action::ToggleHelp | Action::NavigateBack => self.show_help = false,
                Action::Quit => self.confirm_quit = true,
                _ => {}
            }
            return false;
        }

        if self.input_mode == InputMode::TextInput {
            self.handle_text_input(action);
            return false;
        }

        match self.screen {
            Screen::Queue => self.handle_queue_action(action),
            Screen::FilePicker => self.handle_file_picker_action(action),
            Screen::Settings => self.handle_settings_action(action),
        }
        false
    }

    fn handle_text_input(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.confirm_quit = true;
            }
            Action::TextInput(ch) => self.settings.edit_buffer.push(ch),
            Action::TextBackspace => {
                self.settings.edit_buffer.pop();
            }
            Action::TextConfirm => {
                self.settings.commit_edit();
                self.input_mode = InputMode::Normal;
            }
            Action::TextCancel => {
                self.settings.cancel_edit();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_queue_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.confirm_quit = true;
            }
            Action::MoveDown => {
                let max = self.files.len().saturating_sub(1);
                if self.queue_cursor < max {
                    self.queue_cursor += 1;
                }
            }
            Action::MoveUp => {
                self.queue_cursor = self.queue_cursor.saturating_sub(1);
            }
            Action::PageDown => {
                let page = self.visible_rows.max(1);
                let max = self.files.len().saturating_sub(1);
                self.queue_cursor = (self.queue_cursor + page).min(max);
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1);
                self.queue_cursor = self.queue_cursor.saturating_sub(page);
            }
            Action::GoTop => {
                self.queue_cursor = 0;
            }
            Action::GoBottom => {
                self.queue_cursor = self.files.len().saturating_sub(1);
            }
            Action::AddFiles => {
                self.file_picker.selected.clear();
                self.screen = Screen::FilePicker;
            }
            Action::Clear => {
                if self.processing {
                    self.status_message = Some("Cannot clear the list while converting".into());
                } else {
                    self.files.clear();
                    self.queue_cursor = 0;
                    self.last_outcome = None;
                    self.status_message = None;
                }
            }
            Action::StartProcessing => self.start_processing(),
            Action::CancelProcessing => self.cancel_processing(),
            Action::OpenSettings => self.open_settings(),
            Action::SaveConfig => self.save_config(),
            Action::ToggleHelp => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    pub(super) fn open_settings(&mut self) {
        if self.screen != Screen::Settings {
            self.settings.prev_screen = Some(self.screen.clone());
        }
        self.screen = Screen::Settings;
    }
}
