use pdftxt_core::config_file;

use super::{App, InputMode, Screen};
use crate::action::Action;
use crate::model::settings::SettingsItem;
use crate::theme::Theme;

impl App {
    /// Handle input while on the settings screen.
    pub(super) fn handle_settings_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.confirm_quit = true;
            }
            Action::NavigateBack => {
                self.screen = self.settings.prev_screen.take().unwrap_or(Screen::Queue);
            }
            Action::MoveDown => {
                let max = SettingsItem::ALL.len() - 1;
                if self.settings.cursor < max {
                    self.settings.cursor += 1;
                }
            }
            Action::MoveUp => {
                self.settings.cursor = self.settings.cursor.saturating_sub(1);
            }
            Action::GoTop => {
                self.settings.cursor = 0;
            }
            Action::GoBottom => {
                self.settings.cursor = SettingsItem::ALL.len() - 1;
            }
            Action::DrillIn => {
                if self.settings.current_item().is_text() {
                    self.settings.start_editing();
                    self.input_mode = InputMode::TextInput;
                } else {
                    self.cycle_setting();
                }
            }
            Action::ToggleSelect => self.cycle_setting(),
            Action::Clear => self.settings.clear_current(),
            Action::SaveConfig => self.save_config(),
            Action::StartProcessing => self.start_processing(),
            Action::CancelProcessing => self.cancel_processing(),
            Action::ToggleHelp => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn cycle_setting(&mut self) {
        self.settings.cycle_current();
        if self.settings.current_item() == SettingsItem::Theme {
            self.theme = Theme::named(&self.settings.theme_name);
        }
    }

    /// Write the settings changed on this screen to the platform config file.
    pub(super) fn save_config(&mut self) {
        match config_file::update_config(self.settings.config_overlay()) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "settings saved");
                self.settings.mark_saved();
                self.status_message = Some(format!("Settings saved to {}", path.display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "saving settings failed");
                self.status_message = Some(format!("Failed to save settings: {}", e));
            }
        }
    }
}
