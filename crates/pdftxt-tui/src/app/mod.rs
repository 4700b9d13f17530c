mod backend;
mod processing;
mod update;
mod update_file_picker;
mod update_settings;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use pdftxt_core::{ConvertOptions, Method};

use crate::model::queue::{BatchOutcome, FileState};
use crate::model::settings::SettingsState;
use crate::theme::Theme;
use crate::tui_event::BackendCommand;

/// Which screen is currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Queue,
    FilePicker,
    Settings,
}

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    TextInput,
}

/// State for the file picker screen.
#[derive(Debug, Clone)]
pub struct FilePickerState {
    /// Current directory being browsed.
    pub current_dir: PathBuf,
    /// Entries in the current directory (dirs first, then files).
    pub entries: Vec<FileEntry>,
    pub cursor: usize,
    /// Selected PDF files, in selection order.
    pub selected: Vec<PathBuf>,
}

/// A single entry in the file picker.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_pdf: bool,
}

impl FilePickerState {
    pub fn new() -> Self {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::at(current_dir)
    }

    pub fn at(dir: PathBuf) -> Self {
        let mut state = Self {
            current_dir: dir,
            entries: Vec::new(),
            cursor: 0,
            selected: Vec::new(),
        };
        state.refresh_entries();
        state
    }

    /// Refresh the entries list from the current directory.
    pub fn refresh_entries(&mut self) {
        let mut entries = Vec::new();

        if let Some(parent) = self.current_dir.parent() {
            entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
                is_pdf: false,
            });
        }

        match std::fs::read_dir(&self.current_dir) {
            Ok(read_dir) => {
                let mut dirs = Vec::new();
                let mut files = Vec::new();

                for entry in read_dir.flatten() {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().to_string();

                    // Skip hidden files/dirs
                    if name.starts_with('.') {
                        continue;
                    }

                    if path.is_dir() {
                        dirs.push(FileEntry {
                            name,
                            path,
                            is_dir: true,
                            is_pdf: false,
                        });
                    } else {
                        let is_pdf = path
                            .extension()
                            .and_then(|e| e.to_str())
                            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
                        files.push(FileEntry {
                            name,
                            path,
                            is_dir: false,
                            is_pdf,
                        });
                    }
                }

                dirs.sort_by_key(|a| a.name.to_lowercase());
                files.sort_by_key(|a| a.name.to_lowercase());

                entries.extend(dirs);
                entries.extend(files);
            }
            Err(e) => {
                tracing::warn!(dir = %self.current_dir.display(), error = %e, "cannot list directory");
            }
        }

        self.entries = entries;
        self.cursor = 0;
    }

    /// Toggle selection of the PDF under the cursor.
    pub fn toggle_selected(&mut self) {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_pdf
        {
            if let Some(pos) = self.selected.iter().position(|p| p == &entry.path) {
                self.selected.remove(pos);
            } else {
                self.selected.push(entry.path.clone());
            }
        }
    }

    /// Enter the directory at cursor, or return false if not a directory.
    pub fn enter_directory(&mut self) -> bool {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_dir
        {
            self.current_dir = entry.path.clone();
            self.refresh_entries();
            return true;
        }
        false
    }

    /// Folder the "select folder" action applies to: the directory under the
    /// cursor, or the one being browsed when the cursor is on a file or `..`.
    pub fn folder_under_cursor(&self) -> PathBuf {
        match self.entries.get(self.cursor) {
            Some(entry) if entry.is_dir && entry.name != ".." => entry.path.clone(),
            _ => self.current_dir.clone(),
        }
    }

    /// Add every PDF in `dir` (not recursive) to the selection. Returns how
    /// many were newly selected.
    pub fn select_folder(&mut self, dir: &Path) -> Result<usize, pdftxt_core::ConvertError> {
        let mut added = 0;
        for pdf in pdftxt_core::find_pdfs(dir, false)? {
            if !self.selected.contains(&pdf) {
                self.selected.push(pdf);
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selected.iter().any(|p| p == path)
    }
}

/// Main application state.
pub struct App {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub files: Vec<FileState>,
    pub queue_cursor: usize,
    pub file_picker: FilePickerState,
    pub settings: SettingsState,
    /// A batch has been sent to the backend and has not finished.
    pub processing: bool,
    pub cancel_requested: bool,
    /// Queue index of the file being converted.
    pub current_file: Option<usize>,
    /// Files sent with the running batch, indexed like its events.
    pub batch_files: Vec<usize>,
    pub last_outcome: Option<BatchOutcome>,
    /// Transient message shown on the status line.
    pub status_message: Option<String>,
    pub show_help: bool,
    pub confirm_quit: bool,
    pub should_quit: bool,
    pub tick: usize,
    pub visible_rows: usize,
    pub start_time: Option<Instant>,
    pub frozen_elapsed: Option<Duration>,
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
}

impl App {
    pub fn new(
        options: ConvertOptions,
        output_dir: Option<PathBuf>,
        theme_name: String,
        available: Vec<Method>,
    ) -> Self {
        Self {
            screen: Screen::Queue,
            input_mode: InputMode::Normal,
            theme: Theme::named(&theme_name),
            files: Vec::new(),
            queue_cursor: 0,
            file_picker: FilePickerState::new(),
            settings: SettingsState::new(options, output_dir, theme_name, available),
            processing: false,
            cancel_requested: false,
            current_file: None,
            batch_files: Vec::new(),
            last_outcome: None,
            status_message: None,
            show_help: false,
            confirm_quit: false,
            should_quit: false,
            tick: 0,
            visible_rows: 20,
            start_time: None,
            frozen_elapsed: None,
            backend_cmd_tx: None,
        }
    }

    /// Time spent on the current (or last) batch.
    pub fn elapsed(&self) -> Duration {
        if let Some(frozen) = self.frozen_elapsed {
            return frozen;
        }
        self.start_time.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// One-line summary of where conversion stands.
    pub fn status_line(&self) -> String {
        if self.processing {
            if self.cancel_requested {
                return "Cancelling after the current file...".to_string();
            }
            return match self.current_file.and_then(|i| self.files.get(i)) {
                Some(file) => format!("Converting: {}", file.filename),
                None => "Starting conversion...".to_string(),
            };
        }
        if let Some(msg) = &self.status_message {
            return msg.clone();
        }
        if let Some(outcome) = &self.last_outcome {
            return outcome.status_line();
        }
        if self.files.is_empty() {
            "No files selected. Press o to add PDFs".to_string()
        } else {
            format!(
                "{} file{} ready. Press r to start",
                self.files.len(),
                if self.files.len() == 1 { "" } else { "s" }
            )
        }
    }

    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        // File picker renders without the shared footer
        if self.screen == Screen::FilePicker {
            crate::view::file_picker::render_in(f, self, area);
            if self.show_help {
                crate::view::help::render(f, &self.theme);
            }
            if self.confirm_quit {
                crate::view::quit_confirm::render(f, &self.theme, self.processing);
            }
            return;
        }

        let footer_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(1),
            width: area.width,
            height: 1.min(area.height),
        };
        let body_area = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };

        match self.screen {
            Screen::Queue => crate::view::queue::render_in(f, self, body_area, footer_area),
            Screen::Settings => crate::view::settings::render_in(f, self, body_area, footer_area),
            Screen::FilePicker => {}
        }

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }

        if self.confirm_quit {
            crate::view::quit_confirm::render(f, &self.theme, self.processing);
        }
    }
}
