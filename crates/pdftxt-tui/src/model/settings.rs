use std::path::PathBuf;

use pdftxt_core::config_file::{
    ConfigFile, DisplayConfig, ExtractionConfig, OcrConfig, OutputConfig,
};
use pdftxt_core::{ConvertOptions, LANGUAGE_PRESETS, Method, OcrQuality};

use crate::app::Screen;
use crate::theme::THEME_NAMES;

/// Rows on the settings screen, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsItem {
    Method,
    Fallback,
    Language,
    Quality,
    OutputDir,
    FailureReport,
    Theme,
}

impl SettingsItem {
    pub const ALL: [SettingsItem; 7] = [
        SettingsItem::Method,
        SettingsItem::Fallback,
        SettingsItem::Language,
        SettingsItem::Quality,
        SettingsItem::OutputDir,
        SettingsItem::FailureReport,
        SettingsItem::Theme,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Method => "Extraction Method",
            Self::Fallback => "Try Other Methods",
            Self::Language => "OCR Language",
            Self::Quality => "OCR Quality",
            Self::OutputDir => "Output Folder",
            Self::FailureReport => "Failure Report",
            Self::Theme => "Theme",
        }
    }

    /// Items whose value is typed rather than cycled.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Language | Self::OutputDir)
    }
}

/// Editable conversion settings, applied to the next batch.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub options: ConvertOptions,
    /// Empty means "next to each PDF".
    pub output_dir: String,
    pub theme_name: String,
    /// Methods whose backend can run on this machine.
    pub available: Vec<Method>,
    pub cursor: usize,
    pub editing: bool,
    pub edit_buffer: String,
    /// Unsaved changes since the last Ctrl+S.
    pub dirty: bool,
    /// Items changed on this screen; only these are written on save.
    pub edited: Vec<SettingsItem>,
    pub prev_screen: Option<Screen>,
}

impl SettingsState {
    pub fn new(
        options: ConvertOptions,
        output_dir: Option<PathBuf>,
        theme_name: String,
        available: Vec<Method>,
    ) -> Self {
        Self {
            options,
            output_dir: output_dir
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            theme_name,
            available,
            cursor: 0,
            editing: false,
            edit_buffer: String::new(),
            dirty: false,
            edited: Vec::new(),
            prev_screen: None,
        }
    }

    pub fn current_item(&self) -> SettingsItem {
        SettingsItem::ALL[self.cursor.min(SettingsItem::ALL.len() - 1)]
    }

    pub fn output_dir_path(&self) -> Option<PathBuf> {
        let trimmed = self.output_dir.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    pub fn is_available(&self, method: Method) -> bool {
        self.available.contains(&method)
    }

    fn mark_edited(&mut self, item: SettingsItem) {
        if !self.edited.contains(&item) {
            self.edited.push(item);
        }
        self.dirty = true;
    }

    /// Config overlay holding just the edited items.
    pub fn config_overlay(&self) -> ConfigFile {
        let opts = &self.options;
        let mut extraction = ExtractionConfig::default();
        let mut ocr = OcrConfig::default();
        let mut output = OutputConfig::default();
        let mut display = DisplayConfig::default();

        for item in &self.edited {
            match item {
                SettingsItem::Method => extraction.method = Some(opts.method),
                SettingsItem::Fallback => extraction.fallback = Some(opts.fallback),
                SettingsItem::FailureReport => {
                    extraction.write_failure_report = Some(opts.write_failure_report)
                }
                SettingsItem::Language => ocr.language = Some(opts.ocr.language.clone()),
                SettingsItem::Quality => ocr.quality = Some(opts.ocr.quality),
                // Empty clears a saved folder
                SettingsItem::OutputDir => output.dir = Some(self.output_dir.trim().to_string()),
                SettingsItem::Theme => display.theme = Some(self.theme_name.clone()),
            }
        }

        ConfigFile {
            extraction: Some(extraction),
            ocr: Some(ocr),
            output: Some(output),
            display: Some(display),
        }
    }

    /// Forget edit tracking once the overlay has been written.
    pub fn mark_saved(&mut self) {
        self.edited.clear();
        self.dirty = false;
    }

    /// Advance the item under the cursor to its next value.
    pub fn cycle_current(&mut self) {
        let item = self.current_item();
        match item {
            SettingsItem::Method => self.cycle_method(),
            SettingsItem::Fallback => self.options.fallback = !self.options.fallback,
            SettingsItem::Language => self.cycle_language(),
            SettingsItem::Quality => {
                let idx = OcrQuality::ALL
                    .iter()
                    .position(|&q| q == self.options.ocr.quality)
                    .unwrap_or(0);
                self.options.ocr.quality = OcrQuality::ALL[(idx + 1) % OcrQuality::ALL.len()];
            }
            SettingsItem::OutputDir => return,
            SettingsItem::FailureReport => {
                self.options.write_failure_report = !self.options.write_failure_report
            }
            SettingsItem::Theme => {
                let idx = THEME_NAMES
                    .iter()
                    .position(|&n| n == self.theme_name)
                    .unwrap_or(0);
                self.theme_name = THEME_NAMES[(idx + 1) % THEME_NAMES.len()].to_string();
            }
        }
        self.mark_edited(item);
    }

    /// Next method among the available ones. Unavailable methods are never
    /// selected; with none available the choice stays put.
    fn cycle_method(&mut self) {
        let methods: Vec<Method> = Method::ALL
            .into_iter()
            .filter(|m| self.is_available(*m))
            .collect();
        if methods.is_empty() {
            return;
        }
        let next = match methods.iter().position(|&m| m == self.options.method) {
            Some(idx) => methods[(idx + 1) % methods.len()],
            None => methods[0],
        };
        self.options.method = next;
    }

    fn cycle_language(&mut self) {
        let next = match LANGUAGE_PRESETS
            .iter()
            .position(|(code, _)| *code == self.options.ocr.language)
        {
            Some(idx) => LANGUAGE_PRESETS[(idx + 1) % LANGUAGE_PRESETS.len()].0,
            None => LANGUAGE_PRESETS[0].0,
        };
        self.options.ocr.language = next.to_string();
    }

    /// Reset the item under the cursor to its default value.
    pub fn clear_current(&mut self) {
        let item = self.current_item();
        match item {
            SettingsItem::OutputDir => self.output_dir.clear(),
            SettingsItem::Language => {
                self.options.ocr.language = pdftxt_core::config::DEFAULT_OCR_LANGUAGE.to_string()
            }
            _ => return,
        }
        self.mark_edited(item);
    }

    pub fn start_editing(&mut self) {
        self.edit_buffer = match self.current_item() {
            SettingsItem::Language => self.options.ocr.language.clone(),
            SettingsItem::OutputDir => self.output_dir.clone(),
            _ => return,
        };
        self.editing = true;
    }

    /// Store the edit buffer into the item being edited. A blank language
    /// is ignored.
    pub fn commit_edit(&mut self) {
        let value = self.edit_buffer.trim().to_string();
        let item = self.current_item();
        match item {
            SettingsItem::Language if !value.is_empty() => {
                self.options.ocr.language = value;
                self.mark_edited(item);
            }
            SettingsItem::OutputDir => {
                self.output_dir = value;
                self.mark_edited(item);
            }
            _ => {}
        }
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    /// Display label for a language code: the preset name when there is one.
    pub fn language_label(code: &str) -> String {
        LANGUAGE_PRESETS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(c, label)| format!("{} ({})", label, c))
            .unwrap_or_else(|| code.to_string())
    }
}
