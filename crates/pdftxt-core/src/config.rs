use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::method::Method;

/// Tesseract language presets offered in the UI. Any `+`-joined list of
/// installed language codes is also accepted.
pub const LANGUAGE_PRESETS: [(&str, &str); 6] = [
    ("kor+eng", "Korean + English"),
    ("eng", "English"),
    ("kor", "Korean"),
    ("jpn", "Japanese"),
    ("chi_sim", "Chinese (simplified)"),
    ("chi_tra", "Chinese (traditional)"),
];

pub const DEFAULT_OCR_LANGUAGE: &str = "kor+eng";

/// Trade-off between OCR accuracy and speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrQuality {
    #[default]
    High,
    Standard,
    Fast,
}

impl OcrQuality {
    pub const ALL: [OcrQuality; 3] = [OcrQuality::High, OcrQuality::Standard, OcrQuality::Fast];

    pub fn name(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Standard => "standard",
            Self::Fast => "fast",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High (slow, accurate)",
            Self::Standard => "Standard",
            Self::Fast => "Fast",
        }
    }

    /// Images narrower than this are upscaled before OCR.
    pub fn target_width(self) -> Option<u32> {
        match self {
            Self::High => Some(2000),
            Self::Standard => Some(1500),
            Self::Fast => None,
        }
    }

    /// Contrast multiplier; 1.0 leaves the image unchanged.
    pub fn contrast(self) -> f32 {
        match self {
            Self::High => 1.5,
            Self::Standard => 1.2,
            Self::Fast => 1.0,
        }
    }

    pub fn sharpness(self) -> f32 {
        match self {
            Self::High => 1.3,
            Self::Standard => 1.1,
            Self::Fast => 1.0,
        }
    }

    pub fn brightness(self) -> f32 {
        match self {
            Self::High => 1.1,
            Self::Standard | Self::Fast => 1.0,
        }
    }

    /// Tesseract page-segmentation configs, tried in order until one yields text.
    pub fn tesseract_configs(self) -> &'static [&'static str] {
        match self {
            Self::High => &[
                "--psm 6 -c preserve_interword_spaces=1 -c textord_really_old_xheight=1",
                "--psm 4 -c preserve_interword_spaces=1 -c textord_really_old_xheight=1",
                "--psm 1 -c preserve_interword_spaces=1",
                "--psm 3 -c textord_really_old_xheight=1",
                "--psm 8 -c preserve_interword_spaces=1",
            ],
            Self::Standard => &[
                "--psm 6 -c preserve_interword_spaces=1",
                "--psm 4 -c preserve_interword_spaces=1",
                "--psm 3",
            ],
            Self::Fast => &["--psm 6"],
        }
    }
}

impl fmt::Display for OcrQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OcrQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "best" => Ok(Self::High),
            "standard" | "normal" => Ok(Self::Standard),
            "fast" => Ok(Self::Fast),
            other => Err(format!(
                "unknown OCR quality '{}' (expected high, standard or fast)",
                other
            )),
        }
    }
}

/// Settings for the OCR backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrSettings {
    /// Tesseract language list, e.g. `kor+eng`.
    pub language: String,
    pub quality: OcrQuality,
    /// Rasterization resolution for the first attempt.
    pub dpi: u32,
    /// Resolution for the retry when the first rasterization fails.
    pub fallback_dpi: u32,
    /// Explicit tesseract binary; discovered automatically when `None`.
    pub tesseract_path: Option<PathBuf>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_OCR_LANGUAGE.to_string(),
            quality: OcrQuality::default(),
            dpi: 300,
            fallback_dpi: 200,
            tesseract_path: None,
        }
    }
}

/// Options for a single conversion or a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub method: Method,
    /// Try the remaining methods when `method` fails.
    pub fallback: bool,
    /// Write an explanatory text file when every method fails.
    pub write_failure_report: bool,
    /// Inserted between pages when set.
    pub page_separator: Option<String>,
    pub ocr: OcrSettings,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            method: Method::default(),
            fallback: true,
            write_failure_report: true,
            page_separator: None,
            ocr: OcrSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ConvertOptions::default();
        assert_eq!(opts.method, Method::Layout);
        assert!(opts.fallback);
        assert!(opts.write_failure_report);
        assert_eq!(opts.ocr.language, "kor+eng");
        assert_eq!(opts.ocr.quality, OcrQuality::High);
        assert_eq!((opts.ocr.dpi, opts.ocr.fallback_dpi), (300, 200));
    }

    #[test]
    fn quality_configs_start_with_block_mode() {
        for q in OcrQuality::ALL {
            assert!(q.tesseract_configs()[0].starts_with("--psm 6"));
        }
        assert_eq!(OcrQuality::High.tesseract_configs().len(), 5);
        assert_eq!(OcrQuality::Fast.tesseract_configs(), &["--psm 6"]);
    }

    #[test]
    fn fast_quality_only_converts_to_grayscale() {
        let q = OcrQuality::Fast;
        assert_eq!(q.target_width(), None);
        assert_eq!((q.contrast(), q.sharpness(), q.brightness()), (1.0, 1.0, 1.0));
    }

    #[test]
    fn quality_parses() {
        assert_eq!("Standard".parse::<OcrQuality>().unwrap(), OcrQuality::Standard);
        assert!("ultra".parse::<OcrQuality>().is_err());
    }
}
