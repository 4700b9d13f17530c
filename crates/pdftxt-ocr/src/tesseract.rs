use std::path::{Path, PathBuf};
use std::process::Command;

use crate::OcrError;

/// Install locations checked before falling back to `tesseract` on `PATH`.
pub const WELL_KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Pick the tesseract binary.
///
/// Precedence: `explicit`, then `env` (the `TESSERACT_PATH` value), then the
/// first existing [`WELL_KNOWN_PATHS`] entry, then plain `tesseract`.
/// Explicit and env paths are used even if they do not exist, so a typo
/// surfaces as a clear "not found" error rather than a silent fallback.
pub fn locate(
    explicit: Option<&Path>,
    env: Option<PathBuf>,
    exists: impl Fn(&Path) -> bool,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        return path;
    }
    WELL_KNOWN_PATHS
        .iter()
        .map(Path::new)
        .find(|p| exists(p))
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("tesseract"))
}

/// Arguments for one tesseract run writing recognised text to stdout.
///
/// `config` is a page-segmentation string such as
/// `--psm 6 -c preserve_interword_spaces=1`, split on whitespace.
pub fn args(image: &Path, language: &str, config: &str) -> Vec<String> {
    let mut args = vec![
        image.display().to_string(),
        "stdout".to_string(),
        "-l".to_string(),
        language.to_string(),
    ];
    args.extend(config.split_whitespace().map(str::to_string));
    args
}

/// A resolved tesseract executable.
#[derive(Debug, Clone)]
pub struct Tesseract {
    binary: PathBuf,
}

impl Tesseract {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether `tesseract --version` runs successfully.
    pub fn is_runnable(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    /// Recognise the text in `image`.
    pub fn recognize(&self, image: &Path, language: &str, config: &str) -> Result<String, OcrError> {
        let output = Command::new(&self.binary)
            .args(args(image, language, config))
            .output()
            .map_err(|e| OcrError::Spawn {
                tool: self.binary.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(OcrError::ToolFailed {
                tool: "tesseract".into(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
