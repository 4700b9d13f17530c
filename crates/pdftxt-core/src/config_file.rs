use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConvertOptions, OcrQuality};
use crate::method::Method;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub ocr: Option<OcrConfig>,
    pub output: Option<OutputConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub method: Option<Method>,
    pub fallback: Option<bool>,
    pub write_failure_report: Option<bool>,
    pub page_separator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    pub language: Option<String>,
    pub quality: Option<OcrQuality>,
    pub dpi: Option<u32>,
    pub fallback_dpi: Option<u32>,
    pub tesseract_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Empty or absent means "next to each PDF".
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
    pub fps: Option<u32>,
}

/// Platform config directory path: `<config_dir>/pdftxt/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdftxt").join("config.toml"))
}

/// Load config by cascading CWD `.pdftxt.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdftxt.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Read one config file. Missing or malformed files yield `None`; the
/// latter is logged.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

fn pick<T: Clone>(overlay: Option<&T>, base: Option<&T>) -> Option<T> {
    overlay.or(base).cloned()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (be, oe) = (base.extraction.as_ref(), overlay.extraction.as_ref());
    let (bo, oo) = (base.ocr.as_ref(), overlay.ocr.as_ref());
    let (bout, oout) = (base.output.as_ref(), overlay.output.as_ref());
    let (bd, od) = (base.display.as_ref(), overlay.display.as_ref());

    ConfigFile {
        extraction: Some(ExtractionConfig {
            method: pick(
                oe.and_then(|e| e.method.as_ref()),
                be.and_then(|e| e.method.as_ref()),
            ),
            fallback: pick(
                oe.and_then(|e| e.fallback.as_ref()),
                be.and_then(|e| e.fallback.as_ref()),
            ),
            write_failure_report: pick(
                oe.and_then(|e| e.write_failure_report.as_ref()),
                be.and_then(|e| e.write_failure_report.as_ref()),
            ),
            page_separator: pick(
                oe.and_then(|e| e.page_separator.as_ref()),
                be.and_then(|e| e.page_separator.as_ref()),
            ),
        }),
        ocr: Some(OcrConfig {
            language: pick(
                oo.and_then(|o| o.language.as_ref()),
                bo.and_then(|o| o.language.as_ref()),
            ),
            quality: pick(
                oo.and_then(|o| o.quality.as_ref()),
                bo.and_then(|o| o.quality.as_ref()),
            ),
            dpi: pick(oo.and_then(|o| o.dpi.as_ref()), bo.and_then(|o| o.dpi.as_ref())),
            fallback_dpi: pick(
                oo.and_then(|o| o.fallback_dpi.as_ref()),
                bo.and_then(|o| o.fallback_dpi.as_ref()),
            ),
            tesseract_path: pick(
                oo.and_then(|o| o.tesseract_path.as_ref()),
                bo.and_then(|o| o.tesseract_path.as_ref()),
            ),
        }),
        output: Some(OutputConfig {
            dir: pick(
                oout.and_then(|o| o.dir.as_ref()),
                bout.and_then(|o| o.dir.as_ref()),
            ),
        }),
        display: Some(DisplayConfig {
            theme: pick(od.and_then(|d| d.theme.as_ref()), bd.and_then(|d| d.theme.as_ref())),
            fps: pick(od.and_then(|d| d.fps.as_ref()), bd.and_then(|d| d.fps.as_ref())),
        }),
    }
}

/// Merge `overlay` into the platform config file and write it back.
///
/// Values absent from `overlay` keep whatever the file already had, so keys
/// the caller does not manage (and values that only came from the
/// environment or `./.pdftxt.toml`) are neither lost nor copied in.
pub fn update_config(overlay: ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    update_file(&path, overlay)?;
    Ok(path)
}

/// [`update_config`] for an explicit path. A missing or malformed file is
/// treated as empty.
pub fn update_file(path: &Path, overlay: ConfigFile) -> Result<(), String> {
    let base = load_from_path(path).unwrap_or_default();
    save_to_path(&merge(base, overlay), path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))
}

/// Apply file values onto `opts`.
/// Only sets values that are `Some` in the file config (doesn't overwrite with defaults).
pub fn apply_to_options(file_cfg: &ConfigFile, opts: &mut ConvertOptions) {
    if let Some(ext) = &file_cfg.extraction {
        if let Some(method) = ext.method {
            opts.method = method;
        }
        if let Some(fallback) = ext.fallback {
            opts.fallback = fallback;
        }
        if let Some(report) = ext.write_failure_report {
            opts.write_failure_report = report;
        }
        if let Some(ref sep) = ext.page_separator {
            opts.page_separator = (!sep.is_empty()).then(|| sep.clone());
        }
    }
    if let Some(ocr) = &file_cfg.ocr {
        if let Some(ref lang) = ocr.language
            && !lang.trim().is_empty()
        {
            opts.ocr.language = lang.trim().to_string();
        }
        if let Some(quality) = ocr.quality {
            opts.ocr.quality = quality;
        }
        if let Some(dpi) = ocr.dpi {
            opts.ocr.dpi = dpi.clamp(72, 1200);
        }
        if let Some(dpi) = ocr.fallback_dpi {
            opts.ocr.fallback_dpi = dpi.clamp(72, 1200);
        }
        if let Some(ref path) = ocr.tesseract_path
            && !path.is_empty()
        {
            opts.ocr.tesseract_path = Some(PathBuf::from(path));
        }
    }
}

/// Apply `PDFTXT_METHOD`, `PDFTXT_OCR_LANG` and `TESSERACT_PATH` through `var`.
///
/// Invalid method names are logged and ignored.
pub fn apply_env_overrides(opts: &mut ConvertOptions, var: impl Fn(&str) -> Option<String>) {
    if let Some(value) = var("PDFTXT_METHOD") {
        match value.parse::<Method>() {
            Ok(method) => opts.method = method,
            Err(e) => tracing::warn!(error = %e, "ignoring PDFTXT_METHOD"),
        }
    }
    if let Some(lang) = var("PDFTXT_OCR_LANG").filter(|l| !l.trim().is_empty()) {
        opts.ocr.language = lang.trim().to_string();
    }
    if let Some(path) = var("TESSERACT_PATH").filter(|p| !p.is_empty()) {
        opts.ocr.tesseract_path = Some(PathBuf::from(path));
    }
}

/// Defaults, then the config files, then the process environment.
pub fn resolve_options() -> (ConvertOptions, ConfigFile) {
    let file_cfg = load_config();
    let mut opts = ConvertOptions::default();
    apply_to_options(&file_cfg, &mut opts);
    apply_env_overrides(&mut opts, |k| std::env::var(k).ok());
    (opts, file_cfg)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn partial_file_parses() {
        let cfg: ConfigFile = toml::from_str(
            r#"
            [extraction]
            method = "ocr"

            [ocr]
            quality = "fast"
            "#,
        )
        .unwrap();
        let mut opts = ConvertOptions::default();
        apply_to_options(&cfg, &mut opts);
        assert_eq!(opts.method, Method::Ocr);
        assert_eq!(opts.ocr.quality, OcrQuality::Fast);
        assert_eq!(opts.ocr.language, "kor+eng");
        assert!(opts.fallback);
    }

    #[test]
    fn overlay_wins_and_base_fills_gaps() {
        let base = ConfigFile {
            extraction: Some(ExtractionConfig {
                method: Some(Method::Mupdf),
                fallback: Some(false),
                ..Default::default()
            }),
            ocr: Some(OcrConfig {
                language: Some("eng".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            extraction: Some(ExtractionConfig {
                method: Some(Method::Lopdf),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = merge(base, overlay);
        let ext = merged.extraction.unwrap();
        assert_eq!(ext.method, Some(Method::Lopdf));
        assert_eq!(ext.fallback, Some(false));
        assert_eq!(merged.ocr.unwrap().language.as_deref(), Some("eng"));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("PDFTXT_METHOD", "pymupdf"),
            ("PDFTXT_OCR_LANG", "jpn"),
            ("TESSERACT_PATH", "/opt/tess/bin/tesseract"),
        ]
        .into_iter()
        .collect();

        let mut opts = ConvertOptions::default();
        apply_env_overrides(&mut opts, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(opts.method, Method::Mupdf);
        assert_eq!(opts.ocr.language, "jpn");
        assert_eq!(
            opts.ocr.tesseract_path,
            Some(PathBuf::from("/opt/tess/bin/tesseract"))
        );
    }

    #[test]
    fn bad_env_method_is_ignored() {
        let mut opts = ConvertOptions::default();
        apply_env_overrides(&mut opts, |k| {
            (k == "PDFTXT_METHOD").then(|| "nonsense".to_string())
        });
        assert_eq!(opts.method, Method::Layout);
    }

    #[test]
    fn update_keeps_keys_the_overlay_does_not_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"
            [extraction]
            method = "mupdf"
            page_separator = "----"

            [ocr]
            dpi = 400
            tesseract_path = "/opt/tess"

            [output]
            dir = "/srv/out"

            [display]
            fps = 30
            "#,
        )
        .unwrap();

        let overlay = ConfigFile {
            ocr: Some(OcrConfig {
                quality: Some(OcrQuality::Fast),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                dir: Some(String::new()),
            }),
            display: Some(DisplayConfig {
                theme: Some("modern".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        update_file(&path, overlay).unwrap();

        let saved = load_from_path(&path).unwrap();
        let ext = saved.extraction.unwrap();
        assert_eq!(ext.method, Some(Method::Mupdf));
        assert_eq!(ext.page_separator.as_deref(), Some("----"));
        let ocr = saved.ocr.unwrap();
        assert_eq!(ocr.quality, Some(OcrQuality::Fast));
        assert_eq!(ocr.dpi, Some(400));
        assert_eq!(ocr.tesseract_path.as_deref(), Some("/opt/tess"));
        assert_eq!(saved.output.unwrap().dir.as_deref(), Some(""));
        let display = saved.display.unwrap();
        assert_eq!(display.fps, Some(30));
        assert_eq!(display.theme.as_deref(), Some("modern"));
    }

    #[test]
    fn update_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdftxt").join("config.toml");
        let overlay = ConfigFile {
            extraction: Some(ExtractionConfig {
                fallback: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        update_file(&path, overlay).unwrap();

        let mut opts = ConvertOptions::default();
        apply_to_options(&load_from_path(&path).unwrap(), &mut opts);
        assert!(!opts.fallback);
        assert_eq!(opts.method, Method::Layout);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[extraction\nmethod = ").unwrap();
        assert!(load_from_path(&path).is_none());
    }
}
