use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use pdftxt_core::{BackendRegistry, BatchSummary, ConversionReport, ConversionStatus, Method};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One-line result for a converted file.
pub fn conversion_line(report: &ConversionReport, color: ColorMode) -> String {
    let name = file_name(&report.input);
    match &report.status {
        ConversionStatus::Converted {
            method,
            chars,
            fell_back,
        } => {
            let via = if *fell_back {
                format!("{} (fallback)", method.label())
            } else {
                method.label().to_string()
            };
            let tag = if color.enabled() {
                "OK".green().bold().to_string()
            } else {
                "OK".to_string()
            };
            format!(
                "{} {} -> {} [{}, {} chars]",
                tag,
                name,
                report.output.display(),
                via,
                chars
            )
        }
        ConversionStatus::Failed {
            error,
            report_written,
            ..
        } => {
            let tag = if color.enabled() {
                "FAILED".red().bold().to_string()
            } else {
                "FAILED".to_string()
            };
            let mut line = format!("{} {}: {}", tag, name, error);
            if *report_written {
                line.push_str(&format!(" (details in {})", report.output.display()));
            }
            line
        }
    }
}

pub fn print_conversion(
    w: &mut dyn Write,
    report: &ConversionReport,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "{}", conversion_line(report, color))?;

    if let ConversionStatus::Failed { attempts, .. } = &report.status {
        if attempts.len() > 1 {
            for attempt in attempts {
                let line = format!("    {}: {}", attempt.method.label(), attempt.error);
                if color.enabled() {
                    writeln!(w, "{}", line.dimmed())?;
                } else {
                    writeln!(w, "{}", line)?;
                }
            }
        }
    }
    Ok(())
}

pub fn print_batch_header(
    w: &mut dyn Write,
    dir: &Path,
    count: usize,
    method: Method,
) -> std::io::Result<()> {
    writeln!(
        w,
        "Converting {} PDF file(s) in {} with {}",
        count,
        dir.display(),
        method.label()
    )?;
    writeln!(w, "{}", "-".repeat(50))
}

pub fn print_batch_summary(
    w: &mut dyn Write,
    summary: &BatchSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "{}", "-".repeat(50))?;
    let line = format!("Converted {}/{}", summary.succeeded, summary.total);
    if !color.enabled() {
        writeln!(w, "{}", line)?;
    } else if summary.all_succeeded() {
        writeln!(w, "{}", line.green().bold())?;
    } else {
        writeln!(w, "{}", line.yellow().bold())?;
    }

    if summary.failed > 0 {
        writeln!(w, "Failed:")?;
        for report in summary.reports.iter().filter(|r| !r.is_success()) {
            writeln!(w, "  {}", file_name(&report.input))?;
        }
    }
    if summary.cancelled {
        let skipped = summary.total - summary.reports.len();
        writeln!(w, "Cancelled: {} file(s) not converted", skipped)?;
    }
    Ok(())
}

pub fn print_methods(
    w: &mut dyn Write,
    registry: &BackendRegistry,
    default: Method,
    color: ColorMode,
) -> std::io::Result<()> {
    for method in Method::ALL {
        let available = registry.is_available(method);
        let status = match (available, color.enabled()) {
            (true, true) => "available".green().to_string(),
            (true, false) => "available".to_string(),
            (false, true) => "unavailable".red().to_string(),
            (false, false) => "unavailable".to_string(),
        };
        let marker = if method == default { "*" } else { " " };
        writeln!(
            w,
            "{} {:<7} {:<12} {}",
            marker,
            method.name(),
            status,
            method.description()
        )?;
    }
    writeln!(w)?;
    writeln!(w, "* default method")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pdftxt_core::Attempt;

    use super::*;

    fn report(status: ConversionStatus) -> ConversionReport {
        ConversionReport {
            input: PathBuf::from("/docs/paper.pdf"),
            output: PathBuf::from("/docs/paper.txt"),
            status,
        }
    }

    #[test]
    fn success_line_names_method() {
        let line = conversion_line(
            &report(ConversionStatus::Converted {
                method: Method::Mupdf,
                chars: 120,
                fell_back: true,
            }),
            ColorMode(false),
        );
        assert_eq!(line, "OK paper.pdf -> /docs/paper.txt [MuPDF (fallback), 120 chars]");
    }

    #[test]
    fn failure_lists_every_attempt() {
        let mut out = Vec::new();
        print_conversion(
            &mut out,
            &report(ConversionStatus::Failed {
                error: "no text".into(),
                attempts: vec![
                    Attempt {
                        method: Method::Layout,
                        error: "broken".into(),
                    },
                    Attempt {
                        method: Method::Ocr,
                        error: "no text".into(),
                    },
                ],
                report_written: true,
            }),
            ColorMode(false),
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("FAILED paper.pdf: no text (details in /docs/paper.txt)\n"));
        assert!(out.contains("    Layout: broken\n"));
        assert!(out.contains("    OCR: no text\n"));
    }

    #[test]
    fn summary_counts() {
        let summary = BatchSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
            cancelled: false,
            reports: vec![report(ConversionStatus::Failed {
                error: "x".into(),
                attempts: vec![],
                report_written: false,
            })],
        };
        let mut out = Vec::new();
        print_batch_summary(&mut out, &summary, ColorMode(false)).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Converted 2/3\n"));
        assert!(out.contains("Failed:\n  paper.pdf\n"));
    }
}
