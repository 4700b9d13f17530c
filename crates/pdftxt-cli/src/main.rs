use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use pdftxt_core::config_file;
use pdftxt_core::{
    BackendRegistry, BatchEvent, ConvertError, ConvertOptions, Method, OcrQuality, OcrSettings,
    convert_batch, default_output_path, find_pdfs,
};
use pdftxt_lopdf::LopdfBackend;
use pdftxt_mupdf::{LayoutBackend, MupdfBackend, MupdfRasterizer};
use pdftxt_ocr::OcrBackend;

mod output;

use output::ColorMode;

/// pdftxt - Convert PDF documents to plain text
#[derive(Parser, Debug)]
#[command(name = "pdftxt", version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a single PDF file
    Convert {
        /// PDF file to convert
        pdf: PathBuf,

        /// Output .txt file or directory (default: next to the PDF)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Convert every PDF in a folder
    Batch {
        /// Folder containing PDF files
        dir: PathBuf,

        /// Folder for the .txt files (default: next to each PDF)
        output_dir: Option<PathBuf>,

        /// Include PDFs in subfolders
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// List extraction methods and whether they can run here
    Methods,

    /// Open the interactive terminal interface
    #[command(alias = "tui")]
    Gui,
}

#[derive(Args, Debug, Default, Clone)]
struct ExtractArgs {
    /// Extraction method: mupdf, layout, lopdf or ocr
    #[arg(short, long)]
    method: Option<Method>,

    /// Only try the chosen method
    #[arg(long)]
    no_fallback: bool,

    /// Do not write a failure report when every method fails
    #[arg(long)]
    no_report: bool,

    /// Line inserted between pages
    #[arg(long)]
    page_separator: Option<String>,

    /// OCR language(s), e.g. kor+eng, eng, jpn, chi_sim
    #[arg(long = "lang")]
    ocr_lang: Option<String>,

    /// OCR quality: high, standard or fast
    #[arg(long = "quality")]
    ocr_quality: Option<OcrQuality>,

    /// Rendering resolution for OCR
    #[arg(long)]
    dpi: Option<u32>,

    /// Path to the tesseract binary
    #[arg(long)]
    tesseract: Option<PathBuf>,
}

impl ExtractArgs {
    /// Apply flags over options resolved from config and environment.
    fn apply(&self, opts: &mut ConvertOptions) {
        if let Some(method) = self.method {
            opts.method = method;
        }
        if self.no_fallback {
            opts.fallback = false;
        }
        if self.no_report {
            opts.write_failure_report = false;
        }
        if let Some(ref sep) = self.page_separator {
            opts.page_separator = Some(sep.clone());
        }
        if let Some(ref lang) = self.ocr_lang {
            opts.ocr.language = lang.clone();
        }
        if let Some(quality) = self.ocr_quality {
            opts.ocr.quality = quality;
        }
        if let Some(dpi) = self.dpi {
            opts.ocr.dpi = dpi.clamp(72, 1200);
        }
        if let Some(ref path) = self.tesseract {
            opts.ocr.tesseract_path = Some(path.clone());
        }
    }
}

/// Every backend this build ships, with MuPDF as the OCR renderer of last resort.
fn build_registry(ocr: &OcrSettings) -> BackendRegistry {
    let ocr_backend = OcrBackend::new(ocr.clone())
        .with_fallback_rasterizer(Arc::new(MupdfRasterizer::new()));
    BackendRegistry::new()
        .with(Arc::new(MupdfBackend::new()))
        .with(Arc::new(LayoutBackend::new()))
        .with(Arc::new(LopdfBackend::new()))
        .with(Arc::new(ocr_backend))
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_options(extract: &ExtractArgs) -> ConvertOptions {
    // CLI flags > env vars > config file > defaults
    let (mut opts, _) = config_file::resolve_options();
    extract.apply(&mut opts);
    opts
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let color = ColorMode(!cli.no_color);

    match cli.command {
        Command::Convert {
            pdf,
            output,
            extract,
        } => convert(pdf, output, resolve_options(&extract), color).await,
        Command::Batch {
            dir,
            output_dir,
            recursive,
            extract,
        } => batch(dir, output_dir, recursive, resolve_options(&extract), color).await,
        Command::Methods => {
            let opts = resolve_options(&ExtractArgs::default());
            let registry = build_registry(&opts.ocr);
            output::print_methods(&mut std::io::stdout(), &registry, opts.method, color)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Gui => launch_tui(),
    }
}

/// Output file for `convert`: an existing directory gets `<stem>.txt` inside it.
fn output_for(pdf: &Path, output: Option<PathBuf>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => default_output_path(pdf, Some(&path)),
        Some(path) => path,
        None => default_output_path(pdf, None),
    }
}

/// Resolve the output path for an existing `pdf` and create its folder.
/// Nothing is created when the input is missing.
fn prepare_output(pdf: &Path, output: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if !pdf.is_file() {
        return Err(ConvertError::InputNotFound(pdf.to_path_buf()).into());
    }
    let out_path = output_for(pdf, output);
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(out_path)
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

async fn convert(
    pdf: PathBuf,
    output: Option<PathBuf>,
    opts: ConvertOptions,
    color: ColorMode,
) -> anyhow::Result<ExitCode> {
    let out_path = prepare_output(&pdf, output)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.enable_steady_tick(Duration::from_millis(120));

    let registry = build_registry(&opts.ocr);
    let report = tokio::task::spawn_blocking({
        let spinner = spinner.clone();
        let pdf = pdf.clone();
        move || {
            pdftxt_core::convert::convert_file_with(&registry, &opts, &pdf, &out_path, |method| {
                spinner.set_message(format!("Extracting with {}...", method.label()))
            })
        }
    })
    .await??;
    spinner.finish_and_clear();

    output::print_conversion(&mut std::io::stdout(), &report, color)?;
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn batch(
    dir: PathBuf,
    output_dir: Option<PathBuf>,
    recursive: bool,
    opts: ConvertOptions,
    color: ColorMode,
) -> anyhow::Result<ExitCode> {
    let pdfs = find_pdfs(&dir, recursive)?;
    let mut stdout = std::io::stdout();
    if pdfs.is_empty() {
        writeln!(stdout, "No PDF files found in {}", dir.display())?;
        return Ok(ExitCode::SUCCESS);
    }
    output::print_batch_header(&mut stdout, &dir, pdfs.len(), opts.method)?;

    let bar = ProgressBar::new(pdfs.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let cancel = CancellationToken::new();

    // Set up Ctrl+C handler
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let registry = build_registry(&opts.ocr);
    let summary = tokio::task::spawn_blocking({
        let bar = bar.clone();
        let root = dir.clone();
        move || {
            let mut current = String::new();
            convert_batch(
                &registry,
                &opts,
                &pdfs,
                Some(&root),
                output_dir.as_deref(),
                &cancel,
                |event| match event {
                    BatchEvent::FileStarted { path, .. } => {
                        current = path
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        bar.set_message(current.clone());
                    }
                    BatchEvent::Attempt { method, .. } => {
                        bar.set_message(format!("{} ({})", current, method.label()));
                    }
                    BatchEvent::FileFinished { report, .. } => {
                        bar.println(output::conversion_line(&report, color));
                        bar.inc(1);
                    }
                    BatchEvent::Complete { .. } => {}
                },
            )
        }
    })
    .await??;
    bar.finish_and_clear();

    output::print_batch_summary(&mut stdout, &summary, color)?;
    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `pdftxt-tui` next to this executable, else whatever is on `PATH`.
fn tui_binary() -> PathBuf {
    let name = format!("pdftxt-tui{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .filter(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}

fn launch_tui() -> anyhow::Result<ExitCode> {
    let binary = tui_binary();
    let status = std::process::Command::new(&binary)
        .status()
        .with_context(|| format!("failed to launch {}", binary.display()))?;
    Ok(if status.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_convert_with_legacy_method_name() {
        let cli = Cli::try_parse_from([
            "pdftxt", "convert", "in.pdf", "-m", "pdfplumber", "-o", "out.txt", "--no-fallback",
        ])
        .unwrap();
        match cli.command {
            Command::Convert {
                pdf,
                output,
                extract,
            } => {
                assert_eq!(pdf, PathBuf::from("in.pdf"));
                assert_eq!(output, Some(PathBuf::from("out.txt")));
                assert_eq!(extract.method, Some(Method::Layout));
                assert!(extract.no_fallback);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_batch_with_output_dir_and_ocr_flags() {
        let cli = Cli::try_parse_from([
            "pdftxt", "batch", "scans", "texts", "-m", "ocr", "--lang", "eng", "--quality",
            "fast", "-r", "--no-color",
        ])
        .unwrap();
        assert!(cli.no_color);
        match cli.command {
            Command::Batch {
                dir,
                output_dir,
                recursive,
                extract,
            } => {
                assert_eq!(dir, PathBuf::from("scans"));
                assert_eq!(output_dir, Some(PathBuf::from("texts")));
                assert!(recursive);
                assert_eq!(extract.ocr_quality, Some(OcrQuality::Fast));
                assert_eq!(extract.ocr_lang.as_deref(), Some("eng"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(Cli::try_parse_from(["pdftxt", "convert", "a.pdf", "-m", "pdfminer"]).is_err());
    }

    #[test]
    fn no_arguments_shows_help() {
        assert!(Cli::try_parse_from(["pdftxt"]).is_err());
    }

    #[test]
    fn tui_is_an_alias_for_gui() {
        let cli = Cli::try_parse_from(["pdftxt", "tui"]).unwrap();
        assert!(matches!(cli.command, Command::Gui));
    }

    #[test]
    fn flags_override_resolved_options() {
        let args = ExtractArgs {
            method: Some(Method::Ocr),
            no_fallback: true,
            no_report: true,
            dpi: Some(5000),
            ..Default::default()
        };
        let mut opts = ConvertOptions::default();
        args.apply(&mut opts);
        assert_eq!(opts.method, Method::Ocr);
        assert!(!opts.fallback);
        assert!(!opts.write_failure_report);
        assert_eq!(opts.ocr.dpi, 1200);
    }

    #[test]
    fn output_dir_argument_gets_stem_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = output_for(Path::new("/docs/a.pdf"), Some(dir.path().to_path_buf()));
        assert_eq!(out, dir.path().join("a.txt"));
        assert_eq!(
            output_for(Path::new("/docs/a.pdf"), None),
            PathBuf::from("/docs/a.txt")
        );
    }

    #[test]
    fn missing_input_creates_no_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("new").join("a.txt");

        let err = prepare_output(&dir.path().join("gone.pdf"), Some(out)).unwrap_err();
        assert!(err.to_string().contains("input not found"));
        assert!(!dir.path().join("new").exists());
    }

    #[test]
    fn output_folder_is_created_for_existing_input() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        let out = dir.path().join("new").join("a.txt");

        assert_eq!(prepare_output(&pdf, Some(out.clone())).unwrap(), out);
        assert!(dir.path().join("new").is_dir());
    }

    #[test]
    fn registry_registers_every_method() {
        let registry = build_registry(&OcrSettings::default());
        for method in Method::ALL {
            assert!(registry.get(method).is_some());
        }
    }
}
