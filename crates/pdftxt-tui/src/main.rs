use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pdftxt_core::{Method, config_file, find_pdfs};

mod action;
mod app;
mod backend;
mod input;
mod logging;
mod model;
mod theme;
mod tui_event;
mod view;

use app::App;

/// pdftxt TUI - batch PDF to text conversion with a terminal interface.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF files or folders to queue
    paths: Vec<PathBuf>,

    /// Extraction method: mupdf, layout, lopdf or ocr
    #[arg(short, long)]
    method: Option<Method>,

    /// Folder for the .txt files (default: next to each PDF)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,
}

/// Expand folders on the command line into the PDFs they contain.
fn collect_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(find_pdfs(path, false)?);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            anyhow::bail!("PDF file not found: {}", path.display());
        }
    }
    Ok(files)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = logging::init();

    let inputs = collect_inputs(&args.paths)?;

    // Resolve config: CLI flags > env vars > config file > defaults
    let (mut options, file_cfg) = config_file::resolve_options();
    if let Some(method) = args.method {
        options.method = method;
    }
    let output_dir = args.output_dir.or_else(|| {
        file_cfg
            .output
            .as_ref()
            .and_then(|o| o.dir.as_deref())
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
    });
    let display = file_cfg.display.unwrap_or_default();
    let theme_name = args
        .theme
        .or(display.theme)
        .unwrap_or_else(|| "hacker".to_string());
    let fps = display.fps.unwrap_or(10).clamp(1, 60);

    let available = backend::build_registry(&options.ocr).available_methods();
    tracing::info!(
        available = ?available,
        method = %options.method,
        files = inputs.len(),
        "starting TUI"
    );

    let mut app = App::new(options, output_dir, theme_name, available);
    app.add_files(inputs);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<tui_event::BackendCommand>();
    let cancel = CancellationToken::new();

    app.backend_cmd_tx = Some(cmd_tx);

    // Spawn backend command listener
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        // Per-batch cancel token, a child of the shutdown token
        let mut batch_cancel = shutdown.child_token();

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                tui_event::BackendCommand::ProcessFiles {
                    files,
                    options,
                    output_dir,
                } => {
                    batch_cancel = shutdown.child_token();
                    let tx = event_tx.clone();
                    let cancel = batch_cancel.clone();
                    // Spawn batch as a separate task so we can still receive commands
                    tokio::spawn(async move {
                        backend::run_batch(files, *options, output_dir, tx, cancel).await;
                    });
                }
                tui_event::BackendCommand::CancelProcessing => {
                    batch_cancel.cancel();
                }
            }
        }
    });

    // Also handle Ctrl+C at the OS level for clean shutdown
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let tick_rate = Duration::from_millis(1000 / u64::from(fps));

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            maybe_event = event_rx.recv() => {
                if let Some(backend_event) = maybe_event {
                    app.handle_backend_event(backend_event);
                    // Drain any additional queued backend events
                    while let Ok(evt) = event_rx.try_recv() {
                        app.handle_backend_event(evt);
                    }
                }
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    let action = input::map_event(&evt, &app.input_mode);
                    app.update(action);
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit || cancel.is_cancelled() {
            cancel.cancel();
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;

    Ok(())
}
