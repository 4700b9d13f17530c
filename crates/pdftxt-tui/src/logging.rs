use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Directory holding the TUI's daily log files.
pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("pdftxt").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Send `tracing` output to a daily rolling file instead of the terminal,
/// which ratatui owns while the UI is running.
///
/// The returned guard flushes buffered lines on drop and must live until
/// the program exits. `None` when the log directory cannot be created; the
/// UI then runs without logging.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(&dir, "pdftxt-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!(dir = %dir.display(), "logging initialized");
    Some(guard)
}
