use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pdftxt_core::{BackendRegistry, ConvertOptions, OcrSettings, convert_batch};
use pdftxt_lopdf::LopdfBackend;
use pdftxt_mupdf::{LayoutBackend, MupdfBackend, MupdfRasterizer};
use pdftxt_ocr::OcrBackend;

use crate::tui_event::BackendEvent;

/// Every backend this build ships, with MuPDF as the OCR renderer of last resort.
pub fn build_registry(ocr: &OcrSettings) -> BackendRegistry {
    let ocr_backend = OcrBackend::new(ocr.clone())
        .with_fallback_rasterizer(Arc::new(MupdfRasterizer::new()));
    BackendRegistry::new()
        .with(Arc::new(MupdfBackend::new()))
        .with(Arc::new(LayoutBackend::new()))
        .with(Arc::new(LopdfBackend::new()))
        .with(Arc::new(ocr_backend))
}

/// Convert `files` on the blocking pool, forwarding progress to the UI.
///
/// The registry is rebuilt per batch so OCR settings changed in the UI take
/// effect on the next run.
pub async fn run_batch(
    files: Vec<PathBuf>,
    options: ConvertOptions,
    output_dir: Option<PathBuf>,
    tx: mpsc::UnboundedSender<BackendEvent>,
    cancel: CancellationToken,
) {
    tracing::info!(
        files = files.len(),
        method = %options.method,
        fallback = options.fallback,
        "starting batch"
    );

    let progress_tx = tx.clone();
    let result = tokio::task::spawn_blocking(move || {
        let registry = build_registry(&options.ocr);
        convert_batch(
            &registry,
            &options,
            &files,
            None,
            output_dir.as_deref(),
            &cancel,
            |event| {
                let _ = progress_tx.send(BackendEvent::from(event));
            },
        )
    })
    .await;

    let error = match result {
        Ok(Ok(summary)) => {
            tracing::info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                cancelled = summary.cancelled,
                "batch finished"
            );
            return;
        }
        Ok(Err(e)) => e.to_string(),
        Err(e) => format!("conversion task failed: {}", e),
    };
    tracing::error!(error = %error, "batch aborted");
    let _ = tx.send(BackendEvent::BatchFailed { error });
}
