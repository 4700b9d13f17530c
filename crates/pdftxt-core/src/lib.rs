//! Core of the PDF-to-text converter: the extraction backend trait, the
//! multi-method fallback chain, single-file and batch conversion, and
//! configuration.

pub mod backend;
pub mod batch;
pub mod cleanup;
pub mod config;
pub mod config_file;
pub mod convert;
pub mod fallback;
pub mod method;

// Re-export for convenience
pub use backend::{BackendError, BackendRegistry, ExtractionBackend, PageRasterizer, page_marker};
pub use batch::{BatchEvent, BatchSummary, batch_output_path, convert_batch, find_pdfs};
pub use config::{ConvertOptions, LANGUAGE_PRESETS, OcrQuality, OcrSettings};
pub use convert::{
    ConversionReport, ConversionStatus, ConvertError, convert_file, default_output_path,
};
pub use fallback::{Attempt, Extraction, FallbackError, extract_with_fallback};
pub use method::{Method, UnknownMethod};
pub use tokio_util::sync::CancellationToken;
