use std::path::Path;

use thiserror::Error;

use crate::backend::{BackendError, BackendRegistry, assemble_pages};
use crate::config::ConvertOptions;
use crate::method::Method;

/// A failed extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub method: Method,
    pub error: String,
}

/// Text produced by the fallback chain.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    /// Method that produced `text`.
    pub method: Method,
    /// Attempts that failed before `method` succeeded, in order.
    pub failed_attempts: Vec<Attempt>,
}

impl Extraction {
    /// Whether the text came from a method other than the preferred one.
    pub fn fell_back(&self) -> bool {
        !self.failed_attempts.is_empty()
    }
}

#[derive(Error, Debug, Clone)]
pub enum FallbackError {
    #[error("all extraction methods failed; last error ({}): {}", last_method(.attempts), last_error(.attempts))]
    AllFailed { attempts: Vec<Attempt> },
}

impl FallbackError {
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            Self::AllFailed { attempts } => attempts,
        }
    }
}

fn last_method(attempts: &[Attempt]) -> String {
    attempts
        .last()
        .map(|a| a.method.to_string())
        .unwrap_or_else(|| "none".to_string())
}

fn last_error(attempts: &[Attempt]) -> String {
    attempts
        .last()
        .map(|a| a.error.clone())
        .unwrap_or_else(|| "no extraction method available".to_string())
}

/// Ordered list of methods the chain will try for `preferred`.
///
/// The preferred method always comes first, even when it is unavailable, so
/// its failure is recorded. Alternates are included only when available.
pub fn plan(registry: &BackendRegistry, preferred: Method, fallback: bool) -> Vec<Method> {
    let mut order = vec![preferred];
    if fallback {
        order.extend(preferred.alternates().filter(|m| registry.is_available(*m)));
    }
    order
}

/// Run one method, treating whitespace-only output as a failure.
pub fn try_method(
    registry: &BackendRegistry,
    method: Method,
    path: &Path,
    page_separator: Option<&str>,
) -> Result<String, BackendError> {
    let backend = registry.get(method).ok_or_else(|| {
        BackendError::Unavailable(format!("{} backend is not compiled in", method.label()))
    })?;
    if !backend.is_available() {
        return Err(BackendError::Unavailable(format!(
            "{} backend is not available on this system",
            method.label()
        )));
    }
    let text = assemble_pages(backend.extract_pages(path)?, page_separator)?;
    if text.trim().is_empty() {
        return Err(BackendError::NoText);
    }
    Ok(text)
}

/// Extract text with `options.method`, falling back to the other methods in
/// [`Method::ALL`] order when it errors or returns nothing.
///
/// `on_attempt` is called before each method is run.
pub fn extract_with_fallback(
    registry: &BackendRegistry,
    options: &ConvertOptions,
    path: &Path,
    mut on_attempt: impl FnMut(Method),
) -> Result<Extraction, FallbackError> {
    let preferred = options.method;
    let separator = options.page_separator.as_deref();
    let mut failed_attempts = Vec::new();

    for method in plan(registry, preferred, options.fallback) {
        if method != preferred {
            tracing::info!(path = %path.display(), method = %method, "retrying with alternate method");
        }
        on_attempt(method);

        match try_method(registry, method, path, separator) {
            Ok(text) => {
                if method != preferred {
                    tracing::info!(path = %path.display(), method = %method, "alternate method succeeded");
                }
                return Ok(Extraction {
                    text,
                    method,
                    failed_attempts,
                });
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), method = %method, error = %e, "extraction failed");
                failed_attempts.push(Attempt {
                    method,
                    error: e.to_string(),
                });
            }
        }
    }

    Err(FallbackError::AllFailed {
        attempts: failed_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::backend::ExtractionBackend;

    struct Fixed {
        method: Method,
        available: bool,
        output: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn ok(method: Method, text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                method,
                available: true,
                output: Ok(text),
                calls: AtomicUsize::new(0),
            })
        }

        fn err(method: Method, msg: &'static str) -> Arc<Self> {
            Arc::new(Self {
                method,
                available: true,
                output: Err(msg),
                calls: AtomicUsize::new(0),
            })
        }

        fn unavailable(method: Method) -> Arc<Self> {
            Arc::new(Self {
                method,
                available: false,
                output: Ok("should never be read"),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ExtractionBackend for Fixed {
        fn method(&self) -> Method {
            self.method
        }
        fn is_available(&self) -> bool {
            self.available
        }
        fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output
                .map(|text| vec![text.to_string()])
                .map_err(|e| BackendError::ExtractionError(e.to_string()))
        }
    }

    fn path() -> &'static Path {
        Path::new("doc.pdf")
    }

    fn opts(method: Method, fallback: bool) -> ConvertOptions {
        ConvertOptions {
            method,
            fallback,
            ..Default::default()
        }
    }

    #[test]
    fn preferred_success_does_not_touch_alternates() {
        let mupdf = Fixed::ok(Method::Mupdf, "alt");
        let registry = BackendRegistry::new()
            .with(Fixed::ok(Method::Layout, "hello"))
            .with(mupdf.clone());

        let out = extract_with_fallback(&registry, &opts(Method::Layout, true), path(), |_| {}).unwrap();
        assert_eq!(out.text, "hello\n");
        assert_eq!(out.method, Method::Layout);
        assert!(!out.fell_back());
        assert_eq!(mupdf.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn error_falls_back_in_fixed_order() {
        let registry = BackendRegistry::new()
            .with(Fixed::err(Method::Ocr, "tesseract crashed"))
            .with(Fixed::err(Method::Mupdf, "broken xref"))
            .with(Fixed::ok(Method::Layout, "table text"))
            .with(Fixed::ok(Method::Lopdf, "fast text"));

        let mut tried = Vec::new();
        let out =
            extract_with_fallback(&registry, &opts(Method::Ocr, true), path(), |m| tried.push(m)).unwrap();

        assert_eq!(tried, vec![Method::Ocr, Method::Mupdf, Method::Layout]);
        assert_eq!(out.method, Method::Layout);
        assert_eq!(out.failed_attempts.len(), 2);
        assert_eq!(out.failed_attempts[1].method, Method::Mupdf);
    }

    #[test]
    fn blank_output_counts_as_failure() {
        let registry = BackendRegistry::new()
            .with(Fixed::ok(Method::Lopdf, "  \n\n"))
            .with(Fixed::ok(Method::Mupdf, "real text"));

        let out = extract_with_fallback(&registry, &opts(Method::Lopdf, true), path(), |_| {}).unwrap();
        assert_eq!(out.method, Method::Mupdf);
        assert!(out.failed_attempts[0].error.contains("no text"));
    }

    #[test]
    fn unavailable_alternates_are_skipped() {
        let ocr = Fixed::unavailable(Method::Ocr);
        let registry = BackendRegistry::new()
            .with(Fixed::err(Method::Layout, "nope"))
            .with(ocr.clone());

        let err = extract_with_fallback(&registry, &opts(Method::Layout, true), path(), |_| {}).unwrap_err();
        assert_eq!(err.attempts().len(), 1);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unavailable_preferred_is_recorded_then_falls_back() {
        let registry = BackendRegistry::new()
            .with(Fixed::unavailable(Method::Ocr))
            .with(Fixed::ok(Method::Mupdf, "text"));

        let out = extract_with_fallback(&registry, &opts(Method::Ocr, true), path(), |_| {}).unwrap();
        assert_eq!(out.method, Method::Mupdf);
        assert_eq!(out.failed_attempts[0].method, Method::Ocr);
        assert!(out.failed_attempts[0].error.contains("not available"));
    }

    #[test]
    fn no_fallback_only_tries_preferred() {
        let registry = BackendRegistry::new()
            .with(Fixed::err(Method::Mupdf, "bad"))
            .with(Fixed::ok(Method::Layout, "good"));

        let err = extract_with_fallback(&registry, &opts(Method::Mupdf, false), path(), |_| {}).unwrap_err();
        assert_eq!(err.attempts().len(), 1);
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn missing_preferred_backend_is_reported() {
        let registry = BackendRegistry::new();
        let err = extract_with_fallback(&registry, &opts(Method::Lopdf, true), path(), |_| {}).unwrap_err();
        assert!(err.to_string().contains("not compiled in"));
    }

    #[test]
    fn plan_lists_preferred_then_available_alternates() {
        let registry = BackendRegistry::new()
            .with(Fixed::ok(Method::Mupdf, "x"))
            .with(Fixed::unavailable(Method::Ocr))
            .with(Fixed::ok(Method::Lopdf, "x"));
        assert_eq!(
            plan(&registry, Method::Ocr, true),
            vec![Method::Ocr, Method::Mupdf, Method::Lopdf]
        );
    }
}
