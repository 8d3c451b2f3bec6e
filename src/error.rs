//! Error types for the pdf2text library.
//!
//! Two error types reflect two layers of failure:
//!
//! * [`ExtractError`] — **Fatal** for the request: the document cannot be
//!   opened, a page cannot be read, rendered or recognised, or the scratch
//!   file cannot be written or removed. Returned from the top-level
//!   `extract*` functions; any of these aborts the whole document.
//!
//! * [`OcrError`] — what an [`crate::pipeline::ocr::OcrEngine`] reports for
//!   one image. The pipeline wraps it in [`ExtractError::Ocr`] together with
//!   the page number it was working on.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2text library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The bytes were received, but they do not start with the PDF magic.
    #[error("'{filename}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { filename: String, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Could not open '{filename}' as a PDF document: {detail}")]
    DocumentOpen { filename: String, detail: String },

    /// PDF requires a password but none was configured.
    #[error("'{filename}' is encrypted and requires a password")]
    PasswordRequired { filename: String },

    /// A password was configured but it is wrong.
    #[error("Wrong password for '{filename}'")]
    WrongPassword { filename: String },

    /// The parser could not read the embedded text layer of a page.
    #[error("Reading the text layer of page {page} failed: {detail}")]
    TextLayer { page: usize, detail: String },

    /// A page without embedded text could not be rasterised for OCR.
    #[error("Rasterisation failed for page {page}: {detail}")]
    PageRender { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine failed on the rasterised image of a page.
    #[error("OCR failed on page {page}: {source}")]
    Ocr {
        page: usize,
        #[source]
        source: OcrError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create, write or delete the scratch copy of the upload.
    #[error("Scratch file I/O failed ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library next to the\n\
binary, or install it in a system library directory.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Wrap an I/O error with a short description of the failed action.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ExtractError::Io {
            context: context.into(),
            source,
        }
    }

    /// The 1-indexed page the failure happened on, if it is page-specific.
    pub fn page(&self) -> Option<usize> {
        match self {
            ExtractError::TextLayer { page, .. }
            | ExtractError::PageRender { page, .. }
            | ExtractError::Ocr { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// A stable, machine-readable code naming the failed stage.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::FileNotFound { .. } => "file_not_found",
            ExtractError::NotAPdf { .. } => "not_a_pdf",
            ExtractError::DocumentOpen { .. } => "document_open_failed",
            ExtractError::PasswordRequired { .. } => "password_required",
            ExtractError::WrongPassword { .. } => "wrong_password",
            ExtractError::TextLayer { .. } => "text_layer_failed",
            ExtractError::PageRender { .. } => "page_render_failed",
            ExtractError::Ocr {
                source: OcrError::NotInstalled { .. },
                ..
            } => "ocr_unavailable",
            ExtractError::Ocr { .. } => "ocr_failed",
            ExtractError::Io { .. } => "io_error",
            ExtractError::InvalidConfig(_) => "invalid_config",
            ExtractError::PdfiumBindingFailed(_) => "pdfium_unavailable",
            ExtractError::Internal(_) => "internal_error",
        }
    }
}

/// A failure reported by an OCR engine for a single image.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine executable could not be found.
    #[error("OCR engine '{binary}' is not installed or not on PATH")]
    NotInstalled { binary: PathBuf },

    /// The page image could not be encoded for, or decoded by, the engine.
    #[error("Could not process page image: {0}")]
    Encode(#[from] image::ImageError),

    /// Talking to the engine process failed.
    #[error("OCR engine I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The engine ran but exited unsuccessfully.
    #[error("OCR engine exited with status {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_error_display_includes_page() {
        let e = ExtractError::Ocr {
            page: 4,
            source: OcrError::Failed {
                code: Some(1),
                stderr: "Error opening data file eng.traineddata".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("page 4"), "got: {msg}");
        assert!(msg.contains("eng.traineddata"), "got: {msg}");
    }

    #[test]
    fn page_is_reported_for_page_errors_only() {
        let render = ExtractError::PageRender {
            page: 2,
            detail: "bitmap allocation failed".into(),
        };
        assert_eq!(render.page(), Some(2));

        let open = ExtractError::DocumentOpen {
            filename: "scan.pdf".into(),
            detail: "FormatError".into(),
        };
        assert_eq!(open.page(), None);
    }

    #[test]
    fn missing_engine_has_its_own_code() {
        let missing = ExtractError::Ocr {
            page: 1,
            source: OcrError::NotInstalled {
                binary: PathBuf::from("tesseract"),
            },
        };
        assert_eq!(missing.code(), "ocr_unavailable");

        let failed = ExtractError::Ocr {
            page: 1,
            source: OcrError::Failed {
                code: None,
                stderr: String::new(),
            },
        };
        assert_eq!(failed.code(), "ocr_failed");
    }

    #[test]
    fn io_helper_keeps_context() {
        let e = ExtractError::io(
            "removing scratch file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(e.to_string().contains("removing scratch file"));
        assert_eq!(e.code(), "io_error");
    }
}
