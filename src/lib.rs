//! # pdf2text
//!
//! Extract plain text from PDF documents, falling back to OCR per page.
//!
//! ## Why this crate?
//!
//! A PDF can be born-digital (every page carries a text layer), scanned
//! (pages are images with no text at all) or a mix of both. Running OCR on
//! everything is slow and loses accuracy on digital pages; reading only the
//! text layer returns nothing for scans. This crate decides page by page:
//! embedded text is used when it is non-empty after trimming, otherwise that
//! single page is rasterised and handed to tesseract.
//!
//! ## Pipeline Overview
//!
//! ```text
//! bytes
//!  │
//!  ├─ 1. Scratch  persist upload under a unique temp name
//!  ├─ 2. Open     load the document via pdfium (spawn_blocking)
//!  ├─ 3. Pages    text layer, or render → PNG → tesseract when empty
//!  ├─ 4. Cleanup  remove the scratch file on every path
//!  └─ 5. Output   page texts joined by "\n", trimmed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2text::{extract_file, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().dpi(300).build()?;
//!     let output = extract_file("scan.pdf", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("{} of {} pages needed OCR",
//!         output.stats.ocr_pages,
//!         output.stats.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | HTTP service (`POST /upload`) on axum + tower-http |
//! | `cli`    | on      | Enables the `pdf2text` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Library-only use:
//! ```toml
//! pdf2text = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! - a pdfium shared library, found via `PDFIUM_LIB_PATH`, the working
//!   directory, or the system library path;
//! - a `tesseract` executable on `PATH` (or `TESSERACT_PATH`) with the
//!   configured language data. Only needed for pages without a text layer.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{ExtractError, OcrError};
pub use extract::{extract_bytes, extract_file, TextExtractor};
pub use output::{ExtractionOutput, ExtractionStats, PageResult, TextSource};
pub use pipeline::document::{DocumentBackend, PageSource, PdfiumBackend};
pub use pipeline::ocr::{OcrEngine, TesseractEngine};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
