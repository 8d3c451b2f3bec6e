//! Pipeline stages for PDF-to-text extraction.
//!
//! Each submodule implements exactly one step, and the two external
//! collaborators (document backend, OCR engine) sit behind traits so tests
//! can script them.
//!
//! ## Data Flow
//!
//! ```text
//! scratch ──▶ document ──┬──▶ text layer ───────────────┐
//! (tempfile)  (pdfium)   └──▶ render ──▶ encode ──▶ ocr ─┴──▶ pages
//! ```
//!
//! 1. [`scratch`]  — persist the upload under a unique temporary name
//! 2. [`document`] — open the PDF, read text layers, rasterise pages
//! 3. [`encode`]   — PNG-encode a rasterised page for the OCR engine
//! 4. [`ocr`]      — recognise text in a page image (tesseract)
//! 5. [`pages`]    — walk pages in order, choosing text layer or OCR per page

pub mod document;
pub mod encode;
pub mod ocr;
pub mod pages;
pub mod scratch;
