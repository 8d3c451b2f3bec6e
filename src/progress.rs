//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the document. The CLI uses it to drive a
//! terminal progress bar; the HTTP service leaves it unset.
//!
//! Callbacks are invoked from the blocking thread that walks the document,
//! so implementations must be `Send + Sync`.

use crate::output::TextSource;
use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Pages are always reported in document order.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once all pages have been read and rendered, before the first page event.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page's final text is produced (OCR runs, if needed).
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page's text is available.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages
    /// * `source`      — whether the text came from the text layer or OCR
    /// * `text_len`    — byte length of the page text
    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        source: TextSource,
        text_len: usize,
    ) {
        let _ = (page_num, total_pages, source, text_len);
    }

    /// Called once after every page has been processed.
    ///
    /// # Arguments
    /// * `total_pages` — total pages in the document
    /// * `ocr_pages`   — how many of them needed OCR
    fn on_extraction_complete(&self, total_pages: usize, ocr_pages: usize) {
        let _ = (total_pages, ocr_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
