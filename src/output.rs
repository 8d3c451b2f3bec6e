//! Result types produced by the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Where the text of a page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Read directly from the page's embedded text layer.
    TextLayer,
    /// Recognised from a rasterised image of the page.
    Ocr,
}

/// The text recovered for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    pub source: TextSource,
    /// Page text exactly as the parser or OCR engine returned it.
    pub text: String,
    pub duration_ms: u64,
}

/// Aggregate numbers for one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub total_pages: usize,
    pub text_layer_pages: usize,
    pub ocr_pages: usize,
    pub total_duration_ms: u64,
}

/// Everything an extraction produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Page texts joined by `\n`, trimmed as a whole.
    pub text: String,
    /// Per-page results in document order.
    pub pages: Vec<PageResult>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    /// Assemble the output from per-page results that are already in page order.
    pub fn from_pages(pages: Vec<PageResult>, total_duration_ms: u64) -> Self {
        let ocr_pages = pages.iter().filter(|p| p.source == TextSource::Ocr).count();
        let stats = ExtractionStats {
            total_pages: pages.len(),
            text_layer_pages: pages.len() - ocr_pages,
            ocr_pages,
            total_duration_ms,
        };
        Self {
            text: assemble_text(&pages),
            pages,
            stats,
        }
    }
}

/// Join page texts with a single newline and trim the whole result.
///
/// Individual pages are not trimmed; only the outer edges of the document are.
pub fn assemble_text(pages: &[PageResult]) -> String {
    let joined = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    joined.trim().to_string()
}
