//! Page walk: choose between the text layer and OCR, one page at a time.
//!
//! A page whose embedded text is empty or whitespace-only is treated as
//! scanned: exactly that page is rasterised and passed to the OCR engine.
//! Mixed documents are therefore handled page by page. There is no
//! confidence threshold; emptiness is the only signal.
//!
//! The walk has two phases so that pdfium is held only as long as needed:
//!
//! 1. [`load_pages`] runs while the document is open. It reads every text
//!    layer and renders each scanned page to a greyscale PNG.
//! 2. [`recognise_pages`] runs after the document is closed. It OCRs the
//!    scanned pages and fires progress events.
//!
//! Scanned pages are kept PNG-encoded between the phases. Pages are
//! processed strictly in order and results are pushed in that order, so the
//! output vector index equals the page index.

use crate::error::ExtractError;
use crate::output::{PageResult, TextSource};
use crate::pipeline::document::PageSource;
use crate::pipeline::encode::encode_png;
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ExtractionProgressCallback;
use std::time::{Duration, Instant};
use tracing::debug;

/// True if the page has no usable embedded text and must be OCR'd.
pub fn needs_ocr(text: &str) -> bool {
    text.trim().is_empty()
}

/// What [`load_pages`] recovered for one page.
#[derive(Debug)]
pub enum PageContent {
    /// Non-empty embedded text, kept untrimmed.
    Text(String),
    /// A PNG rendering of a page without a text layer.
    Scanned(Vec<u8>),
}

/// One page after the document phase.
#[derive(Debug)]
pub struct LoadedPage {
    /// 1-indexed page number.
    pub page_num: usize,
    pub content: PageContent,
    elapsed: Duration,
}

/// Read every page of `doc`: text layer, or a PNG rendering when it is empty.
///
/// The first failing page aborts the walk and its error is returned.
pub fn load_pages(doc: &dyn PageSource) -> Result<Vec<LoadedPage>, ExtractError> {
    let total_pages = doc.page_count();
    let mut loaded = Vec::with_capacity(total_pages);

    for index in 0..total_pages {
        let start = Instant::now();
        let page_num = index + 1;

        let text = doc.page_text(index)?;
        let content = if needs_ocr(&text) {
            debug!("Page {}: no text layer, rendering for OCR", page_num);
            let image = doc.render_page(index)?;
            let png = encode_png(&image).map_err(|e| ExtractError::PageRender {
                page: page_num,
                detail: e.to_string(),
            })?;
            PageContent::Scanned(png)
        } else {
            PageContent::Text(text)
        };

        loaded.push(LoadedPage {
            page_num,
            content,
            elapsed: start.elapsed(),
        });
    }
    Ok(loaded)
}

/// OCR the scanned pages of `loaded` and produce the final page results.
///
/// The first OCR failure aborts the walk and its error is returned.
pub fn recognise_pages(
    loaded: Vec<LoadedPage>,
    ocr: &dyn OcrEngine,
    progress: Option<&dyn ExtractionProgressCallback>,
) -> Result<Vec<PageResult>, ExtractError> {
    let total_pages = loaded.len();
    if let Some(cb) = progress {
        cb.on_extraction_start(total_pages);
    }

    let mut results = Vec::with_capacity(total_pages);
    for page in loaded {
        if let Some(cb) = progress {
            cb.on_page_start(page.page_num, total_pages);
        }

        let result = recognise_page(page, ocr)?;

        if let Some(cb) = progress {
            cb.on_page_complete(result.page_num, total_pages, result.source, result.text.len());
        }
        results.push(result);
    }

    if let Some(cb) = progress {
        let ocr_pages = results
            .iter()
            .filter(|r| r.source == TextSource::Ocr)
            .count();
        cb.on_extraction_complete(total_pages, ocr_pages);
    }
    Ok(results)
}

fn recognise_page(page: LoadedPage, ocr: &dyn OcrEngine) -> Result<PageResult, ExtractError> {
    let start = Instant::now();
    let page_num = page.page_num;

    let (source, text) = match page.content {
        PageContent::Text(text) => (TextSource::TextLayer, text),
        PageContent::Scanned(png) => {
            let recognised = ocr
                .recognize_png(&png)
                .map_err(|source| ExtractError::Ocr {
                    page: page_num,
                    source,
                })?;
            (TextSource::Ocr, recognised)
        }
    };

    let duration_ms = (page.elapsed + start.elapsed()).as_millis() as u64;
    debug!(
        "Page {}: {} bytes from {:?} in {}ms",
        page_num,
        text.len(),
        source,
        duration_ms
    );

    Ok(PageResult {
        page_num,
        source,
        text,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::{DynamicImage, GrayImage, Luma};
    use std::cell::RefCell;
    use std::sync::Mutex;

    /// Pages with scripted text layers; rendering encodes the page index in the pixel.
    struct ScriptedDoc {
        texts: Vec<&'static str>,
        rendered: RefCell<Vec<usize>>,
    }

    impl ScriptedDoc {
        fn new(texts: Vec<&'static str>) -> Self {
            Self {
                texts,
                rendered: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for ScriptedDoc {
        fn page_count(&self) -> usize {
            self.texts.len()
        }

        fn page_text(&self, index: usize) -> Result<String, ExtractError> {
            Ok(self.texts[index].to_string())
        }

        fn render_page(&self, index: usize) -> Result<DynamicImage, ExtractError> {
            self.rendered.borrow_mut().push(index);
            Ok(DynamicImage::ImageLuma8(GrayImage::from_pixel(
                1,
                1,
                Luma([index as u8]),
            )))
        }
    }

    /// Reads back the page index from the pixel value.
    struct PixelOcr {
        calls: Mutex<usize>,
    }

    impl OcrEngine for PixelOcr {
        fn name(&self) -> &'static str {
            "pixel"
        }

        fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
            *self.calls.lock().unwrap() += 1;
            let index = image.to_luma8().get_pixel(0, 0)[0];
            Ok(format!("ocr page {}\n", index + 1))
        }
    }

    fn pixel_ocr() -> PixelOcr {
        PixelOcr {
            calls: Mutex::new(0),
        }
    }

    fn walk(doc: &ScriptedDoc, ocr: &dyn OcrEngine) -> Result<Vec<PageResult>, ExtractError> {
        recognise_pages(load_pages(doc)?, ocr, None)
    }

    #[test]
    fn whitespace_counts_as_empty() {
        assert!(needs_ocr(""));
        assert!(needs_ocr("   \n"));
        assert!(needs_ocr("\t\r\n\x0c"));
        assert!(!needs_ocr("  a  "));
    }

    #[test]
    fn text_layer_pages_skip_ocr() {
        let doc = ScriptedDoc::new(vec!["Hello", " World "]);
        let ocr = pixel_ocr();
        let pages = walk(&doc, &ocr).unwrap();

        assert_eq!(*ocr.calls.lock().unwrap(), 0);
        assert!(doc.rendered.borrow().is_empty());
        assert_eq!(pages[1].text, " World ", "page text is kept untrimmed");
        assert!(pages.iter().all(|p| p.source == TextSource::TextLayer));
    }

    #[test]
    fn only_empty_pages_are_rendered() {
        let doc = ScriptedDoc::new(vec!["embedded", "   \n", "more", ""]);
        let ocr = pixel_ocr();
        let pages = walk(&doc, &ocr).unwrap();

        assert_eq!(*doc.rendered.borrow(), vec![1, 3]);
        let sources: Vec<_> = pages.iter().map(|p| p.source).collect();
        assert_eq!(
            sources,
            [
                TextSource::TextLayer,
                TextSource::Ocr,
                TextSource::TextLayer,
                TextSource::Ocr
            ]
        );
        assert_eq!(pages[1].text, "ocr page 2\n");
        assert_eq!(pages[3].text, "ocr page 4\n");
        let nums: Vec<_> = pages.iter().map(|p| p.page_num).collect();
        assert_eq!(nums, [1, 2, 3, 4]);
    }

    #[test]
    fn ocr_failure_reports_page() {
        struct FailingOcr;
        impl OcrEngine for FailingOcr {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
                Err(OcrError::Failed {
                    code: Some(1),
                    stderr: "boom".into(),
                })
            }
        }

        let doc = ScriptedDoc::new(vec!["ok", "", ""]);
        let err = walk(&doc, &FailingOcr).unwrap_err();
        assert_eq!(err.page(), Some(2));
    }

    #[test]
    fn scanned_pages_are_loaded_as_png() {
        let doc = ScriptedDoc::new(vec!["text", " "]);
        let loaded = load_pages(&doc).unwrap();

        assert!(matches!(&loaded[0].content, PageContent::Text(t) if t == "text"));
        match &loaded[1].content {
            PageContent::Scanned(png) => assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n"),
            other => panic!("expected a scanned page, got {other:?}"),
        }
        assert_eq!(loaded[1].page_num, 2);
    }

    #[test]
    fn render_failure_reports_page() {
        struct Unrenderable;
        impl PageSource for Unrenderable {
            fn page_count(&self) -> usize {
                2
            }
            fn page_text(&self, index: usize) -> Result<String, ExtractError> {
                Ok(if index == 0 { "ok".into() } else { String::new() })
            }
            fn render_page(&self, index: usize) -> Result<DynamicImage, ExtractError> {
                Err(ExtractError::PageRender {
                    page: index + 1,
                    detail: "bitmap allocation failed".into(),
                })
            }
        }

        let err = load_pages(&Unrenderable).unwrap_err();
        assert_eq!(err.code(), "page_render_failed");
        assert_eq!(err.page(), Some(2));
    }

    #[test]
    fn empty_document_yields_no_pages() {
        let doc = ScriptedDoc::new(vec![]);
        let pages = walk(&doc, &pixel_ocr()).unwrap();
        assert!(pages.is_empty());
    }
}
