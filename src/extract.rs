//! Extraction entry points.
//!
//! [`TextExtractor`] owns the two collaborators (document backend, OCR
//! engine) and runs the pipeline:
//!
//! 1. persist the upload as a [`ScratchFile`] with a generated name,
//! 2. open it on a blocking thread, read text layers and render scanned pages,
//! 3. close it and OCR the scanned pages, still off the async runtime,
//! 4. remove the scratch file, whatever happened in steps 2 and 3,
//! 5. join page texts and trim.
//!
//! The free functions [`extract_bytes`] and [`extract_file`] build a default
//! pdfium + tesseract extractor from an [`ExtractionConfig`].

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{ExtractionOutput, PageResult};
use crate::pipeline::document::{DocumentBackend, PageSource, PdfiumBackend};
use crate::pipeline::ocr::{OcrEngine, TesseractEngine};
use crate::pipeline::pages::{load_pages, recognise_pages};
use crate::pipeline::scratch::ScratchFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const PDF_MAGIC: &[u8; 4] = b"%PDF";
/// PDF readers accept the header anywhere in the first KiB.
const HEADER_SEARCH_LEN: usize = 1024;

/// True if `%PDF` starts within the first [`HEADER_SEARCH_LEN`] bytes.
fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_LEN + PDF_MAGIC.len() - 1)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// The text extraction pipeline.
///
/// Cheap to share: wrap it in an `Arc` and call [`TextExtractor::extract`]
/// from as many tasks as needed.
pub struct TextExtractor {
    config: ExtractionConfig,
    backend: Arc<dyn DocumentBackend>,
    ocr: Arc<dyn OcrEngine>,
}

impl TextExtractor {
    /// Extractor using pdfium for documents and tesseract for OCR.
    pub fn new(config: ExtractionConfig) -> Self {
        let backend = Arc::new(PdfiumBackend::new(&config));
        let ocr = Arc::new(TesseractEngine::new(&config));
        Self::with_engines(config, backend, ocr)
    }

    /// Extractor with caller-supplied collaborators.
    pub fn with_engines(
        config: ExtractionConfig,
        backend: Arc<dyn DocumentBackend>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            config,
            backend,
            ocr,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn ocr_engine(&self) -> &dyn OcrEngine {
        self.ocr.as_ref()
    }

    /// Extract text from an uploaded document.
    ///
    /// `filename` is only used for logging, error messages and the scratch
    /// file's extension. The scratch copy is removed before this returns,
    /// on success and on every error path.
    pub async fn extract(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<ExtractionOutput, ExtractError> {
        let start = Instant::now();
        info!("Starting extraction: '{}' ({} bytes)", filename, bytes.len());

        if !has_pdf_header(bytes) {
            let mut magic = [0u8; 4];
            let n = bytes.len().min(magic.len());
            magic[..n].copy_from_slice(&bytes[..n]);
            return Err(ExtractError::NotAPdf {
                filename: filename.to_string(),
                magic,
            });
        }

        let scratch = ScratchFile::persist(bytes, filename, self.config.temp_dir.as_deref())?;
        let result = self.run(scratch.path(), filename).await;
        let cleanup = scratch.remove();

        let pages = match (result, cleanup) {
            (Ok(pages), Ok(())) => pages,
            (Ok(_), Err(e)) => return Err(e),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!("Cleanup after failed extraction also failed: {}", cleanup_err);
                return Err(e);
            }
        };

        Ok(finish(filename, pages, start))
    }

    /// Extract text from a PDF already on disk. The file is left in place.
    pub async fn extract_file(&self, path: &Path) -> Result<ExtractionOutput, ExtractError> {
        let start = Instant::now();
        let filename = path.display().to_string();
        info!("Starting extraction: '{}'", filename);

        if !path.is_file() {
            return Err(ExtractError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let pages = self.run(path, &filename).await?;
        Ok(finish(&filename, pages, start))
    }

    /// Load the document at `path`, then OCR its scanned pages, on a blocking thread.
    async fn run(&self, path: &Path, filename: &str) -> Result<Vec<PageResult>, ExtractError> {
        let path: PathBuf = path.to_path_buf();
        let filename = filename.to_string();
        let backend = Arc::clone(&self.backend);
        let ocr = Arc::clone(&self.ocr);
        let progress = self.config.progress_callback.clone();

        tokio::task::spawn_blocking(move || {
            let mut loaded = Vec::new();
            backend.with_document(&path, &filename, &mut |doc: &dyn PageSource| {
                loaded = load_pages(doc)?;
                Ok(())
            })?;
            // The document is closed here; OCR no longer holds the backend.
            recognise_pages(loaded, ocr.as_ref(), progress.as_deref())
        })
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))?
    }
}

fn finish(filename: &str, pages: Vec<PageResult>, start: Instant) -> ExtractionOutput {
    let output = ExtractionOutput::from_pages(pages, start.elapsed().as_millis() as u64);
    info!(
        "Extraction complete: '{}', {} pages ({} via OCR), {} chars, {}ms",
        filename,
        output.stats.total_pages,
        output.stats.ocr_pages,
        output.text.chars().count(),
        output.stats.total_duration_ms
    );
    output
}

/// Extract text from PDF bytes with the default pdfium + tesseract pipeline.
///
/// # Example
/// ```rust,no_run
/// use pdf2text::{extract_bytes, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("scan.pdf")?;
/// let output = extract_bytes(&bytes, "scan.pdf", &ExtractionConfig::default()).await?;
/// println!("{}", output.text);
/// # Ok(())
/// # }
/// ```
pub async fn extract_bytes(
    bytes: &[u8],
    filename: &str,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    TextExtractor::new(config.clone())
        .extract(bytes, filename)
        .await
}

/// Extract text from a PDF file with the default pdfium + tesseract pipeline.
pub async fn extract_file(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    TextExtractor::new(config.clone())
        .extract_file(path.as_ref())
        .await
}
