//! Document access: open a PDF, read page text layers, rasterise pages.
//!
//! The pipeline only needs three things from a document, captured by
//! [`PageSource`]: how many pages it has, the embedded text of a page, and a
//! bitmap of a page. [`DocumentBackend`] opens a file and lends a
//! `PageSource` to a visitor for the lifetime of the open document, so the
//! handle is always closed when the visitor returns, on success or error.
//!
//! ## Serialisation
//!
//! pdfium keeps global state; `FPDF_InitLibrary`/`FPDF_DestroyLibrary` are
//! tied to each bound [`Pdfium`] instance. [`PdfiumBackend`] holds a
//! process-wide lock from bind to release, so only one document is open at a
//! time. Visitors should only read and render inside the lock; OCR of the
//! rendered pages runs after [`DocumentBackend::with_document`] returns, so
//! several requests can OCR concurrently.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Read access to the pages of one opened document.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Embedded text of the page at `index` (0-based). Empty if there is none.
    fn page_text(&self, index: usize) -> Result<String, ExtractError>;

    /// Rasterise the page at `index` (0-based) for OCR.
    fn render_page(&self, index: usize) -> Result<DynamicImage, ExtractError>;
}

/// Something that can open a PDF file as a [`PageSource`].
pub trait DocumentBackend: Send + Sync {
    /// Open `path`, hand the document to `visit`, then close it.
    ///
    /// `filename` is the client-facing name used in error messages.
    fn with_document(
        &self,
        path: &Path,
        filename: &str,
        visit: &mut dyn FnMut(&dyn PageSource) -> Result<(), ExtractError>,
    ) -> Result<(), ExtractError>;
}

static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

/// The lock guards no data, so a panic while it was held leaves nothing to repair.
fn lock_pdfium() -> MutexGuard<'static, ()> {
    PDFIUM_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`DocumentBackend`] backed by the pdfium library.
#[derive(Debug, Clone)]
pub struct PdfiumBackend {
    library_path: Option<PathBuf>,
    password: Option<String>,
    scale: f32,
    max_pixels: u32,
}

impl PdfiumBackend {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            library_path: config.pdfium_library_path.clone(),
            password: config.password.clone(),
            scale: config.render_scale(),
            max_pixels: config.max_rendered_pixels,
        }
    }

    /// Bind pdfium: the configured path, else the working directory, else the system library.
    ///
    /// A configured directory is searched for the platform library name.
    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let bindings = match &self.library_path {
            Some(dir) if dir.is_dir() => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        };
        bindings
            .map(Pdfium::new)
            .map_err(|e| ExtractError::PdfiumBindingFailed(e.to_string()))
    }

    /// Check that pdfium can be bound, without opening a document.
    pub fn check_binding(&self) -> Result<(), ExtractError> {
        let _guard = lock_pdfium();
        self.bind().map(|_| ())
    }

    fn render_config(&self) -> PdfRenderConfig {
        PdfRenderConfig::new()
            .scale_page_by_factor(self.scale)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32)
    }
}

impl DocumentBackend for PdfiumBackend {
    fn with_document(
        &self,
        path: &Path,
        filename: &str,
        visit: &mut dyn FnMut(&dyn PageSource) -> Result<(), ExtractError>,
    ) -> Result<(), ExtractError> {
        let _guard = lock_pdfium();

        let pdfium = self.bind()?;
        let password = self.password.as_deref();

        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    ExtractError::WrongPassword {
                        filename: filename.to_string(),
                    }
                } else {
                    ExtractError::PasswordRequired {
                        filename: filename.to_string(),
                    }
                }
            } else {
                ExtractError::DocumentOpen {
                    filename: filename.to_string(),
                    detail: err_str,
                }
            }
        })?;

        let pages = PdfiumPages {
            document: &document,
            render_config: self.render_config(),
        };
        info!("PDF '{}' opened: {} pages", filename, pages.page_count());

        let result = visit(&pages);
        drop(pages);
        drop(document);
        debug!("PDF '{}' closed", filename);
        result
    }
}

struct PdfiumPages<'doc, 'a> {
    document: &'doc PdfDocument<'a>,
    render_config: PdfRenderConfig,
}

impl<'a> PdfiumPages<'_, 'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'a>, PdfiumError> {
        let index = PdfPageIndex::try_from(index).map_err(|_| PdfiumError::PageIndexOutOfBounds)?;
        self.document.pages().get(index)
    }
}

impl PageSource for PdfiumPages<'_, '_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_text(&self, index: usize) -> Result<String, ExtractError> {
        let page = self.page(index).map_err(|e| ExtractError::TextLayer {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        let text = page.text().map_err(|e| ExtractError::TextLayer {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        Ok(text.all())
    }

    fn render_page(&self, index: usize) -> Result<DynamicImage, ExtractError> {
        let page = self.page(index).map_err(|e| ExtractError::PageRender {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;

        let bitmap = page
            .render_with_config(&self.render_config)
            .map_err(|e| ExtractError::PageRender {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
