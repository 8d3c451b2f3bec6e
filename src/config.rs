//! Configuration types for text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. The HTTP service shares one config
//! between every request, so it is cheap to clone.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for extracting text from a PDF.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2text::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .dpi(300)
///     .ocr_language("eng+deu")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rendering DPI for pages that go through OCR. Range: 72–600. Default: 200.
    ///
    /// Tesseract is tuned for roughly 300 DPI input; below ~150 DPI small
    /// print degrades quickly. 200 keeps rendering fast on letter/A4 pages.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 5000.
    ///
    /// Caps either edge independent of DPI so an oversized page (posters,
    /// engineering drawings) cannot exhaust memory.
    pub max_rendered_pixels: u32,

    /// Tesseract language string, e.g. `"eng"` or `"eng+fra"`. Default: `"eng"`.
    pub ocr_language: String,

    /// Path or name of the tesseract executable. Default: `"tesseract"`.
    pub tesseract_path: PathBuf,

    /// Tesseract page segmentation mode (`--psm`, 0–13). Default: 3 (fully automatic).
    pub page_segmentation_mode: u8,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Directory for scratch copies of uploaded documents.
    /// If None, uses the system temp directory.
    pub temp_dir: Option<PathBuf>,

    /// Explicit pdfium library file. If None, looks next to the binary and
    /// then in the system library path.
    pub pdfium_library_path: Option<PathBuf>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 5000,
            ocr_language: "eng".to_string(),
            tesseract_path: PathBuf::from("tesseract"),
            page_segmentation_mode: 3,
            password: None,
            temp_dir: None,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_path", &self.tesseract_path)
            .field("page_segmentation_mode", &self.page_segmentation_mode)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("temp_dir", &self.temp_dir)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor from PDF points (1/72 inch) to pixels at the configured DPI.
    pub fn render_scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn ocr_language(mut self, language: impl Into<String>) -> Self {
        self.config.ocr_language = language.into();
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn page_segmentation_mode(mut self, psm: u8) -> Self {
        self.config.page_segmentation_mode = psm;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !(72..=600).contains(&c.dpi) {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.page_segmentation_mode > 13 {
            return Err(ExtractError::InvalidConfig(format!(
                "Page segmentation mode must be 0–13, got {}",
                c.page_segmentation_mode
            )));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = ExtractionConfig::builder().build().expect("defaults are valid");
        assert_eq!(config.dpi, 200);
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.page_segmentation_mode, 3);
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn dpi_out_of_range_is_rejected() {
        let err = ExtractionConfig::builder().dpi(40).build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
        assert!(ExtractionConfig::builder().dpi(601).build().is_err());
        assert!(ExtractionConfig::builder().dpi(600).build().is_ok());
    }

    #[test]
    fn psm_out_of_range_is_rejected() {
        assert!(ExtractionConfig::builder()
            .page_segmentation_mode(14)
            .build()
            .is_err());
    }

    #[test]
    fn blank_language_is_rejected() {
        assert!(ExtractionConfig::builder()
            .ocr_language("  ")
            .build()
            .is_err());
    }

    #[test]
    fn render_scale_follows_dpi() {
        let config = ExtractionConfig::builder().dpi(144).build().unwrap();
        assert!((config.render_scale() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn debug_redacts_password() {
        let config = ExtractionConfig::builder()
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
