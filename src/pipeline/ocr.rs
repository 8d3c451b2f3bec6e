//! OCR engines: turn a rasterised page into text.
//!
//! [`TesseractEngine`] drives the `tesseract` executable, piping a PNG to its
//! stdin and reading the recognised text from stdout, so no intermediate
//! image files are written. Text is returned exactly as tesseract printed it
//! (including its trailing form feed); whitespace is only normalised when the
//! whole document is assembled.

use crate::config::ExtractionConfig;
use crate::error::OcrError;
use crate::pipeline::encode::encode_png;
use image::DynamicImage;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// An engine that recognises text in a page image.
///
/// Called from a blocking thread; implementations may block.
pub trait OcrEngine: Send + Sync {
    /// Short name used in logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Whether the engine can currently be used.
    fn is_available(&self) -> bool {
        true
    }

    /// Recognise the text in `image`.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Recognise the text in a PNG-encoded page image.
    ///
    /// The pipeline hands pages over in this form once the document is
    /// closed. The default decodes and delegates to [`OcrEngine::recognize`].
    fn recognize_png(&self, png: &[u8]) -> Result<String, OcrError> {
        let image = image::load_from_memory_with_format(png, image::ImageFormat::Png)?;
        self.recognize(&image)
    }
}

/// OCR through the tesseract command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    page_segmentation_mode: u8,
    dpi: u32,
}

impl TesseractEngine {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language: config.ocr_language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
            dpi: config.dpi,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .arg("--dpi")
            .arg(self.dpi.to_string());
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = encode_png(image)?;
        self.recognize_png(&png)
    }

    fn recognize_png(&self, png: &[u8]) -> Result<String, OcrError> {
        let png = png.to_vec();
        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::NotInstalled {
                    binary: self.binary.clone(),
                },
                _ => OcrError::Io(e),
            })?;

        // Feed stdin from a separate thread: tesseract may start writing
        // before it has consumed the whole image.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Io(std::io::Error::other("tesseract stdin unavailable")))?;
        let writer = std::thread::spawn(move || stdin.write_all(&png));

        let output = child.wait_with_output()?;
        match writer.join() {
            Ok(Ok(())) => {}
            // A broken pipe means tesseract exited early; its status says why.
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(OcrError::Io(e)),
            Err(_) => {
                return Err(OcrError::Io(std::io::Error::other(
                    "tesseract stdin writer panicked",
                )))
            }
        }

        if !output.status.success() {
            return Err(OcrError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract recognised {} bytes of text", text.len());
        Ok(text)
    }
}
