//! End-to-end tests against real pdfium and tesseract.
//!
//! Gated behind `E2E_ENABLED` so they do not run unless the native
//! libraries are installed.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture
//!
//! Scanned-page tests additionally need PDFs in `./test_cases/`.

use pdf2text::{extract_bytes, extract_file, ExtractError, ExtractionConfig, TextSource};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Skip unless E2E_ENABLED is set *and* the file at `path` exists.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        e2e_skip_unless_enabled!();
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

fn config() -> ExtractionConfig {
    let mut builder = ExtractionConfig::builder();
    if let Ok(lib) = std::env::var("PDFIUM_LIB_PATH") {
        builder = builder.pdfium_library_path(lib);
    }
    if let Ok(bin) = std::env::var("TESSERACT_PATH") {
        builder = builder.tesseract_path(bin);
    }
    builder.build().expect("valid config")
}

/// A single-page PDF whose text layer draws `text` in Helvetica.
fn text_pdf(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_text_layer_is_read_without_ocr() {
    e2e_skip_unless_enabled!();

    let out = extract_bytes(&text_pdf("Hello World"), "hello.pdf", &config())
        .await
        .expect("extraction should succeed");

    println!("{:#?}", out.stats);
    assert_eq!(out.text, "Hello World");
    assert_eq!(out.pages.len(), 1);
    assert_eq!(out.pages[0].source, TextSource::TextLayer);
}

#[tokio::test]
async fn e2e_garbage_after_magic_fails_to_open() {
    e2e_skip_unless_enabled!();

    let err = extract_bytes(b"%PDF-1.4\nthis is not a pdf", "bad.pdf", &config())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ExtractError::DocumentOpen { .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn e2e_scanned_invoice_is_ocrd() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("scanned_invoice.pdf"));

    let out = extract_file(&path, &config())
        .await
        .expect("extraction should succeed");

    println!("{}", out.text);
    assert!(out.stats.ocr_pages > 0, "expected at least one OCR page");
    assert!(
        out.text.to_uppercase().contains("INVOICE"),
        "OCR output should mention INVOICE"
    );
}

#[tokio::test]
async fn e2e_mixed_document_uses_both_sources() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("mixed.pdf"));

    let out = extract_file(&path, &config())
        .await
        .expect("extraction should succeed");

    assert!(out.stats.text_layer_pages > 0);
    assert!(out.stats.ocr_pages > 0);
    let nums: Vec<_> = out.pages.iter().map(|p| p.page_num).collect();
    assert_eq!(nums, (1..=out.pages.len()).collect::<Vec<_>>());
}
