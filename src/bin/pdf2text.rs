//! CLI binary for pdf2text.
//!
//! `serve` runs the HTTP service; `extract` runs the same pipeline on a
//! local file. Both map their flags onto `ExtractionConfig`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2text::server::{self, ServerConfig};
use pdf2text::{
    ExtractionConfig, ExtractionProgressCallback, PdfiumBackend, ProgressCallback, TextExtractor,
    TextSource,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar for `extract`: one log line per page, tagged with its source.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        source: TextSource,
        text_len: usize,
    ) {
        let tag = match source {
            TextSource::TextLayer => dim("text"),
            TextSource::Ocr => cyan("ocr "),
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            green("✓"),
            page_num,
            total_pages,
            tag,
            dim(&format!("{text_len:>6} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, ocr_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages extracted ({} via OCR)",
            green("✔"),
            bold(&total_pages.to_string()),
            ocr_pages
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on :8000
  pdf2text serve

  # Upload a document
  curl -F file=@scan.pdf http://localhost:8000/upload

  # Extract a local file to stdout
  pdf2text extract scan.pdf

  # Per-page details as JSON, German OCR
  pdf2text extract --json --lang deu brief.pdf -o brief.json

ENVIRONMENT VARIABLES:
  PDF2TEXT_HOST           Bind address for `serve`
  PDF2TEXT_PORT           Port for `serve`
  PDF2TEXT_MAX_UPLOAD_MB  Upload size limit for `serve`
  PDF2TEXT_DPI            OCR rendering DPI
  PDF2TEXT_LANG           Tesseract language(s), e.g. eng+deu
  PDF2TEXT_PSM            Tesseract page segmentation mode
  PDF2TEXT_TEMP_DIR       Directory for per-request scratch files
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  TESSERACT_PATH          Path to the tesseract executable
  RUST_LOG                Overrides -v / -q log filtering
"#;

/// Extract text from PDFs, with per-page OCR fallback.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2text",
    version,
    about = "Extract text from PDFs, OCR'ing pages that have no text layer",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2TEXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (POST /upload, GET /health).
    Serve(ServeArgs),
    /// Extract text from a local PDF file.
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "PDF2TEXT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "PDF2TEXT_PORT", default_value_t = 8000)]
    port: u16,

    /// Largest accepted upload, in MiB.
    #[arg(long, env = "PDF2TEXT_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Local PDF file.
    input: PathBuf,

    /// Write the result to this file instead of stdout.
    #[arg(short, long, env = "PDF2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Output structured JSON (ExtractionOutput) instead of plain text.
    #[arg(long, env = "PDF2TEXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TEXT_NO_PROGRESS")]
    no_progress: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

/// Flags shared by both subcommands.
#[derive(Args, Debug)]
struct EngineArgs {
    /// Rendering DPI for pages sent to OCR (72–600).
    #[arg(long, env = "PDF2TEXT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Tesseract language(s), e.g. `eng` or `eng+deu`.
    #[arg(long, env = "PDF2TEXT_LANG", default_value = "eng")]
    lang: String,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "PDF2TEXT_PSM", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: u8,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2TEXT_PASSWORD")]
    password: Option<String>,

    /// Directory for scratch files (default: system temp dir).
    #[arg(long, env = "PDF2TEXT_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Path to the tesseract executable.
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Path to libpdfium, or the directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would interleave with the progress bar, so `extract`
    // only shows errors unless -v is given.
    let show_progress = match &cli.command {
        Command::Extract(args) => !cli.quiet && !args.no_progress && !args.json,
        Command::Serve(_) => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Extract(args) => run_extract(args, show_progress, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = build_config(&args.engine, None)?;
    if let Err(e) = PdfiumBackend::new(&config).check_binding() {
        tracing::warn!("{}; uploads will fail until pdfium is installed", e);
    }

    let server_config = ServerConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
    };

    let extractor = Arc::new(TextExtractor::new(config));
    server::serve(server_config, extractor)
        .await
        .context("Server failed")
}

async fn run_extract(args: ExtractArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&args.engine, progress_cb)?;

    let output = TextExtractor::new(config)
        .extract_file(&args.input)
        .await
        .with_context(|| format!("Extraction failed for {}", args.input.display()))?;

    let mut rendered = if args.json {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")?
    } else {
        output.text.clone()
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    if let Some(ref path) = args.output {
        tokio::fs::write(path, rendered.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !quiet {
            eprintln!(
                "{}  {} pages  {}ms  →  {}",
                green("✔"),
                output.stats.total_pages,
                output.stats.total_duration_ms,
                bold(&path.display().to_string()),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !quiet && !show_progress && !args.json {
        eprintln!(
            "Extracted {} pages ({} via OCR) in {}ms",
            output.stats.total_pages, output.stats.ocr_pages, output.stats.total_duration_ms
        );
    }

    Ok(())
}

/// Map engine flags to `ExtractionConfig`.
fn build_config(args: &EngineArgs, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .dpi(args.dpi)
        .ocr_language(args.lang.clone())
        .page_segmentation_mode(args.psm)
        .tesseract_path(args.tesseract.clone());

    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref dir) = args.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    if let Some(ref lib) = args.pdfium {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
