//! CLI binary for edgequake-pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionOptions` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2img::{
    convert_with_progress, inspect, ConversionConfig, ConversionOptions,
    ConversionProgressCallback, ImageFormat, ImageMode, ProgressCallback, RenderingQuality,
    Resolution,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

/// Terminal progress callback: a live progress bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the page currently being rendered.
    page_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` tells us how many pages to expect.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
        self.bar.reset_eta();
    }

    fn page_elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, _total: usize, path: &Path) {
        let elapsed = self.page_elapsed_secs();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.bar.println(format!(
            "  {} Page {:>3}  {:<12}  {}",
            green("✓"),
            page_num,
            dim(&name),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, _total: usize, error: &str) {
        let elapsed = self.page_elapsed_secs();

        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}  {}  {}",
            red("✗"),
            page_num,
            red(&msg),
            dim(&format!("{elapsed:.1}s")),
        ));
        self.bar.finish_and_clear();
    }

    fn on_conversion_complete(&self, total_pages: usize, written: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}/{} pages rendered",
            green("✔"),
            bold(&written.to_string()),
            total_pages
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Every page as 150 DPI color PNG
  pdf2img document.pdf -o pages/

  # Pages 2 to 4 at 300 DPI
  pdf2img --pages 2-4 --dpi 300 document.pdf -o pages/

  # Grayscale JPEG, rotated a quarter turn clockwise
  pdf2img --format jpeg --mode grayscale --rotate 90 scan.pdf -o out/

  # Options from a JSON file, overridden on the command line
  pdf2img --config job.json --mode black-and-white

  # Inspect PDF metadata
  pdf2img --inspect-only document.pdf

  # Machine-readable summary
  pdf2img --json document.pdf -o pages/ > summary.json

OUTPUT:
  One file per page named {page}.{ext}, numbered from 1 in document order.
  Existing files directly inside the output directory are deleted first;
  subdirectories are left alone.

ENVIRONMENT VARIABLES:
  PDF2IMG_*         Fallback for every flag (e.g. PDF2IMG_DPI=300)
  PDFIUM_LIB_PATH   Path to a libpdfium shared library
  RUST_LOG          Overrides the log filter
"#;

/// Render PDF pages to PNG or JPEG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Render PDF pages to PNG or JPEG images",
    long_about = "Rasterise the pages of a PDF document with pdfium and write one image per \
page. Choose the output format, color mode, resolution, page range and rotation.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    #[arg(env = "PDF2IMG_INPUT")]
    input: Option<PathBuf>,

    /// Directory receiving the page images.
    #[arg(short, long, env = "PDF2IMG_OUTPUT")]
    output: Option<PathBuf>,

    /// Load options from a JSON file; flags given here take precedence.
    #[arg(long, env = "PDF2IMG_CONFIG")]
    config: Option<PathBuf>,

    /// Output format: png, jpeg, jpg.
    #[arg(long, env = "PDF2IMG_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Color mode: color, grayscale, black-and-white.
    #[arg(long, env = "PDF2IMG_MODE", value_enum)]
    mode: Option<ModeArg>,

    /// Rendering DPI: 96, 150 or 300.
    #[arg(long, env = "PDF2IMG_DPI", value_parser = parse_dpi)]
    dpi: Option<Resolution>,

    /// Page selection: all, 5, or 2-4 (1-based, inclusive).
    #[arg(long, env = "PDF2IMG_PAGES", allow_hyphen_values = true)]
    pages: Option<String>,

    /// Clockwise rotation in degrees; negative values rotate counter-clockwise.
    #[arg(long, env = "PDF2IMG_ROTATE", allow_hyphen_values = true)]
    rotate: Option<i32>,

    /// Request cropping (accepted, currently no effect).
    #[arg(long, env = "PDF2IMG_CROP")]
    crop: bool,

    /// Disable anti-aliasing hints for faster rendering.
    #[arg(long, env = "PDF2IMG_FAST")]
    fast: bool,

    /// Print the conversion summary as JSON on stdout.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Jpeg,
    Jpg,
}

impl From<FormatArg> for ImageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Jpg => ImageFormat::Jpg,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Color,
    Grayscale,
    BlackAndWhite,
}

impl From<ModeArg> for ImageMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Color => ImageMode::Color,
            ModeArg::Grayscale => ImageMode::Grayscale,
            ModeArg::BlackAndWhite => ImageMode::BlackAndWhite,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters; INFO logs would
    // interleave with it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let input = cli
            .input
            .as_deref()
            .context("An input PDF is required with --inspect-only")?;
        let meta = inspect(input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let options = build_options(&cli)?;
    let config = ConversionConfig::new(options).context("Invalid configuration")?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    // ── Run conversion ───────────────────────────────────────────────────
    let summary = convert_with_progress(&config, progress_cb)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            summary.pages_written(),
            summary.duration_ms,
            bold(&config.output_directory().display().to_string()),
        );
    }

    Ok(())
}

/// Start from the `--config` file (or defaults) and apply every flag given.
fn build_options(cli: &Cli) -> Result<ConversionOptions> {
    let mut options = match cli.config {
        Some(ref path) => ConversionOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {:?}", path))?,
        None => ConversionOptions::default(),
    };

    if let Some(ref input) = cli.input {
        options.input_path = Some(input.clone());
    }
    if let Some(ref output) = cli.output {
        options.output_directory = Some(output.clone());
    }
    if let Some(format) = cli.format {
        options.image_format = format.into();
    }
    if let Some(mode) = cli.mode {
        options.image_mode = mode.into();
    }
    if let Some(resolution) = cli.dpi {
        options.resolution = resolution;
    }
    if let Some(ref pages) = cli.pages {
        let (start, end) = parse_pages(pages)?;
        options.start_page = start;
        options.end_page = end;
    }
    if let Some(degrees) = cli.rotate {
        options.rotation_degrees = degrees;
    }
    if cli.crop {
        options.enable_cropping = true;
    }
    if cli.fast {
        options.rendering_quality = RenderingQuality::fast();
    }

    Ok(options)
}

/// Parse `--dpi` into one of the supported presets.
fn parse_dpi(s: &str) -> std::result::Result<Resolution, String> {
    let dpi: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    Resolution::from_dpi(dpi).ok_or_else(|| format!("unsupported DPI {dpi} (use 96, 150 or 300)"))
}

/// Parse `--pages` into 1-based `(start, end)` bounds.
///
/// Bounds are only parsed here; clamping and empty-range errors come from
/// the library.
fn parse_pages(s: &str) -> Result<(Option<i64>, Option<i64>)> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok((None, None));
    }

    // Range: "2-4", open ends allowed: "3-" or "-4"
    if let Some((start, end)) = s.split_once('-') {
        let start = parse_bound(start).context("Invalid start page in range")?;
        let end = parse_bound(end).context("Invalid end page in range")?;
        return Ok((start, end));
    }

    // Single page: "5"
    let page: i64 = s.parse().context("Invalid page number")?;
    Ok((Some(page), Some(page)))
}

fn parse_bound(s: &str) -> Result<Option<i64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    Ok(Some(s.parse::<i64>()?))
}
