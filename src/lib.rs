//! # edgequake-pdf2img
//!
//! Convert the pages of a PDF document into PNG or JPEG images.
//!
//! Each selected page is rasterised with pdfium at a fixed DPI, optionally
//! rotated, normalised to the requested color mode and written to the output
//! directory as `{page_number}.{extension}`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    must exist and be a regular file
//!  ├─ 2. Prepare  create the output directory or clear its files
//!  ├─ 3. Open     load the document via pdfium, read the page count
//!  ├─ 4. Range    clamp the 1-based request to the document
//!  ├─ 5. Render   rasterise one page (color, grayscale or black & white)
//!  ├─ 6. Process  rotation + color-mode normalisation
//!  └─ 7. Store    encode as {page}.png / {page}.jpeg / {page}.jpg
//! ```
//!
//! Steps 5–7 repeat for every page in the range, strictly in order. The first
//! failure stops the run and is reported with its page number.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2img::{convert, ConversionConfig, ConversionOptions, ImageFormat, Resolution};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::new(ConversionOptions {
//!         input_path: Some("document.pdf".into()),
//!         output_directory: Some("pages".into()),
//!         image_format: ImageFormat::Png,
//!         resolution: Resolution::High,
//!         start_page: Some(2),
//!         end_page: Some(4),
//!         ..Default::default()
//!     })?;
//!     let summary = convert(&config).await?;
//!     eprintln!("wrote {} images in {}ms", summary.pages_written(), summary.duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom stages
//!
//! Rendering, post-processing and storage are traits
//! ([`PageRenderer`], [`ImageProcessor`], [`ImageStore`]). Inject your own
//! through [`Pdf2ImageConverter::new`] to render with another engine or write
//! somewhere other than the local filesystem.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2img = { version = "0.1", default-features = false }
//! ```
//!
//! ## Locating pdfium
//!
//! `PDFIUM_LIB_PATH` may point at a pdfium shared library. Otherwise the
//! library is looked up in the working directory, then on the system path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionConfig, ConversionOptions, ImageFormat, ImageMode, RenderingQuality, Resolution,
};
pub use convert::{convert, convert_sync, convert_with_progress, inspect, Pdf2ImageConverter};
pub use error::{ErrorKind, Pdf2ImgError};
pub use output::{ConversionSummary, DocumentMetadata};
pub use pipeline::process::{DefaultImageProcessor, ImageProcessor};
pub use pipeline::range::PageRange;
pub use pipeline::raster::{PixelRepresentation, RenderedImage};
pub use pipeline::render::{Document, PageRenderer, PdfiumRenderer};
pub use pipeline::store::{ImageStore, LocalFileSystemStore};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
