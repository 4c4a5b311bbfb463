//! Conversion entry points and the page-loop orchestrator.
//!
//! [`Pdf2ImageConverter`] drives one run through a fixed sequence:
//!
//! ```text
//! validate → prepare storage → open document → resolve range
//!          → { render → process → store }*  → cleanup storage
//! ```
//!
//! The first error anywhere aborts the run. Errors raised inside the page
//! loop are wrapped with the 1-based page number. Files written for earlier
//! pages are left on disk; whether they count as valid output is the caller's
//! decision.
//!
//! Release is tied to scope: the document handle is closed when it is
//! dropped, and storage cleanup runs from a drop guard created right after
//! `prepare` succeeds. Both happen on success, on error, and on panic.
//!
//! The free functions [`convert`], [`convert_sync`] and [`inspect`] wire the
//! pdfium renderer, the default processor and the local filesystem store
//! together for the common case.

use crate::config::{ConversionConfig, RenderingQuality};
use crate::error::Pdf2ImgError;
use crate::output::{ConversionSummary, DocumentMetadata};
use crate::pipeline::input;
use crate::pipeline::process::{DefaultImageProcessor, ImageProcessor};
use crate::pipeline::range::{self, PageRange};
use crate::pipeline::raster::RenderedImage;
use crate::pipeline::render::{Document, PageRenderer, PdfiumRenderer};
use crate::pipeline::store::{ImageStore, LocalFileSystemStore};
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Orchestrates one conversion at a time over injected stage implementations.
pub struct Pdf2ImageConverter<R, P = DefaultImageProcessor, S = LocalFileSystemStore> {
    renderer: R,
    processor: P,
    store: S,
    progress: Option<ProgressCallback>,
}

impl<R> Pdf2ImageConverter<R>
where
    R: PageRenderer,
{
    /// Use `renderer` with the default processor and the local filesystem store.
    pub fn with_renderer(renderer: R) -> Self {
        Self::new(renderer, DefaultImageProcessor, LocalFileSystemStore)
    }
}

impl<R, P, S> Pdf2ImageConverter<R, P, S>
where
    R: PageRenderer,
    P: ImageProcessor,
    S: ImageStore,
{
    pub fn new(renderer: R, processor: P, store: S) -> Self {
        Self {
            renderer,
            processor,
            store,
            progress: None,
        }
    }

    /// Receive per-page progress events.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Run the whole pipeline for `config`, blocking until done.
    pub fn convert(&self, config: &ConversionConfig) -> Result<ConversionSummary, Pdf2ImgError> {
        let started = Instant::now();
        let pdf_path = config.input_path();
        let output_directory = config.output_directory();

        // ── Step 1: Validate input ───────────────────────────────────────
        input::validate_input(pdf_path)?;

        info!("Starting PDF to image conversion: {}", pdf_path.display());
        info!(
            "Configuration - Format: {:?}, Mode: {:?}, Resolution: {} DPI",
            config.image_format(),
            config.image_mode(),
            config.resolution().dpi()
        );

        // ── Step 2: Prepare storage ──────────────────────────────────────
        self.store.prepare(output_directory)?;
        let _cleanup = CleanupGuard {
            store: &self.store,
            output_directory,
        };

        // ── Step 3: Open document ────────────────────────────────────────
        // Declared after the guard so the document closes before cleanup.
        let document = self.renderer.open(pdf_path)?;
        let total_pages = document.page_count();
        info!("PDF has {} pages", total_pages);

        // ── Step 4: Resolve page range ───────────────────────────────────
        let page_range = range::resolve(config.start_page(), config.end_page(), total_pages)?;
        info!(
            "Processing pages {} to {}",
            page_range.start() + 1,
            page_range.end() + 1
        );

        // ── Step 5: Render → process → store, page by page ───────────────
        let mut state = RunState::new(config, &document, page_range);
        self.run_pages(&mut state)?;

        let files = state.into_written();
        info!("Successfully converted {} pages", files.len());
        if let Some(ref cb) = self.progress {
            cb.on_conversion_complete(page_range.len(), files.len());
        }

        Ok(ConversionSummary {
            total_pages,
            page_range,
            files,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn run_pages<'r>(&'r self, state: &mut RunState<'_, R::Document<'r>>) -> Result<(), Pdf2ImgError> {
        let selected = state.page_range.len();
        if let Some(ref cb) = self.progress {
            cb.on_conversion_start(selected);
        }

        for page_index in state.page_range.indices() {
            let page_num = page_index + 1;
            state.page_index = page_index;
            debug!("Processing page {}", page_num);
            if let Some(ref cb) = self.progress {
                cb.on_page_start(page_num, selected);
            }

            match self.process_page(state) {
                Ok(path) => {
                    debug!("Successfully processed page {}", page_num);
                    if let Some(ref cb) = self.progress {
                        cb.on_page_complete(page_num, selected, &path);
                    }
                    state.written.push(path);
                }
                Err(e) => {
                    warn!("Page {} failed: {}", page_num, e);
                    if let Some(ref cb) = self.progress {
                        cb.on_page_error(page_num, selected, &e.to_string());
                    }
                    return Err(e.on_page(page_num));
                }
            }
        }
        Ok(())
    }

    /// Render, process and store the page at `state.page_index`.
    fn process_page<'r>(&'r self, state: &mut RunState<'_, R::Document<'r>>) -> Result<PathBuf, Pdf2ImgError> {
        let config = state.config;

        let rendered = self.renderer.render(
            state.document,
            state.page_index,
            config.resolution().scale(),
            config.image_mode().representation(),
        )?;
        state.image = Some(rendered);

        let image = state.take_image()?;
        let processed = self.processor.process(
            image,
            config.rotation_degrees(),
            config.image_mode().representation(),
            config.enable_cropping(),
        )?;
        state.image = Some(processed);

        let image = state.take_image()?;
        self.store.store(
            &image,
            state.page_index + 1,
            config.output_directory(),
            config.image_format(),
        )
    }
}

/// Values shared by the stages of one run.
///
/// Created after the document is opened and dropped when the run returns;
/// never shared between runs.
struct RunState<'a, D> {
    config: &'a ConversionConfig,
    document: &'a D,
    page_range: PageRange,
    page_index: usize,
    image: Option<RenderedImage>,
    written: Vec<PathBuf>,
}

impl<'a, D> RunState<'a, D> {
    fn new(config: &'a ConversionConfig, document: &'a D, page_range: PageRange) -> Self {
        Self {
            config,
            document,
            page_range,
            page_index: page_range.start(),
            image: None,
            written: Vec::with_capacity(page_range.len()),
        }
    }

    /// Move the in-flight image out; the next stage replaces it.
    fn take_image(&mut self) -> Result<RenderedImage, Pdf2ImgError> {
        self.image.take().ok_or_else(|| {
            Pdf2ImgError::ProcessFailed(format!("no image for page {}", self.page_index + 1))
        })
    }

    fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

/// Calls [`ImageStore::cleanup`] when dropped.
struct CleanupGuard<'a, S: ImageStore> {
    store: &'a S,
    output_directory: &'a Path,
}

impl<S: ImageStore> Drop for CleanupGuard<'_, S> {
    fn drop(&mut self) {
        self.store.cleanup(self.output_directory);
        debug!("Storage cleanup done: {}", self.output_directory.display());
    }
}

// ── pdfium-backed entry points ───────────────────────────────────────────

/// Convert a PDF to images with pdfium, on the blocking thread pool.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2img::{convert, ConversionConfig, ConversionOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ConversionConfig::new(ConversionOptions {
///         input_path: Some("document.pdf".into()),
///         output_directory: Some("pages".into()),
///         ..Default::default()
///     })?;
///     let summary = convert(&config).await?;
///     eprintln!("{} pages written", summary.pages_written());
///     Ok(())
/// }
/// ```
pub async fn convert(config: &ConversionConfig) -> Result<ConversionSummary, Pdf2ImgError> {
    convert_with_progress(config, None).await
}

/// [`convert`] with an optional progress callback.
///
/// pdfium is bound and used entirely inside one `spawn_blocking` task; the
/// pages are still processed sequentially.
pub async fn convert_with_progress(
    config: &ConversionConfig,
    progress: Option<ProgressCallback>,
) -> Result<ConversionSummary, Pdf2ImgError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_blocking(&config, progress))
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Blocking counterpart of [`convert`]; does not need a tokio runtime.
pub fn convert_sync(config: &ConversionConfig) -> Result<ConversionSummary, Pdf2ImgError> {
    convert_blocking(config, None)
}

fn convert_blocking(
    config: &ConversionConfig,
    progress: Option<ProgressCallback>,
) -> Result<ConversionSummary, Pdf2ImgError> {
    // Validate first so a bad path is reported before pdfium binding errors.
    input::validate_input(config.input_path())?;
    let renderer = PdfiumRenderer::bind(config.rendering_quality())?;
    let mut converter = Pdf2ImageConverter::with_renderer(renderer);
    if let Some(cb) = progress {
        converter = converter.with_progress(cb);
    }
    converter.convert(config)
}

/// Read PDF metadata without converting any page.
pub async fn inspect(pdf_path: impl AsRef<Path>) -> Result<DocumentMetadata, Pdf2ImgError> {
    let path = pdf_path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || {
        input::validate_input(&path)?;
        PdfiumRenderer::bind(RenderingQuality::default())?.metadata(&path)
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Metadata task panicked: {}", e)))?
}
