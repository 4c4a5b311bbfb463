//! Error types for the edgequake-pdf2img library.
//!
//! A single enum, [`Pdf2ImgError`], covers every failure. Variants are grouped
//! by *cause* and [`Pdf2ImgError::kind`] classifies them so callers can branch
//! on "was it my config, my input, or the engine?" without matching every
//! variant.
//!
//! Stage errors raised while a page is being rendered, processed or stored are
//! wrapped into [`Pdf2ImgError::PageFailed`], which names the 1-based page and
//! keeps the original error as its `source`. The first such failure aborts the
//! whole run; files already written for earlier pages stay on disk.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// A required option was missing or an option had an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The input path exists but is a directory, socket, etc.
    #[error("Input is not a regular file: '{path}'")]
    NotAFile { path: PathBuf },

    // ── Range errors ──────────────────────────────────────────────────────
    /// The requested pages do not overlap the document after clamping.
    ///
    /// `start` and `end` are the clamped values, reported 1-based.
    #[error("Invalid page range: start={start}, end={end} (document has {total} pages)")]
    InvalidPageRange { start: i64, end: i64, total: usize },

    // ── Storage errors ────────────────────────────────────────────────────
    /// The output directory could not be created or listed.
    #[error("Failed to prepare output directory '{path}': {source}")]
    OutputDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding or writing a page image failed.
    #[error("Failed to write image '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Page numbers handed to the store are 1-based.
    #[error("Page number must be positive, got {page}")]
    InvalidPageNumber { page: usize },

    /// The store was handed an image with no pixels.
    #[error("Cannot store an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// pdfium could not open the document.
    #[error("Failed to open PDF '{path}': {detail}")]
    DocumentOpenFailed { path: PathBuf, detail: String },

    /// pdfium returned an error for a specific page (1-based).
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium, place the library in the working\n\
directory, or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Processing errors ─────────────────────────────────────────────────
    /// Post-processing was handed an unusable pixel buffer.
    #[error("Image processing failed: {0}")]
    ProcessFailed(String),

    // ── Run-level errors ──────────────────────────────────────────────────
    /// A stage failed while converting `page` (1-based); the run was aborted.
    #[error("Failed to process page {page}: {source}")]
    PageFailed {
        page: usize,
        #[source]
        source: Box<Pdf2ImgError>,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`Pdf2ImgError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Range,
    Storage,
    Render,
    Process,
    Internal,
}

impl Pdf2ImgError {
    /// Classify the error by cause.
    ///
    /// [`Pdf2ImgError::PageFailed`] reports the kind of the error it wraps.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2ImgError::InvalidConfig(_) => ErrorKind::Configuration,
            Pdf2ImgError::FileNotFound { .. } | Pdf2ImgError::NotAFile { .. } => {
                ErrorKind::Validation
            }
            Pdf2ImgError::InvalidPageRange { .. } => ErrorKind::Range,
            Pdf2ImgError::OutputDirectoryFailed { .. }
            | Pdf2ImgError::OutputWriteFailed { .. }
            | Pdf2ImgError::InvalidPageNumber { .. }
            | Pdf2ImgError::EmptyImage { .. } => ErrorKind::Storage,
            Pdf2ImgError::DocumentOpenFailed { .. }
            | Pdf2ImgError::RenderFailed { .. }
            | Pdf2ImgError::PdfiumBindingFailed(_) => ErrorKind::Render,
            Pdf2ImgError::ProcessFailed(_) => ErrorKind::Process,
            Pdf2ImgError::PageFailed { source, .. } => source.kind(),
            Pdf2ImgError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The 1-based page a run-level failure refers to, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            Pdf2ImgError::PageFailed { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Wrap a stage error into the run-level error for `page` (1-based).
    pub(crate) fn on_page(self, page: usize) -> Self {
        Pdf2ImgError::PageFailed {
            page,
            source: Box::new(self),
        }
    }
}
