//! Progress-callback trait for per-page conversion events.
//!
//! Attach an [`Arc<dyn ConversionProgressCallback>`] with
//! [`crate::convert::Pdf2ImageConverter::with_progress`] to receive events as
//! the pipeline works through the page range. Pages are processed one at a
//! time in ascending order, so events arrive in page order.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2img::ConversionProgressCallback;
//! use std::path::Path;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, path: &Path) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} → {}", page_num, total_pages, path.display());
//!     }
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// `Send + Sync` so a converter carrying a callback can be moved onto a
/// blocking thread by the async entry point. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the page range is known, before the first page renders.
    ///
    /// `total_pages` is the number of pages that will be processed, not the
    /// document length.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page (1-indexed) is rendered.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page has been written to `path`.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, path: &Path) {
        let _ = (page_num, total_pages, path);
    }

    /// Called when a page fails. The run stops after this event.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page of the range has been written.
    fn on_conversion_complete(&self, total_pages: usize, written: usize) {
        let _ = (total_pages, written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
