//! Pipeline stages for PDF-to-image conversion.
//!
//! Each submodule implements exactly one step. The engine-facing steps are
//! traits ([`render::PageRenderer`], [`process::ImageProcessor`],
//! [`store::ImageStore`]) so the orchestrator in [`crate::convert`] can be
//! driven by pdfium in production and by in-memory fakes in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ store.prepare ──▶ render.open ──▶ range ──┐
//!                                                     ▼
//!          ┌──── for each page: render ──▶ process ──▶ store
//!          ▼
//!     store.cleanup
//! ```
//!
//! 1. [`input`]   — the document must be an existing regular file
//! 2. [`range`]   — 1-based request → clamped 0-based inclusive range
//! 3. [`render`]  — open the document and rasterise one page via pdfium
//! 4. [`process`] — rotation, inert cropping, color-mode normalisation
//! 5. [`store`]   — directory preparation and `{page}.{ext}` writes
//!
//! [`raster`] holds the pixel buffer type shared by all of them.

pub mod input;
pub mod process;
pub mod range;
pub mod raster;
pub mod render;
pub mod store;
