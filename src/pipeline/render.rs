//! PDF rasterisation: the engine boundary and its pdfium implementation.
//!
//! [`PageRenderer`] is the only way the pipeline touches the document. It
//! opens a file into a scoped [`Document`] handle (closed when dropped) and
//! turns one page at a time into a [`RenderedImage`].
//!
//! Pages are rendered inside the page loop, so at most one page bitmap is
//! alive at a time.

use crate::config::RenderingQuality;
use crate::error::Pdf2ImgError;
use crate::output::DocumentMetadata;
use crate::pipeline::raster::{PixelRepresentation, RenderedImage};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// An opened document. Dropping it releases the engine handle.
pub trait Document {
    fn page_count(&self) -> usize;
}

/// The rasterisation boundary.
pub trait PageRenderer {
    /// Open-document handle, borrowing the renderer for its lifetime.
    type Document<'r>: Document
    where
        Self: 'r;

    /// Open the document at `path`.
    fn open<'r>(&'r self, path: &Path) -> Result<Self::Document<'r>, Pdf2ImgError>;

    /// Rasterise page `page_index` (0-based) at `scale` × 72 DPI into
    /// `target`.
    ///
    /// Must fail rather than return a degraded image when the index is out of
    /// range or the engine cannot draw the page.
    fn render<'r>(
        &'r self,
        document: &Self::Document<'r>,
        page_index: usize,
        scale: f32,
        target: PixelRepresentation,
    ) -> Result<RenderedImage, Pdf2ImgError>;
}

/// Bind to a pdfium shared library.
///
/// Resolution order:
/// 1. `PDFIUM_LIB_PATH`, the path to an existing library file;
/// 2. the platform library name in the working directory;
/// 3. the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2ImgError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => {
            debug!("Binding pdfium from PDFIUM_LIB_PATH={}", path);
            Pdfium::bind_to_library(&path)
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

impl Document for PdfDocument<'_> {
    fn page_count(&self) -> usize {
        self.pages().len() as usize
    }
}

/// [`PageRenderer`] backed by pdfium.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
    quality: RenderingQuality,
    password: Option<String>,
}

impl PdfiumRenderer {
    pub fn new(pdfium: Pdfium, quality: RenderingQuality) -> Self {
        Self {
            pdfium,
            quality,
            password: None,
        }
    }

    /// Bind the library with [`bind_pdfium`] and wrap it.
    pub fn bind(quality: RenderingQuality) -> Result<Self, Pdf2ImgError> {
        Ok(Self::new(bind_pdfium()?, quality))
    }

    /// User password for encrypted documents.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Translate the advisory quality hints into pdfium render flags.
    ///
    /// pdfium has no fractional-metrics switch; that hint is accepted and
    /// ignored.
    fn render_config(&self, scale: f32, target: PixelRepresentation) -> PdfRenderConfig {
        PdfRenderConfig::new()
            .scale_page_by_factor(scale)
            .set_path_smoothing(self.quality.anti_aliasing)
            .set_image_smoothing(self.quality.anti_aliasing)
            .set_text_smoothing(self.quality.text_anti_aliasing)
            .use_grayscale_rendering(target != PixelRepresentation::Rgb)
    }

    /// Read document metadata without rendering any page.
    pub fn metadata(&self, path: &Path) -> Result<DocumentMetadata, Pdf2ImgError> {
        let document = self.open(path)?;
        let metadata = document.metadata();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        Ok(DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            page_count: document.page_count(),
            pdf_version: format!("{:?}", document.version()),
        })
    }
}

impl PageRenderer for PdfiumRenderer {
    type Document<'r> = PdfDocument<'r>;

    fn open<'r>(&'r self, path: &Path) -> Result<PdfDocument<'r>, Pdf2ImgError> {
        debug!("Loading PDF document: {}", path.display());
        let document = self
            .pdfium
            .load_pdf_from_file(path, self.password.as_deref())
            .map_err(|e| Pdf2ImgError::DocumentOpenFailed {
                path: path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;
        info!("PDF loaded: {} pages", document.page_count());
        Ok(document)
    }

    fn render<'r>(
        &'r self,
        document: &PdfDocument<'r>,
        page_index: usize,
        scale: f32,
        target: PixelRepresentation,
    ) -> Result<RenderedImage, Pdf2ImgError> {
        let page_num = page_index + 1;
        let pages = document.pages();
        let total = pages.len() as usize;
        if page_index >= total {
            return Err(Pdf2ImgError::RenderFailed {
                page: page_num,
                detail: format!("page index out of range (document has {total} pages)"),
            });
        }

        let index: PdfPageIndex = page_index
            .try_into()
            .map_err(|_| Pdf2ImgError::RenderFailed {
                page: page_num,
                detail: format!("page index {page_index} exceeds pdfium's index type"),
            })?;

        let page = pages.get(index).map_err(|e| Pdf2ImgError::RenderFailed {
            page: page_num,
            detail: format!("{:?}", e),
        })?;

        let bitmap = page
            .render_with_config(&self.render_config(scale, target))
            .map_err(|e| Pdf2ImgError::RenderFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} at scale {:.3} → {}x{} px",
            page_num,
            scale,
            image.width(),
            image.height()
        );

        Ok(RenderedImage::from_dynamic(image, target))
    }
}
