//! Output persistence: directory preparation and per-page file writes.
//!
//! Output files are named `{page}.{ext}` with a 1-based page number, so a
//! run over pages 2–4 produces `2.png`, `3.png`, `4.png`. Preparing the
//! directory removes stale regular files from earlier runs, which makes
//! repeated runs into the same directory yield the same file set.

use crate::config::ImageFormat;
use crate::error::Pdf2ImgError;
use crate::pipeline::raster::RenderedImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The persistence boundary.
pub trait ImageStore {
    /// Make `output_directory` ready to receive pages.
    fn prepare(&self, output_directory: &Path) -> Result<(), Pdf2ImgError>;

    /// Encode and persist one page, returning where it was written.
    fn store(
        &self,
        image: &RenderedImage,
        page_number: usize,
        output_directory: &Path,
        format: ImageFormat,
    ) -> Result<PathBuf, Pdf2ImgError>;

    /// Release whatever `prepare` acquired. Runs on every exit path.
    fn cleanup(&self, output_directory: &Path) {
        let _ = output_directory;
    }
}

/// Writes pages to a local directory with the `image` crate encoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystemStore;

impl ImageStore for LocalFileSystemStore {
    /// Create the directory (and parents) if missing; otherwise delete every
    /// regular file directly inside it. Subdirectories are left alone and a
    /// file that cannot be deleted is logged and skipped.
    fn prepare(&self, output_directory: &Path) -> Result<(), Pdf2ImgError> {
        let dir_error = |source| Pdf2ImgError::OutputDirectoryFailed {
            path: output_directory.to_path_buf(),
            source,
        };

        if !output_directory.exists() {
            std::fs::create_dir_all(output_directory).map_err(dir_error)?;
            info!("Created output directory: {}", output_directory.display());
            return Ok(());
        }

        for entry in std::fs::read_dir(output_directory).map_err(dir_error)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Deleted existing file: {}", path.display()),
                Err(e) => warn!("Failed to delete file {}: {}", path.display(), e),
            }
        }
        Ok(())
    }

    fn store(
        &self,
        image: &RenderedImage,
        page_number: usize,
        output_directory: &Path,
        format: ImageFormat,
    ) -> Result<PathBuf, Pdf2ImgError> {
        if page_number < 1 {
            return Err(Pdf2ImgError::InvalidPageNumber { page: page_number });
        }
        if image.is_empty() {
            return Err(Pdf2ImgError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let path = output_path(output_directory, page_number, format);
        let written = match image {
            RenderedImage::Rgb(buf) => buf.save_with_format(&path, format.encoder()),
            RenderedImage::Gray(buf) | RenderedImage::Bilevel(buf) => {
                buf.save_with_format(&path, format.encoder())
            }
        };
        written.map_err(|source| Pdf2ImgError::OutputWriteFailed {
            path: path.clone(),
            source,
        })?;

        debug!("Saved page {} to: {}", page_number, path.display());
        Ok(path)
    }
}

/// `{output_directory}/{page_number}.{extension}`
pub fn output_path(output_directory: &Path, page_number: usize, format: ImageFormat) -> PathBuf {
    output_directory.join(format!("{}.{}", page_number, format.extension()))
}
