//! Input validation: the document must be an existing regular file.
//!
//! This runs before the output directory is touched, so a typo in the input
//! path never wipes a previous run's images.

use crate::error::Pdf2ImgError;
use std::path::Path;
use tracing::debug;

/// Check that `path` exists and is a regular file.
pub fn validate_input(path: &Path) -> Result<(), Pdf2ImgError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => {
            return Err(Pdf2ImgError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    };

    if !metadata.is_file() {
        return Err(Pdf2ImgError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(())
}
