//! Result types returned by the conversion entry points.

use crate::pipeline::range::PageRange;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages that were converted (0-based, inclusive).
    pub page_range: PageRange,
    /// Written files, in page order.
    pub files: Vec<PathBuf>,
    /// Wall-clock duration of the whole run.
    pub duration_ms: u64,
}

impl ConversionSummary {
    /// Number of images written.
    pub fn pages_written(&self) -> usize {
        self.files.len()
    }
}

/// Document-level information read without rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
