//! Page-range resolution: 1-based user requests → 0-based inclusive indices.
//!
//! Out-of-bounds requests are clamped to the document rather than rejected,
//! so `--pages 1-1000` on a 20-page file simply means "all of it". The only
//! failure is a range that is empty after clamping, which includes every
//! request against a zero-page document.

use crate::error::Pdf2ImgError;
use serde::Serialize;

/// Zero-based, inclusive span of pages selected for one run.
///
/// Invariant: `start <= end < total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    start: usize,
    end: usize,
}

impl PageRange {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of pages in the range.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always `false`; a resolved range holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Page indices in ascending order.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Resolve an optional 1-based `start`/`end` request against `total_pages`.
pub fn resolve(
    start: Option<i64>,
    end: Option<i64>,
    total_pages: usize,
) -> Result<PageRange, Pdf2ImgError> {
    let total = total_pages as i64;
    let mut first = start.unwrap_or(1).saturating_sub(1);
    let mut last = end.unwrap_or(total).saturating_sub(1);

    if first < 0 {
        first = 0;
    }
    if last >= total {
        last = total - 1;
    }
    if first > last {
        return Err(Pdf2ImgError::InvalidPageRange {
            start: first + 1,
            end: last + 1,
            total: total_pages,
        });
    }

    Ok(PageRange {
        start: first as usize,
        end: last as usize,
    })
}
