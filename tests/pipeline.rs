//! Pipeline integration tests over in-memory renderers.
//!
//! The fake renderer below stands in for pdfium so every property of the page
//! loop (range selection, file naming, cleanup, failure reporting) can be
//! checked without a native library or sample documents.
//!
//! Run with:
//!   cargo test --test pipeline

use edgequake_pdf2img::{
    convert, convert_sync, ConversionConfig, ConversionOptions, ConversionProgressCallback,
    DefaultImageProcessor, Document, ErrorKind, ImageFormat, ImageMode, ImageProcessor, ImageStore,
    LocalFileSystemStore, PageRenderer, Pdf2ImageConverter, Pdf2ImgError, PixelRepresentation,
    RenderedImage, Resolution,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Fakes ────────────────────────────────────────────────────────────────────

/// Renders solid pages whose red channel encodes the 1-based page number.
struct FakeRenderer {
    pages: usize,
    width: u32,
    height: u32,
    /// 1-based page whose render fails.
    fail_on: Option<usize>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl FakeRenderer {
    fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            width: 8,
            height: 4,
            fail_on: None,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

struct FakeDocument {
    pages: usize,
    closed: Arc<AtomicUsize>,
}

impl Document for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }
}

impl Drop for FakeDocument {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl PageRenderer for FakeRenderer {
    type Document<'r>
        = FakeDocument
    where
        Self: 'r;

    fn open<'r>(&'r self, _path: &Path) -> Result<FakeDocument, Pdf2ImgError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeDocument {
            pages: self.pages,
            closed: Arc::clone(&self.closed),
        })
    }

    fn render<'r>(
        &'r self,
        document: &FakeDocument,
        page_index: usize,
        _scale: f32,
        target: PixelRepresentation,
    ) -> Result<RenderedImage, Pdf2ImgError> {
        if page_index >= document.pages {
            return Err(Pdf2ImgError::RenderFailed {
                page: page_index + 1,
                detail: "out of range".into(),
            });
        }
        if self.fail_on == Some(page_index + 1) {
            return Err(Pdf2ImgError::RenderFailed {
                page: page_index + 1,
                detail: "damaged content stream".into(),
            });
        }
        let shade = ((page_index + 1) * 20) as u8;
        let buf = RgbImage::from_pixel(self.width, self.height, Rgb([shade, 200, 40]));
        Ok(RenderedImage::from_dynamic(DynamicImage::ImageRgb8(buf), target))
    }
}

/// Processor that rejects one page and delegates the rest.
struct FailingProcessor {
    fail_on: usize,
    seen: AtomicUsize,
}

impl ImageProcessor for FailingProcessor {
    fn process(
        &self,
        image: RenderedImage,
        rotation_degrees: u32,
        target: PixelRepresentation,
        cropping_enabled: bool,
    ) -> Result<RenderedImage, Pdf2ImgError> {
        let page = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        if page == self.fail_on {
            return Err(Pdf2ImgError::ProcessFailed("unsupported pixel layout".into()));
        }
        DefaultImageProcessor.process(image, rotation_degrees, target, cropping_enabled)
    }
}

/// Local store that records lifecycle calls.
#[derive(Default, Clone)]
struct RecordingStore {
    prepared: Arc<AtomicUsize>,
    cleaned: Arc<AtomicUsize>,
    pages: Arc<Mutex<Vec<usize>>>,
}

impl ImageStore for RecordingStore {
    fn prepare(&self, output_directory: &Path) -> Result<(), Pdf2ImgError> {
        self.prepared.fetch_add(1, Ordering::SeqCst);
        LocalFileSystemStore.prepare(output_directory)
    }

    fn store(
        &self,
        image: &RenderedImage,
        page_number: usize,
        output_directory: &Path,
        format: ImageFormat,
    ) -> Result<PathBuf, Pdf2ImgError> {
        self.pages.lock().unwrap().push(page_number);
        LocalFileSystemStore.store(image, page_number, output_directory, format)
    }

    fn cleanup(&self, _output_directory: &Path) {
        self.cleaned.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl ConversionProgressCallback for EventLog {
    fn on_conversion_start(&self, total_pages: usize) {
        self.events.lock().unwrap().push(format!("start {total_pages}"));
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.events.lock().unwrap().push(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, _total_pages: usize, _path: &Path) {
        self.events.lock().unwrap().push(format!("done {page_num}"));
    }

    fn on_page_error(&self, page_num: usize, _total_pages: usize, _error: &str) {
        self.events.lock().unwrap().push(format!("error {page_num}"));
    }

    fn on_conversion_complete(&self, total_pages: usize, written: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("complete {written}/{total_pages}"));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A temp dir holding a placeholder `input.pdf`; the fakes never parse it.
fn workspace() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("input.pdf");
    std::fs::write(&pdf, b"%PDF-1.7\n").unwrap();
    (tmp, pdf)
}

fn config(pdf: &Path, out: &Path, edit: impl FnOnce(&mut ConversionOptions)) -> ConversionConfig {
    let mut options = ConversionOptions {
        input_path: Some(pdf.to_path_buf()),
        output_directory: Some(out.to_path_buf()),
        ..Default::default()
    };
    edit(&mut options);
    ConversionConfig::new(options).unwrap()
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ── Range selection and naming ───────────────────────────────────────────────

#[test]
fn selected_pages_only() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| {
        o.image_format = ImageFormat::Png;
        o.image_mode = ImageMode::Color;
        o.resolution = Resolution::High;
        o.start_page = Some(2);
        o.end_page = Some(4);
    });

    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(5));
    let summary = converter.convert(&cfg).unwrap();

    assert_eq!(file_names(&out), names(&["2.png", "3.png", "4.png"]));
    assert_eq!(summary.total_pages, 5);
    assert_eq!(summary.pages_written(), 3);
    assert_eq!(summary.page_range.start(), 1);
    assert_eq!(summary.page_range.end(), 3);
    assert_eq!(
        summary.files,
        vec![out.join("2.png"), out.join("3.png"), out.join("4.png")]
    );
}

#[test]
fn whole_document_by_default() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| o.image_format = ImageFormat::Jpg);

    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(3));
    converter.convert(&cfg).unwrap();

    assert_eq!(file_names(&out), names(&["1.jpg", "2.jpg", "3.jpg"]));
}

#[test]
fn oversized_end_is_clamped() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| {
        o.start_page = Some(-3);
        o.end_page = Some(1000);
        o.image_format = ImageFormat::Jpeg;
    });

    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(2));
    let summary = converter.convert(&cfg).unwrap();

    assert_eq!(summary.pages_written(), 2);
    assert_eq!(file_names(&out), names(&["1.jpeg", "2.jpeg"]));
}

#[test]
fn repeated_runs_yield_same_file_set() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| {
        o.start_page = Some(2);
        o.end_page = Some(4);
    });
    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(5));

    converter.convert(&cfg).unwrap();
    let first = file_names(&out);
    converter.convert(&cfg).unwrap();
    let second = file_names(&out);

    assert_eq!(first, second);
    assert_eq!(second, names(&["2.png", "3.png", "4.png"]));
}

#[test]
fn stale_files_are_removed_subdirectories_kept() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    std::fs::create_dir_all(out.join("keep")).unwrap();
    std::fs::write(out.join("9.png"), b"stale").unwrap();
    std::fs::write(out.join("notes.txt"), b"stale").unwrap();

    let cfg = config(&pdf, &out, |_| {});
    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(1));
    converter.convert(&cfg).unwrap();

    assert_eq!(file_names(&out), names(&["1.png", "keep"]));
}

// ── Failures ─────────────────────────────────────────────────────────────────

#[test]
fn start_beyond_document_writes_nothing() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| o.start_page = Some(9));

    let store = RecordingStore::default();
    let converter =
        Pdf2ImageConverter::new(FakeRenderer::with_pages(5), DefaultImageProcessor, store.clone());
    let err = converter.convert(&cfg).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(matches!(
        err,
        Pdf2ImgError::InvalidPageRange {
            start: 9,
            end: 5,
            total: 5
        }
    ));
    assert!(file_names(&out).is_empty());
    assert!(store.pages.lock().unwrap().is_empty());
    assert_eq!(store.cleaned.load(Ordering::SeqCst), 1);
}

#[test]
fn zero_page_document_is_a_range_error() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |_| {});

    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(0));
    let err = converter.convert(&cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn write_failure_names_page_and_keeps_earlier_pages() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    // A directory where 3.png should go survives prepare and breaks the write.
    std::fs::create_dir_all(out.join("3.png")).unwrap();
    let cfg = config(&pdf, &out, |_| {});

    let renderer = FakeRenderer::with_pages(5);
    let closed = Arc::clone(&renderer.closed);
    let store = RecordingStore::default();
    let converter = Pdf2ImageConverter::new(renderer, DefaultImageProcessor, store.clone());
    let err = converter.convert(&cfg).unwrap_err();

    assert_eq!(err.page(), Some(3));
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(err.to_string().contains("page 3"));
    match err {
        Pdf2ImgError::PageFailed { source, .. } => {
            assert!(matches!(*source, Pdf2ImgError::OutputWriteFailed { .. }))
        }
        other => panic!("expected PageFailed, got {other:?}"),
    }

    assert!(out.join("1.png").is_file());
    assert!(out.join("2.png").is_file());
    assert!(!out.join("4.png").exists());
    assert!(!out.join("5.png").exists());
    assert_eq!(*store.pages.lock().unwrap(), vec![1, 2, 3]);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(store.cleaned.load(Ordering::SeqCst), 1);
}

#[test]
fn render_failure_names_page_and_releases_resources() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |_| {});

    let mut renderer = FakeRenderer::with_pages(5);
    renderer.fail_on = Some(3);
    let closed = Arc::clone(&renderer.closed);
    let store = RecordingStore::default();
    let converter = Pdf2ImageConverter::new(renderer, DefaultImageProcessor, store.clone());
    let err = converter.convert(&cfg).unwrap_err();

    assert_eq!(err.page(), Some(3));
    assert_eq!(err.kind(), ErrorKind::Render);
    match err {
        Pdf2ImgError::PageFailed { source, .. } => {
            assert!(matches!(*source, Pdf2ImgError::RenderFailed { page: 3, .. }))
        }
        other => panic!("expected PageFailed, got {other:?}"),
    }

    assert_eq!(file_names(&out), names(&["1.png", "2.png"]));
    assert_eq!(*store.pages.lock().unwrap(), vec![1, 2]);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(store.cleaned.load(Ordering::SeqCst), 1);
}

#[test]
fn process_failure_names_page_and_releases_resources() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| {
        o.start_page = Some(2);
        o.end_page = Some(5);
    });

    let renderer = FakeRenderer::with_pages(5);
    let closed = Arc::clone(&renderer.closed);
    let store = RecordingStore::default();
    let processor = FailingProcessor {
        fail_on: 2,
        seen: AtomicUsize::new(0),
    };
    let converter = Pdf2ImageConverter::new(renderer, processor, store.clone());
    let err = converter.convert(&cfg).unwrap_err();

    // Second page of the range is document page 3.
    assert_eq!(err.page(), Some(3));
    assert_eq!(err.kind(), ErrorKind::Process);
    assert_eq!(file_names(&out), names(&["2.png"]));
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(store.cleaned.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_input_fails_before_storage_is_touched() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let cfg = config(&tmp.path().join("absent.pdf"), &out, |_| {});

    let renderer = FakeRenderer::with_pages(3);
    let opened = Arc::clone(&renderer.opened);
    let store = RecordingStore::default();
    let converter = Pdf2ImageConverter::new(renderer, DefaultImageProcessor, store.clone());
    let err = converter.convert(&cfg).unwrap_err();

    assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!out.exists());
    assert_eq!(store.prepared.load(Ordering::SeqCst), 0);
    assert_eq!(store.cleaned.load(Ordering::SeqCst), 0);
    assert_eq!(opened.load(Ordering::SeqCst), 0);
}

#[test]
fn directory_as_input_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let cfg = config(tmp.path(), &out, |_| {});

    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(3));
    let err = converter.convert(&cfg).unwrap_err();
    assert!(matches!(err, Pdf2ImgError::NotAFile { .. }));
}

#[test]
fn missing_paths_are_configuration_errors() {
    let err = ConversionConfig::new(ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = ConversionConfig::new(ConversionOptions {
        input_path: Some("a.pdf".into()),
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ── Resource release ─────────────────────────────────────────────────────────

#[test]
fn document_closed_and_storage_cleaned_on_success() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |_| {});

    let renderer = FakeRenderer::with_pages(2);
    let (opened, closed) = (Arc::clone(&renderer.opened), Arc::clone(&renderer.closed));
    let store = RecordingStore::default();
    let converter = Pdf2ImageConverter::new(renderer, DefaultImageProcessor, store.clone());
    converter.convert(&cfg).unwrap();

    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert_eq!(store.prepared.load(Ordering::SeqCst), 1);
    assert_eq!(store.cleaned.load(Ordering::SeqCst), 1);
}

// ── Image content ────────────────────────────────────────────────────────────

#[test]
fn quarter_turn_swaps_dimensions() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| o.rotation_degrees = -270);

    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(1));
    converter.convert(&cfg).unwrap();

    let written = image::open(out.join("1.png")).unwrap();
    assert_eq!((written.width(), written.height()), (4, 8));
}

#[test]
fn grayscale_and_bilevel_outputs() {
    let (tmp, pdf) = workspace();

    let gray_out = tmp.path().join("gray");
    let cfg = config(&pdf, &gray_out, |o| o.image_mode = ImageMode::Grayscale);
    Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(1))
        .convert(&cfg)
        .unwrap();
    let gray = image::open(gray_out.join("1.png")).unwrap();
    assert!(matches!(gray, DynamicImage::ImageLuma8(_)));

    let bw_out = tmp.path().join("bw");
    let cfg = config(&pdf, &bw_out, |o| {
        o.image_mode = ImageMode::BlackAndWhite;
        o.rotation_degrees = 30;
    });
    Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(1))
        .convert(&cfg)
        .unwrap();
    let bw = image::open(bw_out.join("1.png")).unwrap().into_luma8();
    assert!(bw.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
}

// ── Progress events ──────────────────────────────────────────────────────────

#[test]
fn progress_events_in_page_order() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    let cfg = config(&pdf, &out, |o| {
        o.start_page = Some(2);
        o.end_page = Some(3);
    });

    let log = Arc::new(EventLog::default());
    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(4))
        .with_progress(log.clone());
    converter.convert(&cfg).unwrap();

    assert_eq!(
        *log.events.lock().unwrap(),
        vec!["start 2", "page 2", "done 2", "page 3", "done 3", "complete 2/2"]
    );
}

#[test]
fn progress_reports_failing_page() {
    let (tmp, pdf) = workspace();
    let out = tmp.path().join("out");
    std::fs::create_dir_all(out.join("2.png")).unwrap();
    let cfg = config(&pdf, &out, |_| {});

    let log = Arc::new(EventLog::default());
    let converter = Pdf2ImageConverter::with_renderer(FakeRenderer::with_pages(3))
        .with_progress(log.clone());
    assert!(converter.convert(&cfg).is_err());

    assert_eq!(
        *log.events.lock().unwrap(),
        vec!["start 3", "page 1", "done 1", "page 2", "error 2"]
    );
}

// ── pdfium-backed entry points: validation happens before binding ───────────

#[tokio::test]
async fn async_convert_reports_missing_input() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let cfg = config(&tmp.path().join("absent.pdf"), &out, |_| {});

    let err = convert(&cfg).await.unwrap_err();
    assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }));
    assert!(!out.exists());
}

#[test]
fn sync_convert_reports_missing_input() {
    let tmp = TempDir::new().unwrap();
    let cfg = config(&tmp.path().join("absent.pdf"), &tmp.path().join("out"), |_| {});

    let err = convert_sync(&cfg).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
