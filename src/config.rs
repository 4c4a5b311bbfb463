//! Configuration types for PDF-to-image conversion.
//!
//! Callers describe a request with [`ConversionOptions`], a plain value with
//! public fields and sensible defaults, then turn it into a validated,
//! immutable [`ConversionConfig`] through [`ConversionConfig::new`]. That one
//! constructor is the only place where required paths are checked and the
//! rotation angle is normalised, so every `ConversionConfig` in existence is
//! already valid.
//!
//! Options derive `serde` traits so a request can be loaded from a JSON file
//! (see [`ConversionOptions::from_json_file`]) or echoed into logs.

use crate::error::Pdf2ImgError;
use crate::pipeline::raster::PixelRepresentation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a caller can ask for, before validation.
///
/// # Example
/// ```rust
/// use edgequake_pdf2img::{ConversionConfig, ConversionOptions, ImageFormat, Resolution};
///
/// let config = ConversionConfig::new(ConversionOptions {
///     input_path: Some("report.pdf".into()),
///     output_directory: Some("out".into()),
///     image_format: ImageFormat::Jpeg,
///     resolution: Resolution::High,
///     start_page: Some(2),
///     end_page: Some(4),
///     rotation_degrees: -90,
///     ..Default::default()
/// })
/// .unwrap();
/// assert_eq!(config.rotation_degrees(), 270);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// PDF file to convert. Required.
    pub input_path: Option<PathBuf>,

    /// Directory receiving `{page}.{ext}` files. Required.
    ///
    /// Existing regular files directly inside it are deleted before the run.
    pub output_directory: Option<PathBuf>,

    /// Output file format. Default: PNG.
    pub image_format: ImageFormat,

    /// Output color mode. Default: color.
    pub image_mode: ImageMode,

    /// Rendering DPI preset. Default: 150.
    pub resolution: Resolution,

    /// Advisory smoothing hints for the rasteriser.
    pub rendering_quality: RenderingQuality,

    /// First page to convert, 1-based. `None` means the first page.
    pub start_page: Option<i64>,

    /// Last page to convert, 1-based inclusive. `None` means the last page.
    pub end_page: Option<i64>,

    /// Accepted but currently has no effect.
    pub enable_cropping: bool,

    /// Clockwise rotation in degrees; any integer, normalised modulo 360.
    pub rotation_degrees: i32,
}

impl ConversionOptions {
    /// Load options from a JSON file.
    ///
    /// Missing keys take their defaults, so `{"input_path": "a.pdf",
    /// "output_directory": "out"}` is a complete file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Pdf2ImgError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Pdf2ImgError::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            Pdf2ImgError::InvalidConfig(format!("cannot parse '{}': {e}", path.display()))
        })
    }
}

/// A validated, immutable conversion request.
///
/// Only obtainable through [`ConversionConfig::new`].
#[derive(Debug, Clone, Serialize)]
pub struct ConversionConfig {
    input_path: PathBuf,
    output_directory: PathBuf,
    image_format: ImageFormat,
    image_mode: ImageMode,
    resolution: Resolution,
    rendering_quality: RenderingQuality,
    start_page: Option<i64>,
    end_page: Option<i64>,
    enable_cropping: bool,
    rotation_degrees: u32,
}

impl ConversionConfig {
    /// Validate `options` and freeze them.
    ///
    /// Fails with [`Pdf2ImgError::InvalidConfig`] when the input path or the
    /// output directory is missing. The rotation is wrapped into `0..360`.
    pub fn new(options: ConversionOptions) -> Result<Self, Pdf2ImgError> {
        let input_path = options
            .input_path
            .ok_or_else(|| Pdf2ImgError::InvalidConfig("input path must be specified".into()))?;
        let output_directory = options.output_directory.ok_or_else(|| {
            Pdf2ImgError::InvalidConfig("output directory must be specified".into())
        })?;

        Ok(Self {
            input_path,
            output_directory,
            image_format: options.image_format,
            image_mode: options.image_mode,
            resolution: options.resolution,
            rendering_quality: options.rendering_quality,
            start_page: options.start_page,
            end_page: options.end_page,
            enable_cropping: options.enable_cropping,
            rotation_degrees: normalize_rotation(options.rotation_degrees),
        })
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    pub fn image_mode(&self) -> ImageMode {
        self.image_mode
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn rendering_quality(&self) -> RenderingQuality {
        self.rendering_quality
    }

    pub fn start_page(&self) -> Option<i64> {
        self.start_page
    }

    pub fn end_page(&self) -> Option<i64> {
        self.end_page
    }

    pub fn enable_cropping(&self) -> bool {
        self.enable_cropping
    }

    /// Rotation in degrees, always in `0..360`.
    pub fn rotation_degrees(&self) -> u32 {
        self.rotation_degrees
    }
}

impl TryFrom<ConversionOptions> for ConversionConfig {
    type Error = Pdf2ImgError;

    fn try_from(options: ConversionOptions) -> Result<Self, Self::Error> {
        Self::new(options)
    }
}

fn normalize_rotation(degrees: i32) -> u32 {
    degrees.rem_euclid(360) as u32
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output file format.
///
/// `Jpg` and `Jpeg` use the same encoder and differ only in the file
/// extension they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Jpg,
}

impl ImageFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Jpg => "jpg",
        }
    }

    /// Canonical encoder name.
    pub fn encoder_name(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg | ImageFormat::Jpg => "jpeg",
        }
    }

    /// The `image` crate encoder used to write this format.
    pub fn encoder(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg | ImageFormat::Jpg => image::ImageFormat::Jpeg,
        }
    }
}

/// Output color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageMode {
    /// 24-bit RGB.
    #[default]
    Color,
    /// 8-bit gray.
    Grayscale,
    /// 1-bit bilevel.
    BlackAndWhite,
}

impl ImageMode {
    /// Pixel representation every output image of this mode uses.
    pub fn representation(self) -> PixelRepresentation {
        match self {
            ImageMode::Color => PixelRepresentation::Rgb,
            ImageMode::Grayscale => PixelRepresentation::Gray,
            ImageMode::BlackAndWhite => PixelRepresentation::Bilevel,
        }
    }
}

/// Rendering DPI presets.
///
/// | Preset | DPI | Use case |
/// |--------|-----|----------|
/// | `Standard` | 96 | Screen display, thumbnails |
/// | `Medium` | 150 | Balanced quality and size (default) |
/// | `High` | 300 | Printing, archival |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Standard,
    #[default]
    Medium,
    High,
}

impl Resolution {
    pub fn dpi(self) -> u32 {
        match self {
            Resolution::Standard => 96,
            Resolution::Medium => 150,
            Resolution::High => 300,
        }
    }

    /// Render scale relative to PDF user space (72 units per inch).
    pub fn scale(self) -> f32 {
        self.dpi() as f32 / 72.0
    }

    /// Map a DPI value back to its preset.
    pub fn from_dpi(dpi: u32) -> Option<Self> {
        match dpi {
            96 => Some(Resolution::Standard),
            150 => Some(Resolution::Medium),
            300 => Some(Resolution::High),
            _ => None,
        }
    }
}

/// Smoothing hints forwarded to the rasteriser.
///
/// Purely advisory: the rotation step always resamples at best quality
/// regardless of these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingQuality {
    pub anti_aliasing: bool,
    pub text_anti_aliasing: bool,
    pub fractional_metrics: bool,
}

impl Default for RenderingQuality {
    fn default() -> Self {
        Self {
            anti_aliasing: true,
            text_anti_aliasing: true,
            fractional_metrics: true,
        }
    }
}

impl RenderingQuality {
    /// All hints disabled.
    pub fn fast() -> Self {
        Self {
            anti_aliasing: false,
            text_anti_aliasing: false,
            fractional_metrics: false,
        }
    }
}
