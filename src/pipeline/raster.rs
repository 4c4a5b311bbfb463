//! The pixel buffer handed from stage to stage.
//!
//! Each variant wraps an `image` crate buffer so the encoders and color
//! conversions of that crate apply directly. Bilevel images are stored one
//! byte per pixel with every sample either `0` or `255`; the constructors
//! enforce that by thresholding.

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Luma at or above this value becomes white in a bilevel image.
pub const BILEVEL_THRESHOLD: u8 = 128;

/// In-memory encoding of a page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelRepresentation {
    /// 24-bit RGB.
    Rgb,
    /// 8-bit gray.
    Gray,
    /// 1-bit black and white.
    Bilevel,
}

impl PixelRepresentation {
    /// Samples per pixel in the backing buffer.
    pub fn channels(self) -> usize {
        match self {
            PixelRepresentation::Rgb => 3,
            PixelRepresentation::Gray | PixelRepresentation::Bilevel => 1,
        }
    }
}

/// A rasterised page.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedImage {
    Rgb(RgbImage),
    Gray(GrayImage),
    Bilevel(GrayImage),
}

impl RenderedImage {
    /// Convert any decoded image into `target` through the `image` crate's
    /// color path.
    pub fn from_dynamic(image: DynamicImage, target: PixelRepresentation) -> Self {
        match target {
            PixelRepresentation::Rgb => RenderedImage::Rgb(image.into_rgb8()),
            PixelRepresentation::Gray => RenderedImage::Gray(image.into_luma8()),
            PixelRepresentation::Bilevel => Self::bilevel(image.into_luma8()),
        }
    }

    /// Build a bilevel image by thresholding `luma`.
    pub fn bilevel(mut luma: GrayImage) -> Self {
        for p in luma.pixels_mut() {
            p.0[0] = if p.0[0] >= BILEVEL_THRESHOLD { 255 } else { 0 };
        }
        RenderedImage::Bilevel(luma)
    }

    /// Wrap raw samples. Returns `None` when `samples` does not hold exactly
    /// `width * height * channels` bytes.
    pub fn from_raw(
        width: u32,
        height: u32,
        representation: PixelRepresentation,
        samples: Vec<u8>,
    ) -> Option<Self> {
        let expected = width as usize * height as usize * representation.channels();
        if samples.len() != expected {
            return None;
        }
        match representation {
            PixelRepresentation::Rgb => RgbImage::from_raw(width, height, samples).map(Self::Rgb),
            PixelRepresentation::Gray => GrayImage::from_raw(width, height, samples).map(Self::Gray),
            PixelRepresentation::Bilevel => {
                GrayImage::from_raw(width, height, samples).map(Self::bilevel)
            }
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            RenderedImage::Rgb(b) => b.width(),
            RenderedImage::Gray(b) | RenderedImage::Bilevel(b) => b.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            RenderedImage::Rgb(b) => b.height(),
            RenderedImage::Gray(b) | RenderedImage::Bilevel(b) => b.height(),
        }
    }

    pub fn representation(&self) -> PixelRepresentation {
        match self {
            RenderedImage::Rgb(_) => PixelRepresentation::Rgb,
            RenderedImage::Gray(_) => PixelRepresentation::Gray,
            RenderedImage::Bilevel(_) => PixelRepresentation::Bilevel,
        }
    }

    /// Raw samples, row-major, `channels()` bytes per pixel.
    pub fn samples(&self) -> &[u8] {
        match self {
            RenderedImage::Rgb(b) => b.as_raw(),
            RenderedImage::Gray(b) | RenderedImage::Bilevel(b) => b.as_raw(),
        }
    }

    /// `true` when the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Hand the buffer back to the `image` crate.
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            RenderedImage::Rgb(b) => DynamicImage::ImageRgb8(b),
            RenderedImage::Gray(b) | RenderedImage::Bilevel(b) => DynamicImage::ImageLuma8(b),
        }
    }
}
