//! Post-processing: rotation, (inert) cropping and color-mode normalisation.
//!
//! Every step consumes the incoming [`RenderedImage`] and returns a new one;
//! nothing is mutated in place.
//!
//! ## Rotation geometry
//!
//! A `w × h` page rotated by θ needs a canvas of
//! `floor(w·|cos θ| + h·|sin θ|) × floor(h·|cos θ| + w·|sin θ|)`. The source is
//! centred on that canvas and turned about its own centre, clockwise on
//! screen for positive angles. Quarter turns are plain pixel permutations
//! (`imageops::rotate90` and friends) onto an exact `h × w` or `w × h` canvas.
//!
//! For other angles, destination pixels are filled by inverse mapping with bilinear sampling.
//! Samples that fall outside the source read as zero, which both leaves the
//! uncovered corners black (as a freshly allocated canvas is) and
//! anti-aliases the rotated edges.

use crate::error::Pdf2ImgError;
use crate::pipeline::raster::{PixelRepresentation, RenderedImage};
use image::{imageops, ImageBuffer, Pixel};
use tracing::debug;

/// The post-processing boundary.
pub trait ImageProcessor {
    /// Rotate by `rotation_degrees` (already in `0..360`), apply cropping if
    /// enabled, then normalise to `target`.
    fn process(
        &self,
        image: RenderedImage,
        rotation_degrees: u32,
        target: PixelRepresentation,
        cropping_enabled: bool,
    ) -> Result<RenderedImage, Pdf2ImgError>;
}

/// Rotation + color conversion backed by the `image` crate buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultImageProcessor;

impl ImageProcessor for DefaultImageProcessor {
    fn process(
        &self,
        image: RenderedImage,
        rotation_degrees: u32,
        target: PixelRepresentation,
        cropping_enabled: bool,
    ) -> Result<RenderedImage, Pdf2ImgError> {
        if image.is_empty() {
            return Err(Pdf2ImgError::ProcessFailed(format!(
                "cannot process an empty {}x{} image",
                image.width(),
                image.height()
            )));
        }

        let mut processed = image;

        if rotation_degrees % 360 != 0 {
            processed = rotate(processed, rotation_degrees)?;
            debug!("Applied rotation: {} degrees", rotation_degrees);
        }

        if cropping_enabled {
            debug!("Cropping is enabled but not implemented; keeping the full page");
        }

        Ok(convert_representation(processed, target))
    }
}

/// Canvas size needed to hold a `width × height` image rotated by `degrees`.
pub fn rotated_dimensions(width: u32, height: u32, degrees: u32) -> (u32, u32) {
    let (sin, cos) = sin_cos(degrees);
    let (sin, cos) = (sin.abs(), cos.abs());
    let (w, h) = (width as f64, height as f64);
    (
        (w * cos + h * sin).floor() as u32,
        (h * cos + w * sin).floor() as u32,
    )
}

/// Rotate clockwise by `degrees` onto an enlarged canvas, keeping the
/// pixel representation.
///
/// Quarter turns are exact pixel permutations; other angles are resampled.
pub fn rotate(image: RenderedImage, degrees: u32) -> Result<RenderedImage, Pdf2ImgError> {
    let degrees = degrees % 360;
    match degrees {
        0 => Ok(image),
        90 | 180 | 270 => Ok(quarter_turn(image, degrees)),
        _ => {
            let (width, height) = (image.width(), image.height());
            let representation = image.representation();
            let (new_width, new_height, samples) = rotate_samples(
                image.samples(),
                width,
                height,
                representation.channels(),
                degrees,
            );
            // Bilevel input is re-thresholded here: interpolation introduces
            // intermediate grays.
            rebuild(new_width, new_height, representation, samples)
        }
    }
}

fn quarter_turn(image: RenderedImage, degrees: u32) -> RenderedImage {
    match image {
        RenderedImage::Rgb(buf) => RenderedImage::Rgb(turn(&buf, degrees)),
        RenderedImage::Gray(buf) => RenderedImage::Gray(turn(&buf, degrees)),
        RenderedImage::Bilevel(buf) => RenderedImage::Bilevel(turn(&buf, degrees)),
    }
}

fn turn<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>, degrees: u32) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    match degrees {
        90 => imageops::rotate90(buf),
        180 => imageops::rotate180(buf),
        _ => imageops::rotate270(buf),
    }
}

/// Wrap resampled samples, failing if the buffer does not match the canvas.
fn rebuild(
    width: u32,
    height: u32,
    representation: PixelRepresentation,
    samples: Vec<u8>,
) -> Result<RenderedImage, Pdf2ImgError> {
    let len = samples.len();
    RenderedImage::from_raw(width, height, representation, samples).ok_or_else(|| {
        Pdf2ImgError::ProcessFailed(format!(
            "rotated buffer holds {len} samples, expected {width}x{height}x{}",
            representation.channels()
        ))
    })
}

/// Convert to `target`, returning the input untouched when it already matches.
pub fn convert_representation(image: RenderedImage, target: PixelRepresentation) -> RenderedImage {
    if image.representation() == target {
        return image;
    }
    let from = image.representation();
    let converted = match (image, target) {
        // Bilevel samples are already valid gray samples.
        (RenderedImage::Bilevel(buf), PixelRepresentation::Gray) => RenderedImage::Gray(buf),
        (image, target) => RenderedImage::from_dynamic(image.into_dynamic(), target),
    };
    debug!("Converted image from {:?} to {:?}", from, target);
    converted
}

/// Signed sine and cosine, exact for quarter turns.
fn sin_cos(degrees: u32) -> (f64, f64) {
    match degrees % 360 {
        0 => (0.0, 1.0),
        90 => (1.0, 0.0),
        180 => (0.0, -1.0),
        270 => (-1.0, 0.0),
        d => (d as f64).to_radians().sin_cos(),
    }
}

fn rotate_samples(
    src: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    degrees: u32,
) -> (u32, u32, Vec<u8>) {
    let (new_width, new_height) = rotated_dimensions(width, height, degrees);
    let mut dst = vec![0u8; new_width as usize * new_height as usize * channels];
    let (sin, cos) = sin_cos(degrees);

    let (w, h) = (width as f64, height as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let offset_x = (new_width as f64 - w) / 2.0;
    let offset_y = (new_height as f64 - h) / 2.0;

    let sample = |x: i64, y: i64, c: usize| -> f64 {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            0.0
        } else {
            src[(y as usize * width as usize + x as usize) * channels + c] as f64
        }
    };

    for dy in 0..new_height {
        for dx in 0..new_width {
            // Destination pixel centre in source-canvas coordinates,
            // relative to the source centre.
            let rx = dx as f64 + 0.5 - offset_x - cx;
            let ry = dy as f64 + 0.5 - offset_y - cy;

            // Inverse rotation, back to a source pixel-grid position.
            let fx = cx + rx * cos + ry * sin - 0.5;
            let fy = cy - rx * sin + ry * cos - 0.5;

            if fx <= -1.0 || fy <= -1.0 || fx >= w || fy >= h {
                continue;
            }

            let x0 = fx.floor();
            let y0 = fy.floor();
            let tx = fx - x0;
            let ty = fy - y0;
            let (x0, y0) = (x0 as i64, y0 as i64);

            let base = (dy as usize * new_width as usize + dx as usize) * channels;
            for c in 0..channels {
                let top = sample(x0, y0, c) * (1.0 - tx) + sample(x0 + 1, y0, c) * tx;
                let bottom = sample(x0, y0 + 1, c) * (1.0 - tx) + sample(x0 + 1, y0 + 1, c) * tx;
                let value = top * (1.0 - ty) + bottom * ty;
                dst[base + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    (new_width, new_height, dst)
}
