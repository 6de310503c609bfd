//! Target image ingestion: sizing, flattening and conversion to the engine
//! pixel layout.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::engine::FrameDimensions;
use crate::error::TargetError;

/// Fit `orig` inside `max`. Sizes strictly below the maximum on both axes are
/// kept; anything else is scaled down by the tighter fraction.
pub fn trim_size(orig: FrameDimensions, max: FrameDimensions) -> FrameDimensions {
    if orig.width < max.width && orig.height < max.height {
        return orig;
    }
    let h_frac = max.width as f64 / orig.width.max(1) as f64;
    let v_frac = max.height as f64 / orig.height.max(1) as f64;
    let frac = h_frac.min(v_frac).min(1.0);
    FrameDimensions {
        width: ((frac * orig.width as f64) as usize).max(1),
        height: ((frac * orig.height as f64) as usize).max(1),
    }
}

/// A target ready for the evaluator.
#[derive(Clone, Debug)]
pub struct TargetImage {
    /// 4 bytes per pixel: alpha (always 255), blue, green, red.
    pub pixels: Vec<u8>,
    pub dims: FrameDimensions,
}

impl TargetImage {
    pub fn open(path: &Path, max: FrameDimensions) -> Result<Self, TargetError> {
        let img = image::open(path)?;
        Self::from_dynamic(&img, max)
    }

    /// Scale into `max`, composite over white, and reorder channels.
    pub fn from_dynamic(img: &DynamicImage, max: FrameDimensions) -> Result<Self, TargetError> {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(TargetError::Empty);
        }
        let orig = FrameDimensions { width: w as usize, height: h as usize };
        let dims = trim_size(orig, max);

        let mut rgba: RgbaImage = img.to_rgba8();
        if dims != orig {
            rgba = imageops::resize(&rgba, dims.width as u32, dims.height as u32, FilterType::CatmullRom);
        }

        let mut pixels = Vec::with_capacity(dims.buffer_len());
        for px in rgba.pixels() {
            let [r, g, b, a] = px.0;
            pixels.extend_from_slice(&[255, over_white(b, a), over_white(g, a), over_white(r, a)]);
        }
        Ok(Self { pixels, dims })
    }

    pub fn to_rgba(&self) -> Vec<u8> {
        engine_to_rgba(&self.pixels)
    }
}

#[inline]
fn over_white(c: u8, a: u8) -> u8 {
    let (c, a) = (c as u32, a as u32);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Engine layout to opaque RGBA, for saving or display.
pub fn engine_to_rgba(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len());
    for px in buf.chunks_exact(4) {
        out.extend_from_slice(&[px[3], px[2], px[1], 255]);
    }
    out
}
