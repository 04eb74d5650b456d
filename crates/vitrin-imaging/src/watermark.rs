//! Watermark compositor.
//!
//! Flattens the base image onto an opaque white canvas, scales the watermark
//! relative to the base width, anchors it according to the configured
//! placement and padding, alpha-blends it, and re-encodes the result as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// JPEG quality used when re-encoding composited images.
const JPEG_QUALITY: u8 = 90;

/// Errors produced by the compositing pipeline.
#[derive(Error, Debug)]
pub enum ImagingError {
    /// The base image bytes could not be decoded.
    #[error("failed to decode base image: {0}")]
    DecodeBase(image::ImageError),

    /// The watermark image bytes could not be decoded.
    #[error("failed to decode watermark image: {0}")]
    DecodeWatermark(image::ImageError),

    /// JPEG re-encoding failed.
    #[error("failed to encode composited image: {0}")]
    Encode(image::ImageError),
}

/// Where the watermark is anchored on the base image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Placement {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
    Center,
}

/// Watermark configuration, read from merchant settings.
///
/// `scale_pct` is the watermark width as a percentage of the base width,
/// `padding_pct` the inset from the anchored edges as a percentage of the
/// corresponding base dimension, `opacity` a fraction in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    pub image_bytes: Vec<u8>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default = "default_scale_pct")]
    pub scale_pct: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_padding_pct")]
    pub padding_pct: f32,
}

fn default_scale_pct() -> f32 {
    20.0
}

fn default_opacity() -> f32 {
    0.6
}

fn default_padding_pct() -> f32 {
    4.0
}

impl WatermarkSpec {
    /// Returns a copy with all numeric parameters clamped to their valid
    /// ranges: `scale_pct ∈ [5, 100]`, `padding_pct ∈ [0, 25]`,
    /// `opacity ∈ [0, 1]`.
    pub fn clamped(&self) -> Self {
        Self {
            image_bytes: self.image_bytes.clone(),
            placement: self.placement,
            scale_pct: self.scale_pct.clamp(5.0, 100.0),
            opacity: self.opacity.clamp(0.0, 1.0),
            padding_pct: self.padding_pct.clamp(0.0, 25.0),
        }
    }
}

/// Computes the top-left corner of the watermark on the base image.
///
/// Center placement ignores padding. All arithmetic saturates at zero so an
/// oversized watermark degrades to flush positioning instead of wrapping.
pub fn anchor(
    placement: Placement,
    base_w: u32,
    base_h: u32,
    wm_w: u32,
    wm_h: u32,
    pad_x: u32,
    pad_y: u32,
) -> (u32, u32) {
    let right = base_w.saturating_sub(wm_w).saturating_sub(pad_x);
    let bottom = base_h.saturating_sub(wm_h).saturating_sub(pad_y);
    match placement {
        Placement::BottomRight => (right, bottom),
        Placement::BottomLeft => (pad_x.min(base_w.saturating_sub(wm_w)), bottom),
        Placement::TopRight => (right, pad_y.min(base_h.saturating_sub(wm_h))),
        Placement::TopLeft => (
            pad_x.min(base_w.saturating_sub(wm_w)),
            pad_y.min(base_h.saturating_sub(wm_h)),
        ),
        Placement::Center => (
            base_w.saturating_sub(wm_w) / 2,
            base_h.saturating_sub(wm_h) / 2,
        ),
    }
}

/// Composites `spec`'s watermark onto `base_bytes` and returns JPEG bytes.
///
/// The base is flattened onto an opaque white canvas first so transparent
/// regions do not turn black during JPEG re-encoding.
pub fn composite_watermark(base_bytes: &[u8], spec: &WatermarkSpec) -> Result<Vec<u8>, ImagingError> {
    let spec = spec.clamped();

    let base = image::load_from_memory(base_bytes).map_err(ImagingError::DecodeBase)?;
    let watermark =
        image::load_from_memory(&spec.image_bytes).map_err(ImagingError::DecodeWatermark)?;

    let mut canvas = flatten_onto_white(&base);
    let (base_w, base_h) = (canvas.width(), canvas.height());

    // Watermark width follows the base width; height keeps the aspect ratio.
    let src = watermark.to_rgba8();
    let wm_w = ((spec.scale_pct / 100.0 * base_w as f32).round() as u32).clamp(1, base_w);
    let wm_h = ((wm_w as u64 * src.height() as u64) / src.width().max(1) as u64)
        .max(1)
        .min(base_h as u64) as u32;
    let scaled = image::imageops::resize(&src, wm_w, wm_h, FilterType::Triangle);

    let pad_x = (spec.padding_pct / 100.0 * base_w as f32).round() as u32;
    let pad_y = (spec.padding_pct / 100.0 * base_h as f32).round() as u32;
    let (x0, y0) = anchor(spec.placement, base_w, base_h, wm_w, wm_h, pad_x, pad_y);

    for (wx, wy, pixel) in scaled.enumerate_pixels() {
        let (x, y) = (x0 + wx, y0 + wy);
        if x >= base_w || y >= base_h {
            continue;
        }
        let alpha = (pixel[3] as f32 / 255.0) * spec.opacity;
        if alpha <= 0.0 {
            continue;
        }
        let under = canvas.get_pixel(x, y);
        let blend = |over: u8, base: u8| -> u8 {
            (over as f32 * alpha + base as f32 * (1.0 - alpha)).round() as u8
        };
        canvas.put_pixel(
            x,
            y,
            Rgb([
                blend(pixel[0], under[0]),
                blend(pixel[1], under[1]),
                blend(pixel[2], under[2]),
            ]),
        );
    }

    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder
        .encode_image(&DynamicImage::ImageRgb8(canvas))
        .map_err(ImagingError::Encode)?;
    Ok(bytes)
}

/// Flattens an image with any alpha channel onto an opaque white background.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut flattened = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend =
            |channel: u8| -> u8 { (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8 };
        flattened.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    flattened
}
