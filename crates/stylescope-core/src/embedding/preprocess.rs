//! Image preprocessing for CLIP embedding generation.
//!
//! CLIP ViT-B/32 expects:
//! - Input size: 224×224 pixels, short side resized then center-cropped
//! - Normalization: per-channel `(pixel/255 - mean) / std`
//! - Channel order: RGB
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::DynamicImage;
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// CLIP normalization mean (per-channel RGB).
const NORM_MEAN: [f32; CHANNELS] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std (per-channel RGB).
const NORM_STD: [f32; CHANNELS] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess an image for CLIP inference.
///
/// Scales the short side to `image_size`, center-crops to a square, converts
/// to RGB, normalizes, and returns an NCHW tensor suitable for ONNX Runtime.
pub fn preprocess(image: &DynamicImage, image_size: u32) -> Array4<f32> {
    let cropped = image.resize_to_fill(
        image_size,
        image_size,
        image::imageops::FilterType::CatmullRom,
    );
    let rgb = cropped.to_rgb8();

    let size = image_size as usize;
    Array4::from_shape_fn((1, CHANNELS, size, size), |(_, c, y, x)| {
        let pixel = rgb.get_pixel(x as u32, y as u32);
        (pixel[c] as f32 / 255.0 - NORM_MEAN[c]) / NORM_STD[c]
    })
}
