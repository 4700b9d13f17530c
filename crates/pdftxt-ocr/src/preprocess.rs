use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};

use pdftxt_core::OcrQuality;

/// Prepare a rendered page for Tesseract.
///
/// Every quality converts to grayscale. High and Standard also upscale
/// narrow pages to the quality's target width and raise contrast and
/// sharpness; High additionally brightens slightly.
pub fn preprocess(page: &DynamicImage, quality: OcrQuality) -> GrayImage {
    let mut gray = page.to_luma8();

    if let Some(target) = quality.target_width() {
        if gray.width() > 0 && gray.width() < target {
            let scale = target as f32 / gray.width() as f32;
            let height = ((gray.height() as f32) * scale).round().max(1.0) as u32;
            gray = imageops::resize(&gray, target, height, FilterType::Lanczos3);
        }
    }

    let contrast = quality.contrast();
    if contrast > 1.0 {
        gray = imageops::contrast(&gray, (contrast - 1.0) * 100.0);
    }

    let sharpness = quality.sharpness();
    if sharpness > 1.0 {
        gray = imageops::unsharpen(&gray, sharpness, 2);
    }

    let brightness = quality.brightness();
    if brightness > 1.0 {
        gray = imageops::brighten(&gray, ((brightness - 1.0) * 255.0).round() as i32);
    }

    gray
}
