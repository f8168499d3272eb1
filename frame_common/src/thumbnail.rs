use image::{imageops::FilterType, DynamicImage, RgbImage};

/// Compute the aspect-preserving, never-upscaling thumbnail size for an
/// image whose original dimensions are `(orig_w, orig_h)`, bounded by
/// `max_side` on both axes.
#[must_use]
pub fn thumbnail_dimensions(orig_w: u32, orig_h: u32, max_side: u32) -> (u32, u32) {
    let scale = (max_side as f64 / orig_w as f64)
        .min(max_side as f64 / orig_h as f64)
        .min(1.0);

    let new_w = (orig_w as f64 * scale).round() as u32;
    let new_h = (orig_h as f64 * scale).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Produce an aspect-preserving RGB thumbnail no larger than `max_side` on
/// either axis, using a high-quality resampling filter.
#[must_use]
pub fn thumbnail_rgb(img: &DynamicImage, max_side: u32) -> RgbImage {
    let (new_w, new_h) = thumbnail_dimensions(img.width(), img.height(), max_side);
    img.resize_exact(new_w, new_h, FilterType::Lanczos3).to_rgb8()
}
