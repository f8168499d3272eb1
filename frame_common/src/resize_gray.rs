use image::{imageops::FilterType, DynamicImage, GrayImage};

/// Resize `img` to an exact `size x size` grayscale square, ignoring aspect ratio.
///
/// This is the downsample step that feeds the DCT: the hash algorithm does not
/// care about the source aspect ratio, only about having a fixed-size grid to
/// transform.
#[must_use]
pub fn resize_square_gray(img: &DynamicImage, size: u32) -> GrayImage {
    img.resize_exact(size, size, FilterType::Lanczos3).to_luma8()
}
