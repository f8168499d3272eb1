#![allow(clippy::let_and_return)]

//! Small image-resizing helpers shared between the perceptual-hash pipeline and
//! the video decoder adapter. Kept in its own crate so neither side has to
//! depend on the other just to scale a frame.

pub mod resize_gray;
pub mod thumbnail;

pub use resize_gray::resize_square_gray;
pub use thumbnail::{thumbnail_dimensions, thumbnail_rgb};
