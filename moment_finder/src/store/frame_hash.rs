use std::cell::RefCell;
use std::path::PathBuf;

use image::DynamicImage;

use crate::error::Error;
use crate::phash::Fingerprint;

/// A thumbnail image, decoded lazily and cached after first use.
///
/// Records read back out of a [`crate::store::HashStore`] carry their
/// thumbnail as raw encoded bytes (PNG). Most consumers (the search path in
/// particular) only need the fingerprint, so decoding every thumbnail on
/// load would be wasted work; [`Thumbnail::load_image`] defers that cost
/// until something actually asks to look at the picture.
#[derive(Debug)]
pub struct Thumbnail {
    encoded: Vec<u8>,
    decoded: RefCell<Option<DynamicImage>>,
}

impl Thumbnail {
    /// Wrap already-encoded (PNG) thumbnail bytes.
    #[must_use]
    pub fn from_encoded(encoded: Vec<u8>) -> Self {
        Self {
            encoded,
            decoded: RefCell::new(None),
        }
    }

    /// Encode `image` as PNG and wrap the result.
    pub fn from_image(image: &DynamicImage) -> Result<Self, Error> {
        let mut buf = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buf);
        image.write_to(&mut cursor, image::ImageOutputFormat::Png)?;
        Ok(Self::from_encoded(buf))
    }

    /// The raw encoded (PNG) bytes, as stored on disk.
    #[must_use]
    pub fn encoded_bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// Decode the thumbnail, caching the result for subsequent calls.
    pub fn load_image(&self) -> Result<DynamicImage, Error> {
        if let Some(img) = self.decoded.borrow().as_ref() {
            return Ok(img.clone());
        }
        let img = image::load_from_memory(&self.encoded)?;
        *self.decoded.borrow_mut() = Some(img.clone());
        Ok(img)
    }
}

impl Clone for Thumbnail {
    fn clone(&self) -> Self {
        Self {
            encoded: self.encoded.clone(),
            decoded: RefCell::new(self.decoded.borrow().clone()),
        }
    }
}

/// One record in a hash store: a source video path, the timestamp within
/// that video the frame was taken at, its perceptual fingerprint, and a
/// thumbnail preview.
#[derive(Debug, Clone)]
pub struct FrameHash {
    pub path: PathBuf,
    pub time_seconds: f64,
    pub fingerprint: Fingerprint,
    pub thumbnail: Thumbnail,
}

impl FrameHash {
    #[must_use]
    pub fn new(path: PathBuf, time_seconds: f64, fingerprint: Fingerprint, thumbnail: Thumbnail) -> Self {
        Self {
            path,
            time_seconds,
            fingerprint,
            thumbnail,
        }
    }
}
