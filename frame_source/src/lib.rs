//! Concrete [`moment_finder::VideoFrameSource`] backed by gstreamer.
//!
//! This crate depends on `moment_finder`, not the other way around, so the
//! hashing core stays free of any multimedia backend dependency; swapping
//! decoder backends means writing a new crate like this one, not touching
//! the core.

mod error;
mod mediainfo;
mod pipeline;

use std::path::Path;
use std::sync::Once;

pub use error::DecodeError;
pub use pipeline::{GstFrame, GstFrameSource};

static GSTREAMER_INIT: Once = Once::new();

/// Initialize the gstreamer runtime. Safe to call more than once; only the
/// first call does anything.
pub fn init() {
    GSTREAMER_INIT.call_once(|| {
        gstreamer::init().expect("failed to initialize gstreamer");
    });
}

fn file_uri(path: &Path) -> Result<String, DecodeError> {
    url::Url::from_file_path(path)
        .map(|u| u.to_string())
        .map_err(|()| DecodeError::InvalidPath(path.to_path_buf()))
}

/// Open `path` as a decode pipeline, ready to be driven by
/// [`moment_finder::KeyframeExtractor`].
pub fn open(path: impl AsRef<Path>) -> Result<GstFrameSource, DecodeError> {
    init();
    let path = path.as_ref();
    let uri = file_uri(path)?;
    let duration = mediainfo::duration_seconds(&uri)?;
    GstFrameSource::open(&uri, duration)
}

/// Probe the container duration, in seconds, without decoding the full
/// frame stream.
pub fn duration_seconds(path: impl AsRef<Path>) -> Result<Option<f64>, DecodeError> {
    init();
    let uri = file_uri(path.as_ref())?;
    mediainfo::duration_seconds(&uri)
}

/// Probe the dimensions of the largest video stream, without decoding the
/// full frame stream.
pub fn dimensions(path: impl AsRef<Path>) -> Result<Option<(u32, u32)>, DecodeError> {
    init();
    let uri = file_uri(path.as_ref())?;
    mediainfo::dimensions(&uri)
}
