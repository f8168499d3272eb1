use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by this crate.
///
/// The core never logs and never retries; every fallible operation returns
/// one of these and leaves recovery to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// The video decoder backend could not open or parse a video file.
    #[error("could not decode video at {path}: {source}")]
    VideoDecode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A still image (query or source frame) could not be decoded or encoded.
    #[error("image codec error: {0}")]
    ImageCodec(#[from] image::ImageError),

    /// Read or write failure on the hash store file.
    #[error("hash store i/o error: {0}")]
    StoreIo(#[from] std::io::Error),
}
