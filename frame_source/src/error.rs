use thiserror::Error;

/// Errors surfaced by this adapter. Wrapped by
/// [`moment_finder::Error::VideoDecode`] once it crosses into the core.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("gstreamer error: {0}")]
    Gstreamer(#[from] glib::Error),

    #[error("pipeline state change failed: {0}")]
    StateChange(String),

    #[error("decoded sample had no negotiated caps")]
    MissingCaps,

    #[error("failed to map decoded video frame: {0}")]
    FrameMap(String),

    #[error("path is not valid UTF-8 / cannot be converted to a file URI: {0}")]
    InvalidPath(std::path::PathBuf),
}
