use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),

    #[error("failed to open query image {path}: {source}")]
    QueryImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("directory scan error: {0}")]
    DirectoryScan(#[from] walkdir::Error),

    #[error(transparent)]
    Core(#[from] moment_finder::Error),
}

impl AppError {
    /// Map this error onto the process exit code conventions: 2 for a
    /// caller-facing usage error, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::DirectoryNotFound(_)
            | AppError::ImageNotFound(_)
            | AppError::InvalidThreshold(_) => 2,
            _ => 1,
        }
    }
}
