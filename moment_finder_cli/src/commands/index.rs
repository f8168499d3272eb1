use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{info, warn};
use moment_finder::{HashStore, KeyframeExtractor};
use walkdir::WalkDir;

use crate::errors::AppError;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm"];

pub fn run(db: &Path, directory: &Path, recurse: bool) -> Result<(), AppError> {
    if !directory.is_dir() {
        return Err(AppError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut store = HashStore::open(db)?;
    let already_indexed: HashSet<PathBuf> = store
        .indexed_paths()?
        .into_iter()
        .map(|path| path.canonicalize().unwrap_or(path))
        .collect();

    for candidate in scan_directory(directory, recurse)? {
        let canonical = candidate.canonicalize().unwrap_or_else(|_| candidate.clone());
        if already_indexed.contains(&canonical) {
            continue;
        }

        match index_one(&mut store, &candidate) {
            Ok(emitted) => info!("indexed {}: {emitted} frame(s) emitted", candidate.display()),
            Err(err) => warn!("skipping {}: {err}", candidate.display()),
        }
    }

    Ok(())
}

fn index_one(store: &mut HashStore, path: &Path) -> Result<usize, moment_finder::Error> {
    let source = frame_source::open(path).map_err(|err| moment_finder::Error::VideoDecode {
        path: path.to_path_buf(),
        source: Box::new(err),
    })?;

    let extractor = KeyframeExtractor::new(path.to_path_buf(), source);

    let mut emitted = 0usize;
    for record in extractor {
        store.append(&record?)?;
        emitted += 1;
    }

    Ok(emitted)
}

fn scan_directory(directory: &Path, recurse: bool) -> Result<Vec<PathBuf>, AppError> {
    let walker = if recurse {
        WalkDir::new(directory)
    } else {
        WalkDir::new(directory).max_depth(1)
    };

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if has_video_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
