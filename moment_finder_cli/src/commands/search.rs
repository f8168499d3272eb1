use std::path::Path;

use log::info;
use moment_finder::definitions::DEFAULT_TOP_K;
use moment_finder::HashStore;

use crate::errors::AppError;
use crate::thumbnail_render;

pub fn run(db: &Path, image_path: &Path, threshold: f64) -> Result<(), AppError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AppError::InvalidThreshold(threshold));
    }
    if !image_path.is_file() {
        return Err(AppError::ImageNotFound(image_path.to_path_buf()));
    }

    let query = image::open(image_path).map_err(|source| AppError::QueryImage {
        path: image_path.to_path_buf(),
        source,
    })?;

    let mut store = HashStore::open(db)?;
    let results = moment_finder::search(&mut store, &query, DEFAULT_TOP_K)?;

    let matches: Vec<_> = results.into_iter().filter(|r| r.similarity >= threshold).collect();
    info!("search completed: {} match(es)", matches.len());

    for result in &matches {
        println!(
            "{}  {}  similarity={:.4}",
            result.record.path.display(),
            format_timestamp(result.record.time_seconds),
            result.similarity
        );
        match thumbnail_render::render(&result.record.thumbnail) {
            Ok(rendered) => print!("{rendered}"),
            Err(err) => log::warn!("could not render thumbnail: {err}"),
        }
    }

    Ok(())
}

fn format_timestamp(seconds: f64) -> String {
    let total_hundredths = (seconds * 10_000.0).round() as u64;
    let hours = total_hundredths / (3600 * 10_000);
    let minutes = (total_hundredths / (60 * 10_000)) % 60;
    let secs = (total_hundredths / 10_000) % 60;
    let frac = total_hundredths % 10_000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{frac:04}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_hh_mm_ss_ffff() {
        assert_eq!(format_timestamp(0.0), "00:00:00.0000");
        assert_eq!(format_timestamp(3661.5), "01:01:01.5000");
    }
}
