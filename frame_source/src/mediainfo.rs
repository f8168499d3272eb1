//! Container metadata probing via gstreamer's discoverer, without decoding
//! the full frame stream.

use gstreamer::ClockTime;
use gstreamer_pbutils::{Discoverer, DiscovererInfo};

use crate::error::DecodeError;

fn media_info(uri: &str) -> Result<DiscovererInfo, DecodeError> {
    let timeout = ClockTime::from_seconds(15);
    let discoverer = Discoverer::new(timeout).map_err(DecodeError::Gstreamer)?;
    discoverer.discover_uri(uri).map_err(DecodeError::Gstreamer)
}

/// Container duration in seconds, or `None` if the file has no video
/// streams.
pub fn duration_seconds(uri: &str) -> Result<Option<f64>, DecodeError> {
    let info = media_info(uri)?;
    if info.video_streams().is_empty() {
        return Ok(None);
    }
    Ok(info.duration().map(|d| d.nseconds() as f64 / 1_000_000_000.0))
}

/// Dimensions of the largest video stream, or `None` if the file has no
/// video streams.
pub fn dimensions(uri: &str) -> Result<Option<(u32, u32)>, DecodeError> {
    let info = media_info(uri)?;
    let resolutions = info
        .video_streams()
        .into_iter()
        .map(|stream| (stream.width(), stream.height()));

    let best = resolutions.reduce(|best, curr| {
        if curr.0 * curr.1 > best.0 * best.1 {
            curr
        } else {
            best
        }
    });

    Ok(best)
}
