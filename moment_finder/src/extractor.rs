//! Turns a decoded video into a stream of keyframe [`FrameHash`] records.
//!
//! The extractor never talks to a decoder library directly. It is generic
//! over [`VideoFrameSource`], a small trait that a separate adapter crate
//! implements against whatever decoder backend it wraps. This keeps the
//! hashing core free of any dependency on that backend.

use std::path::PathBuf;

use image::DynamicImage;

use crate::cancel::CancelToken;
use crate::definitions::{HASH_BITS, KEYFRAME_DIVERGENCE_THRESHOLD, THUMBNAIL_MAX_SIDE};
use crate::error::Error;
use crate::phash::{self, Fingerprint};
use crate::store::{FrameHash, Thumbnail};

/// One decoded video frame, as handed to the extractor by a frame source.
pub trait DecodedFrame {
    /// Presentation timestamp, in seconds, within the source video.
    fn timestamp_seconds(&self) -> f64;

    /// Full-resolution image data for this frame.
    fn into_image(self) -> DynamicImage;
}

/// A decoder-agnostic stream of decoded frames for a single opened video.
///
/// Implementations own whatever backend pipeline produced the frames;
/// dropping one must release that pipeline.
pub trait VideoFrameSource {
    type Frame: DecodedFrame;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Container duration in seconds, if the backend could determine it.
    fn duration_seconds(&self) -> Option<f64>;

    /// Pull the next decoded frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Option<Result<Self::Frame, Self::Error>>;
}

/// Extracts keyframes from one video: frames whose fingerprint diverges
/// enough from the last *emitted* fingerprint are kept, and the rest are
/// dropped. Note that the comparison is always against the last emitted
/// hash, not the immediately preceding frame -- this lets drift accumulate
/// across several near-duplicate frames until it crosses the threshold.
pub struct KeyframeExtractor<S: VideoFrameSource> {
    source: S,
    path: PathBuf,
    duration_seconds: f64,
    previous_emitted: Option<Fingerprint>,
    progress: Option<Box<dyn FnMut(f64, f64)>>,
    cancel: Option<CancelToken>,
    finished: bool,
}

impl<S: VideoFrameSource> KeyframeExtractor<S> {
    /// Wrap `source`, attributing every emitted record to `path`.
    pub fn new(path: impl Into<PathBuf>, source: S) -> Self {
        let duration_seconds = source.duration_seconds().unwrap_or(0.0);
        Self {
            source,
            path: path.into(),
            duration_seconds,
            previous_emitted: None,
            progress: None,
            cancel: None,
            finished: false,
        }
    }

    /// Attach a progress callback, invoked with `(current_seconds,
    /// total_seconds)` after every emitted record, and once more with
    /// `(total, total)` when the underlying frame stream is exhausted.
    #[must_use]
    pub fn with_progress(mut self, callback: impl FnMut(f64, f64) + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// Attach a cooperative cancel token. It is checked before each frame is
    /// pulled from the source; once cancelled, extraction ends as if the
    /// source had been exhausted -- no partial record is ever emitted.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Whether this extraction ended because its cancel token was set,
    /// rather than because the source was exhausted.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.finished && self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Container duration in seconds, or 0.0 if the backend could not
    /// determine it.
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    fn report_progress(&mut self, current: f64) {
        if let Some(cb) = self.progress.as_mut() {
            cb(current, self.duration_seconds);
        }
    }

    fn step(&mut self) -> Result<Option<FrameHash>, Error> {
        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                self.finished = true;
                return Ok(None);
            }

            let Some(frame) = self.source.next_frame() else {
                self.finished = true;
                self.report_progress(self.duration_seconds);
                return Ok(None);
            };

            let frame = frame.map_err(|err| Error::VideoDecode {
                path: self.path.clone(),
                source: Box::new(err),
            })?;

            let timestamp = frame.timestamp_seconds();
            let image = frame.into_image();
            let fingerprint = phash::phash(&image);

            let should_emit = match self.previous_emitted {
                None => true,
                Some(prev) => {
                    let delta = f64::from(fingerprint.hamming_distance(prev)) / f64::from(HASH_BITS);
                    delta > KEYFRAME_DIVERGENCE_THRESHOLD
                }
            };

            if !should_emit {
                continue;
            }

            self.previous_emitted = Some(fingerprint);

            let thumb_image = frame_common::thumbnail_rgb(&image, THUMBNAIL_MAX_SIDE);
            let thumbnail = Thumbnail::from_image(&DynamicImage::ImageRgb8(thumb_image))?;

            let record = FrameHash::new(self.path.clone(), timestamp, fingerprint, thumbnail);
            self.report_progress(timestamp);

            return Ok(Some(record));
        }
    }
}

impl<S: VideoFrameSource> Iterator for KeyframeExtractor<S> {
    type Item = Result<FrameHash, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.step() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
