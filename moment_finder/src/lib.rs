//! Perceptual-hash keyframe extraction, an append-only fingerprint store,
//! and top-K similarity search over a video library.
//!
//! This crate is the decoder-agnostic core: it knows how to hash frames,
//! persist and stream [`FrameHash`] records, and rank a store against a
//! query image. It does not know how to decode a video file -- that is the
//! job of a [`extractor::VideoFrameSource`] implementation supplied by an
//! adapter crate.

mod cancel;
pub mod definitions;
mod error;
pub mod extractor;
pub mod phash;
pub mod search;
pub mod store;

pub use cancel::CancelToken;
pub use error::Error;
pub use extractor::{DecodedFrame, KeyframeExtractor, VideoFrameSource};
pub use phash::{phash, Fingerprint};
pub use search::{search, search_default, search_with_progress, SearchOutcome, SearchResult};
pub use store::{FrameHash, HashStore, Thumbnail};
