//! Tunable constants. Published so embedding applications can reference the
//! same values this crate uses internally, rather than guessing at magic
//! numbers.

/// Side length of the square grayscale grid the DCT runs over.
pub const DCT_SIZE: u32 = 32;

/// Side length of the low-frequency block kept from the DCT. `HASH_SIZE^2`
/// is the number of bits in a fingerprint.
pub const HASH_SIZE: u32 = 8;

/// Number of bits in a fingerprint (and in the Hamming-distance space).
pub const HASH_BITS: u32 = HASH_SIZE * HASH_SIZE;

/// Longest side, in pixels, of a stored thumbnail.
pub const THUMBNAIL_MAX_SIDE: u32 = 128;

/// Fraction of `HASH_BITS` two consecutive fingerprints must differ by
/// before the later frame is considered a new keyframe.
pub const KEYFRAME_DIVERGENCE_THRESHOLD: f64 = 0.20;

/// Default number of results returned by a similarity search.
pub const DEFAULT_TOP_K: usize = 50;

/// Default similarity floor used by the CLI's `search` subcommand.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
