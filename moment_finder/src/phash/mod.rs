//! Perceptual hashing: turn a decoded frame into a 64-bit [`Fingerprint`].
//!
//! The algorithm is the classic DCT pHash: downsample to a fixed grayscale
//! grid, run a 2-D DCT, keep the low-frequency corner, and threshold each
//! coefficient against the median of its neighbours. The result is stable
//! under resizing, recompression and minor colour shifts, which is the whole
//! point of using a perceptual hash instead of a byte-exact one.

mod dct;

use image::DynamicImage;

use crate::definitions::{DCT_SIZE, HASH_BITS, HASH_SIZE};

/// A 64-bit perceptual fingerprint of a single video frame.
///
/// Two fingerprints are compared with [`Fingerprint::hamming_distance`];
/// smaller distances mean more visually similar frames. A distance of 0
/// means the two frames hashed identically, and the maximum possible
/// distance is [`HASH_BITS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Wrap a raw 64-bit word as a fingerprint, bit 63 being the first
    /// (top-left) coefficient in row-major order.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw 64-bit word backing this fingerprint.
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Number of bit positions at which `self` and `other` differ.
    #[must_use]
    pub fn hamming_distance(self, other: Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// `1.0 - hamming_distance / HASH_BITS`, in `[0.0, 1.0]`.
    #[must_use]
    pub fn similarity(self, other: Self) -> f64 {
        1.0 - f64::from(self.hamming_distance(other)) / f64::from(HASH_BITS)
    }
}

/// Compute the perceptual fingerprint of a decoded image frame.
#[must_use]
pub fn phash(img: &DynamicImage) -> Fingerprint {
    let gray = frame_common::resize_square_gray(img, DCT_SIZE);

    let mut samples: Vec<f64> = gray.pixels().map(|p| f64::from(p.0[0])).collect();
    dct::dct_2d(&mut samples, DCT_SIZE as usize);

    let low_freq = extract_low_frequency_block(&samples, DCT_SIZE as usize, HASH_SIZE as usize);

    // The DC term (index 0) dominates the magnitude of every DCT and carries
    // no discriminative information here, so it is excluded from the
    // median/threshold step, matching the classic pHash formulation.
    let mut ac = low_freq[1..].to_vec();
    ac.sort_by(|a, b| a.partial_cmp(b).expect("DCT coefficients are always finite"));
    let median = ac[ac.len() / 2];

    let mut bits: u64 = 0;
    for (idx, &coeff) in low_freq.iter().enumerate() {
        if coeff > median {
            bits |= 1 << (HASH_BITS as usize - 1 - idx);
        }
    }

    Fingerprint(bits)
}

/// Slice the `block_size x block_size` top-left corner out of a
/// `full_size x full_size` row-major grid.
fn extract_low_frequency_block(data: &[f64], full_size: usize, block_size: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(block_size * block_size);
    for row in 0..block_size {
        let start = row * full_size;
        out.extend_from_slice(&data[start..start + block_size]);
    }
    out
}
