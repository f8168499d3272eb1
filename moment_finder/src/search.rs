//! Top-K similarity search over a [`HashStore`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use image::DynamicImage;

use crate::cancel::CancelToken;
use crate::definitions::DEFAULT_TOP_K;
use crate::error::Error;
use crate::phash;
use crate::store::{FrameHash, HashStore};

/// One similarity search hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: FrameHash,
    pub distance: u32,
    pub similarity: f64,
}

/// The result of a search, flagged when it ended early.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Up to top-K results accumulated before the search ended.
    pub results: Vec<SearchResult>,
    /// `true` if a cancel token ended the scan before every record in the
    /// store was considered -- `results` is the best top-K found so far,
    /// not necessarily the true top-K over the whole store.
    pub partial: bool,
}

/// Orders entries by descending distance (worst first), so the heap's root
/// is always the weakest result currently held -- the one to evict when a
/// better match arrives. Insertion order is folded into the comparison so
/// that equal-distance entries still produce a deterministic ordering:
/// later insertions are considered "worse" and evicted first.
struct Entry {
    distance: u32,
    order: usize,
    record: FrameHash,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.order == other.order
    }
}
impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Hash `query`, scan every record in `store`, and return up to `top_k`
/// results sorted by ascending Hamming distance (equal distances broken by
/// append order, earliest first).
pub fn search(store: &mut HashStore, query: &DynamicImage, top_k: usize) -> Result<Vec<SearchResult>, Error> {
    Ok(search_with_progress(store, query, top_k, None, |_, _| {})?.results)
}

/// As [`search`], additionally forwarding the store's scan progress via
/// `progress(bytes_consumed, total_bytes)`, and, if `cancel` is set,
/// stopping the scan between records once it is cancelled. The returned
/// [`SearchOutcome::partial`] tells the caller whether that happened.
pub fn search_with_progress<F>(
    store: &mut HashStore,
    query: &DynamicImage,
    top_k: usize,
    cancel: Option<&CancelToken>,
    mut progress: F,
) -> Result<SearchOutcome, Error>
where
    F: FnMut(u64, u64),
{
    let query_hash = phash::phash(query);
    let mut heap: BinaryHeap<Entry> = BinaryHeap::with_capacity(top_k.max(1));
    let mut order = 0usize;
    let mut partial = false;

    let records = store.iterate_with_progress(|current, grand_total| progress(current, grand_total))?;

    for record in records {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            partial = true;
            break;
        }

        let record = record?;
        let distance = query_hash.hamming_distance(record.fingerprint);

        if heap.len() < top_k {
            heap.push(Entry { distance, order, record });
        } else if let Some(worst) = heap.peek() {
            if distance < worst.distance {
                heap.pop();
                heap.push(Entry { distance, order, record });
            }
        }
        order += 1;
    }

    // `into_sorted_vec` returns ascending Ord order, and our Ord ranks by
    // distance first, so this is already best-match-first.
    let entries = heap.into_sorted_vec();

    let results = entries
        .into_iter()
        .map(|entry| SearchResult {
            distance: entry.distance,
            similarity: query_hash.similarity(entry.record.fingerprint),
            record: entry.record,
        })
        .collect();

    Ok(SearchOutcome { results, partial })
}

/// [`search`] using the library default top-K.
pub fn search_default(store: &mut HashStore, query: &DynamicImage) -> Result<Vec<SearchResult>, Error> {
    search(store, query, DEFAULT_TOP_K)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::phash::Fingerprint;
    use crate::store::Thumbnail;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn record(path: &str, bits: u64) -> FrameHash {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        FrameHash::new(
            PathBuf::from(path),
            0.0,
            Fingerprint::from_bits(bits),
            Thumbnail::from_image(&img).unwrap(),
        )
    }

    #[test]
    fn returns_every_record_when_store_smaller_than_k() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.bin");
        let mut store = HashStore::open(&path).unwrap();
        store.append(&record("a.mp4", 0)).unwrap();
        store.append(&record("b.mp4", u64::MAX)).unwrap();

        let query = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let results = search(&mut store, &query, 50).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn sorted_ascending_by_distance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.bin");
        let mut store = HashStore::open(&path).unwrap();
        store.append(&record("far.mp4", u64::MAX)).unwrap();
        store.append(&record("near.mp4", 0)).unwrap();

        let query = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let results = search(&mut store, &query, 50).unwrap();

        assert!(results[0].distance <= results[1].distance);
    }

    #[test]
    fn respects_top_k_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.bin");
        let mut store = HashStore::open(&path).unwrap();
        for i in 0..20u64 {
            store.append(&record(&format!("v{i}.mp4"), i)).unwrap();
        }

        let query = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let results = search(&mut store, &query, 5).unwrap();
        assert_eq!(results.len(), 5);
    }

    #[test]
    fn already_cancelled_token_yields_partial_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.bin");
        let mut store = HashStore::open(&path).unwrap();
        for i in 0..5u64 {
            store.append(&record(&format!("v{i}.mp4"), i)).unwrap();
        }

        let token = CancelToken::new();
        token.cancel();

        let query = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let outcome = search_with_progress(&mut store, &query, 50, Some(&token), |_, _| {}).unwrap();

        assert!(outcome.partial);
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn uncancelled_token_yields_non_partial_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.bin");
        let mut store = HashStore::open(&path).unwrap();
        store.append(&record("a.mp4", 0)).unwrap();

        let token = CancelToken::new();
        let query = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])));
        let outcome = search_with_progress(&mut store, &query, 50, Some(&token), |_, _| {}).unwrap();

        assert!(!outcome.partial);
        assert_eq!(outcome.results.len(), 1);
    }
}
