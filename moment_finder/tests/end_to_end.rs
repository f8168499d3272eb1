//! Exercises the public API end-to-end: a synthetic video (no real decoder
//! needed, just a `VideoFrameSource` impl over in-memory frames) is hashed,
//! stored, and searched.

use image::{DynamicImage, Rgb, RgbImage};
use moment_finder::{search, DecodedFrame, HashStore, KeyframeExtractor, VideoFrameSource};

struct SyntheticFrame {
    timestamp: f64,
    image: DynamicImage,
}

impl DecodedFrame for SyntheticFrame {
    fn timestamp_seconds(&self) -> f64 {
        self.timestamp
    }

    fn into_image(self) -> DynamicImage {
        self.image
    }
}

struct SyntheticVideo {
    frames: std::vec::IntoIter<SyntheticFrame>,
    duration: f64,
}

impl SyntheticVideo {
    fn new(frames: Vec<SyntheticFrame>, duration: f64) -> Self {
        Self {
            frames: frames.into_iter(),
            duration,
        }
    }
}

impl VideoFrameSource for SyntheticVideo {
    type Frame = SyntheticFrame;
    type Error = std::convert::Infallible;

    fn duration_seconds(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn next_frame(&mut self) -> Option<Result<Self::Frame, Self::Error>> {
        self.frames.next().map(Ok)
    }
}

fn solid_frame(timestamp: f64, value: u8) -> SyntheticFrame {
    SyntheticFrame {
        timestamp,
        image: DynamicImage::ImageRgb8(RgbImage::from_pixel(96, 96, Rgb([value; 3]))),
    }
}

fn checker_frame(timestamp: f64) -> SyntheticFrame {
    let mut img = RgbImage::new(96, 96);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let v = if (x / 8 + y / 8) % 2 == 0 { 240 } else { 16 };
        *px = Rgb([v, v, v]);
    }
    SyntheticFrame {
        timestamp,
        image: DynamicImage::ImageRgb8(img),
    }
}

/// Scenario 1 from the testable-properties list: a static shot collapses
/// to exactly one stored record.
#[test]
fn single_static_shot_yields_one_record() {
    let frames: Vec<_> = (0..60).map(|i| solid_frame(i as f64 / 30.0, 128)).collect();
    let video = SyntheticVideo::new(frames, 2.0);
    let extractor = KeyframeExtractor::new("static.mp4", video);

    let records: Vec<_> = extractor.collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].time_seconds, 0.0);
}

/// Scenario 2: a hard cut between two visually distinct shots yields
/// exactly two records, one per shot.
#[test]
fn two_shot_cut_yields_two_records() {
    let mut frames = Vec::new();
    for i in 0..30 {
        frames.push(solid_frame(i as f64 / 30.0, 0));
    }
    for i in 30..60 {
        frames.push(checker_frame(i as f64 / 30.0));
    }

    let video = SyntheticVideo::new(frames, 2.0);
    let extractor = KeyframeExtractor::new("cut.mp4", video);

    let records: Vec<_> = extractor.collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].time_seconds, 0.0);
    assert!((records[1].time_seconds - 1.0).abs() < 1e-6);
}

/// Scenario 3: querying with the exact frame that was indexed returns it
/// as the top, similarity-1.0 result.
#[test]
fn exact_match_scores_similarity_one() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("store.bin");
    let mut store = HashStore::open(&db_path).unwrap();

    let frames = vec![
        solid_frame(0.0, 0),
        checker_frame(5.0),
        solid_frame(10.0, 255),
    ];
    let video = SyntheticVideo::new(frames, 15.0);
    let extractor = KeyframeExtractor::new("a.mp4", video);
    for record in extractor {
        store.append(&record.unwrap()).unwrap();
    }

    let query = checker_frame(0.0).image;
    let results = search(&mut store, &query, 50).unwrap();

    let top = &results[0];
    assert_eq!(top.record.path, std::path::PathBuf::from("a.mp4"));
    assert_eq!(top.record.time_seconds, 5.0);
    assert_eq!(top.similarity, 1.0);
}

/// Resuming an index: re-running extraction against an existing store and
/// skipping already-indexed paths must not duplicate records.
#[test]
fn indexed_paths_prevents_duplicate_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("store.bin");
    let mut store = HashStore::open(&db_path).unwrap();

    let video = SyntheticVideo::new(vec![solid_frame(0.0, 10)], 1.0);
    let extractor = KeyframeExtractor::new("v1.mp4", video);
    for record in extractor {
        store.append(&record.unwrap()).unwrap();
    }

    let already = store.indexed_paths().unwrap();
    assert!(already.contains(&std::path::PathBuf::from("v1.mp4")));
    assert!(!already.contains(&std::path::PathBuf::from("v2.mp4")));
}
