use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::phash::Fingerprint;

use super::frame_hash::{FrameHash, Thumbnail};

/// An append-only, length-framed log of [`FrameHash`] records.
///
/// The file is opened once and kept open for the lifetime of the store: one
/// handle serves both appends (always at end-of-file) and iteration (which
/// repositions to the start on each call). Because every iteration method
/// takes `&mut self`, the borrow checker rules out interleaving an append
/// with an in-flight iteration on the same handle.
#[derive(Debug)]
pub struct HashStore {
    file: File,
}

impl HashStore {
    /// Open `path` for reading and appending, creating it if it does not
    /// exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        Ok(Self { file })
    }

    /// Append one record to the end of the store, flushing before
    /// returning.
    pub fn append(&mut self, record: &FrameHash) -> Result<(), Error> {
        let body = encode_body(record);
        let len = u32::try_from(body.len()).expect("a single record never exceeds 4 GiB");

        self.file.write_all(&len.to_le_bytes())?;
        self.file.write_all(&body)?;
        self.file.flush()?;
        Ok(())
    }

    /// Iterate every record in the store, in append order.
    pub fn iterate(&mut self) -> Result<StoreIter<'_>, Error> {
        self.file.seek(SeekFrom::Start(0))?;
        Ok(StoreIter { file: &mut self.file })
    }

    /// As [`HashStore::iterate`], additionally invoking `progress` with
    /// `(bytes_consumed, total_bytes)` after each yielded record, and once
    /// more with `(total, total)` once iteration ends cleanly. Records are
    /// streamed one at a time, same as [`HashStore::iterate`]; nothing here
    /// buffers the store in memory.
    pub fn iterate_with_progress<F>(&mut self, progress: F) -> Result<ProgressIter<'_, F>, Error>
    where
        F: FnMut(u64, u64),
    {
        let total = self.file.metadata()?.len();
        let inner = self.iterate()?;
        Ok(ProgressIter { inner, progress, total, done: false })
    }

    /// The distinct set of `source_path` values across all stored records.
    pub fn indexed_paths(&mut self) -> Result<HashSet<PathBuf>, Error> {
        let mut paths = HashSet::new();
        for record in self.iterate()? {
            let record = record?;
            paths.insert(record.path);
        }
        Ok(paths)
    }
}

/// A fallible, forward-only iterator over the records in a [`HashStore`].
///
/// Exhaustion ends silently at a clean EOF *or* at a truncated trailing
/// record; the latter is a tolerated end-of-stream, never an error.
pub struct StoreIter<'a> {
    file: &'a mut File,
}

impl StoreIter<'_> {
    fn next_record(&mut self) -> Result<Option<FrameHash>, Error> {
        let record_len = match read_u32(self.file) {
            Ok(Some(len)) => len,
            Ok(None) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let mut body = vec![0u8; record_len as usize];
        match self.file.read_exact(&mut body) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        decode_body(&body).map(Some)
    }
}

impl Iterator for StoreIter<'_> {
    type Item = Result<FrameHash, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// The streaming iterator returned by [`HashStore::iterate_with_progress`].
///
/// Wraps a [`StoreIter`] and fires `progress` after each record this yields,
/// so a caller never holds more than one record's worth of decoded data
/// (including its thumbnail) at a time.
pub struct ProgressIter<'a, F> {
    inner: StoreIter<'a>,
    progress: F,
    total: u64,
    done: bool,
}

impl<F: FnMut(u64, u64)> Iterator for ProgressIter<'_, F> {
    type Item = Result<FrameHash, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.inner.next_record() {
            Ok(Some(record)) => match self.inner.file.stream_position() {
                Ok(after) => {
                    (self.progress)(after, self.total);
                    Some(Ok(record))
                }
                Err(err) => {
                    self.done = true;
                    Some(Err(err.into()))
                }
            },
            Ok(None) => {
                self.done = true;
                (self.progress)(self.total, self.total);
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Read a little-endian `u32`, returning `Ok(None)` on a clean EOF (zero
/// bytes read) and tolerating a short read as end-of-stream too.
fn read_u32(file: &mut File) -> io::Result<Option<u32>> {
    let mut buf = [0u8; 4];
    match file.read_exact(&mut buf) {
        Ok(()) => Ok(Some(u32::from_le_bytes(buf))),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(err) => Err(err),
    }
}

fn encode_body(record: &FrameHash) -> Vec<u8> {
    let thumb_bytes = record.thumbnail.encoded_bytes();
    let hash_bytes = record.fingerprint.to_bits().to_le_bytes();
    let path_bytes = record.path.to_string_lossy().into_owned().into_bytes();

    let mut body = Vec::with_capacity(
        4 + thumb_bytes.len() + 4 + hash_bytes.len() + 4 + path_bytes.len() + 8,
    );

    write_len_prefixed(&mut body, thumb_bytes);
    write_len_prefixed(&mut body, &hash_bytes);
    write_len_prefixed(&mut body, &path_bytes);
    body.extend_from_slice(&record.time_seconds.to_le_bytes());

    body
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    let len = u32::try_from(bytes.len()).expect("sub-field never exceeds 4 GiB");
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(bytes);
}

fn decode_body(body: &[u8]) -> Result<FrameHash, Error> {
    let mut cursor = io::Cursor::new(body);

    let thumb_bytes = read_len_prefixed(&mut cursor)?;
    let hash_bytes = read_len_prefixed(&mut cursor)?;
    let path_bytes = read_len_prefixed(&mut cursor)?;

    let mut time_bytes = [0u8; 8];
    cursor.read_exact(&mut time_bytes)?;
    let time_seconds = f64::from_le_bytes(time_bytes);

    let hash_word = u64::from_le_bytes(
        hash_bytes
            .as_slice()
            .try_into()
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "hash blob is not 8 bytes"))?,
    );

    Ok(FrameHash::new(
        PathBuf::from(String::from_utf8_lossy(&path_bytes).into_owned()),
        time_seconds,
        Fingerprint::from_bits(hash_word),
        Thumbnail::from_encoded(thumb_bytes),
    ))
}

fn read_len_prefixed(cursor: &mut io::Cursor<&[u8]>) -> Result<Vec<u8>, Error> {
    let mut len_bytes = [0u8; 4];
    cursor.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::phash::Fingerprint;
    use image::{DynamicImage, Rgb, RgbImage};

    fn sample_record(path: &str, time: f64, bits: u64) -> FrameHash {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([10, 20, 30])));
        FrameHash::new(
            PathBuf::from(path),
            time,
            Fingerprint::from_bits(bits),
            Thumbnail::from_image(&img).unwrap(),
        )
    }

    #[test]
    fn round_trips_appended_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = HashStore::open(&path).unwrap();
        store.append(&sample_record("a.mp4", 1.5, 0xDEAD_BEEF_u64)).unwrap();
        store.append(&sample_record("b.mp4", 12.25, 0x1234_5678_u64)).unwrap();

        let records: Vec<FrameHash> = store.iterate().unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, PathBuf::from("a.mp4"));
        assert_eq!(records[0].time_seconds, 1.5);
        assert_eq!(records[0].fingerprint.to_bits(), 0xDEAD_BEEF_u64);
        assert_eq!(records[1].path, PathBuf::from("b.mp4"));
    }

    #[test]
    fn tolerates_truncated_trailing_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        {
            let mut store = HashStore::open(&path).unwrap();
            store.append(&sample_record("a.mp4", 0.0, 1)).unwrap();
        }

        // Corrupt the file by appending a dangling length prefix with no body.
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&999_u32.to_le_bytes()).unwrap();
            file.write_all(b"short").unwrap();
        }

        let mut store = HashStore::open(&path).unwrap();
        let records: Vec<FrameHash> = store.iterate().unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn indexed_paths_returns_distinct_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = HashStore::open(&path).unwrap();
        store.append(&sample_record("a.mp4", 0.0, 1)).unwrap();
        store.append(&sample_record("a.mp4", 1.0, 2)).unwrap();
        store.append(&sample_record("b.mp4", 0.0, 3)).unwrap();

        let paths = store.indexed_paths().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&PathBuf::from("a.mp4")));
        assert!(paths.contains(&PathBuf::from("b.mp4")));
    }

    #[test]
    fn progress_reports_final_total_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = HashStore::open(&path).unwrap();
        store.append(&sample_record("a.mp4", 0.0, 1)).unwrap();
        store.append(&sample_record("b.mp4", 1.0, 2)).unwrap();

        let mut calls = Vec::new();
        let records: Vec<FrameHash> = store
            .iterate_with_progress(|current, total| calls.push((current, total)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 2);
        let (last_current, last_total) = *calls.last().unwrap();
        assert_eq!(last_current, last_total);
    }

    #[test]
    fn progress_iter_yields_one_record_at_a_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");

        let mut store = HashStore::open(&path).unwrap();
        store.append(&sample_record("a.mp4", 0.0, 1)).unwrap();
        store.append(&sample_record("b.mp4", 1.0, 2)).unwrap();
        store.append(&sample_record("c.mp4", 2.0, 3)).unwrap();

        let mut calls = 0usize;
        let mut iter = store.iterate_with_progress(|_, _| calls += 1).unwrap();

        // Pulling a single record must fire the callback exactly once, never
        // for the whole store up front.
        let first = iter.next().unwrap().unwrap();
        assert_eq!(first.path, PathBuf::from("a.mp4"));
        assert_eq!(calls, 1);

        drop(iter);
        assert_eq!(calls, 1);
    }
}
