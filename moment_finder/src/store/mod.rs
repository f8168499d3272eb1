//! The append-only fingerprint log.

mod frame_hash;
mod hash_store;

pub use frame_hash::{FrameHash, Thumbnail};
pub use hash_store::{HashStore, ProgressIter, StoreIter};
