//! History: baked world snapshots and the playback cursor that walks them.
//!
//! # Invariants
//! - History is append-only; frames are never modified or removed.
//! - Every frame has the world's total DOF count.
//! - Restoring a frame overwrites coordinates only.

pub mod cursor;
pub mod snapshot;
pub mod store;

pub use cursor::PlaybackCursor;
pub use snapshot::Snapshot;
pub use store::{History, HistoryError};
