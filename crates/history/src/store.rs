use crate::snapshot::Snapshot;
use rigplay_kernel::{World, WorldError};
use std::collections::TryReserveError;

/// Errors from history operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    #[error("frame {index} out of range for history of {len} frames")]
    OutOfRange { index: usize, len: usize },
    #[error("snapshot has {actual} coordinates, history frames have {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("history allocation failed: {0}")]
    Exhausted(#[from] TryReserveError),
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Append-only, random-access sequence of baked snapshots.
///
/// Frame `i` is the `i`th snapshot appended. All frames share one width,
/// fixed when the history is created.
#[derive(Debug, Clone, Default)]
pub struct History {
    width: usize,
    frames: Vec<Snapshot>,
}

impl History {
    /// Empty history whose frames will have `width` coordinates.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            frames: Vec::new(),
        }
    }

    /// Empty history sized for `world`.
    pub fn for_world<W: World + ?Sized>(world: &W) -> Self {
        Self::new(world.layout().total())
    }

    /// Coordinates per frame.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Index of the newest frame.
    pub fn last_index(&self) -> Option<usize> {
        self.frames.len().checked_sub(1)
    }

    /// Append a snapshot and return its frame index.
    ///
    /// Amortized O(1). Allocation failure is reported as
    /// [`HistoryError::Exhausted`] instead of aborting.
    pub fn append(&mut self, snapshot: Snapshot) -> Result<usize, HistoryError> {
        if snapshot.len() != self.width {
            return Err(HistoryError::LengthMismatch {
                expected: self.width,
                actual: snapshot.len(),
            });
        }
        self.frames.try_reserve(1)?;
        self.frames.push(snapshot);
        Ok(self.frames.len() - 1)
    }

    /// Capture the world's current state and append it.
    pub fn bake<W: World + ?Sized>(&mut self, world: &W) -> Result<usize, HistoryError> {
        let snapshot = Snapshot::capture(world)?;
        let frame = self.append(snapshot)?;
        tracing::trace!(frame, "baked");
        Ok(frame)
    }

    /// Bounds-checked frame access. Callers wrap or clamp indices first.
    pub fn read(&self, index: usize) -> Result<&Snapshot, HistoryError> {
        self.frames.get(index).ok_or(HistoryError::OutOfRange {
            index,
            len: self.frames.len(),
        })
    }

    /// Restore frame `index` into `world`.
    pub fn restore_into<W: World + ?Sized>(
        &self,
        index: usize,
        world: &mut W,
    ) -> Result<(), HistoryError> {
        self.read(index)?.restore(world)
    }

    /// All frames in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.frames.iter()
    }
}
