use crate::BodyId;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Errors from slicing flat coordinate vectors by body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{0} is not part of this layout")]
    UnknownBody(BodyId),
    #[error("coordinate vector has length {actual}, layout expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Per-body offset table for flat generalized-coordinate vectors.
///
/// Body `i` occupies `offsets[i]..offsets[i] + counts[i]`. Offsets are
/// contiguous and in body order, so the total length is the last offset plus
/// the last count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DofLayout {
    offsets: Vec<usize>,
    counts: Vec<usize>,
}

impl DofLayout {
    /// Build the table from per-body DOF counts, in body order.
    pub fn new(counts: impl IntoIterator<Item = usize>) -> Self {
        let counts: Vec<usize> = counts.into_iter().collect();
        let mut offsets = Vec::with_capacity(counts.len());
        let mut next = 0;
        for &count in &counts {
            offsets.push(next);
            next += count;
        }
        Self { offsets, counts }
    }

    /// Number of bodies.
    pub fn body_count(&self) -> usize {
        self.counts.len()
    }

    /// Total number of generalized coordinates across all bodies.
    pub fn total(&self) -> usize {
        match (self.offsets.last(), self.counts.last()) {
            (Some(offset), Some(count)) => offset + count,
            _ => 0,
        }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// DOF count of one body.
    pub fn count(&self, body: BodyId) -> Result<usize, LayoutError> {
        self.counts
            .get(body.0)
            .copied()
            .ok_or(LayoutError::UnknownBody(body))
    }

    /// Index range of one body inside a flat vector.
    pub fn range(&self, body: BodyId) -> Result<Range<usize>, LayoutError> {
        let start = *self
            .offsets
            .get(body.0)
            .ok_or(LayoutError::UnknownBody(body))?;
        Ok(start..start + self.counts[body.0])
    }

    /// All body ids in layout order.
    pub fn bodies(&self) -> impl Iterator<Item = BodyId> + '_ {
        (0..self.counts.len()).map(BodyId)
    }

    /// Borrow one body's segment of a flat vector.
    pub fn segment<'a>(&self, flat: &'a [f64], body: BodyId) -> Result<&'a [f64], LayoutError> {
        self.check_len(flat.len())?;
        Ok(&flat[self.range(body)?])
    }

    /// Mutably borrow one body's segment of a flat vector.
    pub fn segment_mut<'a>(
        &self,
        flat: &'a mut [f64],
        body: BodyId,
    ) -> Result<&'a mut [f64], LayoutError> {
        self.check_len(flat.len())?;
        let range = self.range(body)?;
        Ok(&mut flat[range])
    }

    /// Fail unless `len` matches the total DOF count.
    pub fn check_len(&self, len: usize) -> Result<(), LayoutError> {
        if len == self.total() {
            Ok(())
        } else {
            Err(LayoutError::LengthMismatch {
                expected: self.total(),
                actual: len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_prefix_sums() {
        let layout = DofLayout::new([6, 33]);
        assert_eq!(layout.offsets(), &[0, 6]);
        assert_eq!(layout.counts(), &[6, 33]);
        assert_eq!(layout.total(), 39);
        assert_eq!(layout.body_count(), 2);
    }

    #[test]
    fn empty_layout_has_zero_total() {
        let layout = DofLayout::new(Vec::new());
        assert_eq!(layout.total(), 0);
        assert_eq!(layout.bodies().count(), 0);
    }

    #[test]
    fn segment_slices_by_body() {
        let layout = DofLayout::new([2, 3]);
        let flat = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(layout.segment(&flat, BodyId(0)).unwrap(), &[1.0, 2.0]);
        assert_eq!(layout.segment(&flat, BodyId(1)).unwrap(), &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn segment_mut_writes_in_place() {
        let layout = DofLayout::new([1, 2]);
        let mut flat = [0.0; 3];
        layout
            .segment_mut(&mut flat, BodyId(1))
            .unwrap()
            .copy_from_slice(&[7.0, 8.0]);
        assert_eq!(flat, [0.0, 7.0, 8.0]);
    }

    #[test]
    fn unknown_body_rejected() {
        let layout = DofLayout::new([2]);
        assert_eq!(
            layout.range(BodyId(1)),
            Err(LayoutError::UnknownBody(BodyId(1)))
        );
    }

    #[test]
    fn wrong_length_rejected() {
        let layout = DofLayout::new([2, 2]);
        let err = layout.segment(&[0.0; 3], BodyId(0)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn zero_dof_body_has_empty_segment() {
        let layout = DofLayout::new([2, 0, 1]);
        assert_eq!(layout.range(BodyId(1)).unwrap(), 2..2);
        assert_eq!(layout.total(), 3);
    }
}
