//! Restore-data: the undo half of every store mutation.
//!
//! Each mutating call returns one of these values. Handing it back to `restore` on
//! the same store undoes the call. Values of the same kind can be concatenated with
//! `merge` to form a single undo step for a sequence of calls; an empty value is the
//! identity. A restore-data value is consumed by `restore` and must not be replayed.
//!
//! The point and 1D journals are ordered and undone back to front, so shifts and
//! value changes interleave correctly. The region variant is a plain added/removed
//! diff keyed by region id.

use gridstore_common::{Axis, Position};

use crate::region::DataRegion;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MatrixOp<T> {
    /// The cell held `previous` (or nothing) before being written or cleared.
    Value {
        row: u32,
        col: u32,
        previous: Option<T>,
    },
    /// Everything at `index` and beyond on `axis` moved by `delta`.
    Shift { axis: Axis, index: u32, delta: i64 },
}

/// Undo journal for [`SparseMatrixStore`](crate::matrix::SparseMatrixStore).
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRestoreData<T> {
    pub(crate) ops: Vec<MatrixOp<T>>,
}

impl<T> Default for MatrixRestoreData<T> {
    fn default() -> Self {
        Self { ops: Vec::new() }
    }
}

impl<T> MatrixRestoreData<T> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append `other`, which must describe changes made after the ones in `self`.
    pub fn merge(&mut self, other: MatrixRestoreData<T>) {
        self.ops.extend(other.ops);
    }

    pub fn merged(mut self, other: MatrixRestoreData<T>) -> Self {
        self.merge(other);
        self
    }

    /// Cells touched by this journal together with the value each held beforehand.
    pub fn previous_values(&self) -> impl Iterator<Item = (Position, Option<&T>)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            MatrixOp::Value { row, col, previous } => {
                Some((Position::new(*row, *col), previous.as_ref()))
            }
            MatrixOp::Shift { .. } => None,
        })
    }

    #[inline]
    pub(crate) fn record_value(&mut self, row: u32, col: u32, previous: Option<T>) {
        self.ops.push(MatrixOp::Value { row, col, previous });
    }

    #[inline]
    pub(crate) fn record_shift(&mut self, axis: Axis, index: u32, delta: i64) {
        if delta == 0 {
            return;
        }
        self.ops.push(MatrixOp::Shift { axis, index, delta });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Range1DOp<T> {
    /// `[start, end]` was rewritten; `previous` holds the explicit pieces it covered.
    Overwritten {
        start: u32,
        end: u32,
        previous: Vec<(u32, u32, T)>,
    },
    /// Everything at `index` and beyond moved by `delta`.
    Shift { index: u32, delta: i64 },
}

/// Undo journal for [`Range1DStore`](crate::range1d::Range1DStore) and the cumulative store.
#[derive(Debug, Clone, PartialEq)]
pub struct Range1DRestoreData<T> {
    pub(crate) ops: Vec<Range1DOp<T>>,
}

impl<T> Default for Range1DRestoreData<T> {
    fn default() -> Self {
        Self { ops: Vec::new() }
    }
}

impl<T> Range1DRestoreData<T> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn merge(&mut self, other: Range1DRestoreData<T>) {
        self.ops.extend(other.ops);
    }

    pub fn merged(mut self, other: Range1DRestoreData<T>) -> Self {
        self.merge(other);
        self
    }

    /// `(start, end, previous)` pieces displaced by the recorded writes, in order.
    pub fn overwritten(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.ops
            .iter()
            .flat_map(|op| match op {
                Range1DOp::Overwritten { previous, .. } => previous.iter(),
                Range1DOp::Shift { .. } => [].iter(),
            })
            .map(|(s, e, v)| (*s, *e, v))
    }

    /// Smallest index any recorded op touched.
    pub(crate) fn min_index(&self) -> Option<u32> {
        self.ops
            .iter()
            .map(|op| match op {
                Range1DOp::Overwritten { start, .. } => *start,
                Range1DOp::Shift { index, .. } => *index,
            })
            .min()
    }

    #[inline]
    pub(crate) fn record_overwritten(&mut self, start: u32, end: u32, previous: Vec<(u32, u32, T)>) {
        self.ops.push(Range1DOp::Overwritten {
            start,
            end,
            previous,
        });
    }

    #[inline]
    pub(crate) fn record_shift(&mut self, index: u32, delta: i64) {
        if delta == 0 {
            return;
        }
        self.ops.push(Range1DOp::Shift { index, delta });
    }
}

/// Undo diff for [`RegionDataStore`](crate::region::RegionDataStore).
///
/// `restore` deletes every region listed as added and re-inserts every region
/// listed as removed. A region that appears in both lists (added by one merged
/// call, removed by a later one) cancels out.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRestoreData<T> {
    pub(crate) added: Vec<DataRegion<T>>,
    pub(crate) removed: Vec<DataRegion<T>>,
}

impl<T> Default for RegionRestoreData<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> RegionRestoreData<T> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn merge(&mut self, other: RegionRestoreData<T>) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
    }

    pub fn merged(mut self, other: RegionRestoreData<T>) -> Self {
        self.merge(other);
        self
    }

    pub fn added(&self) -> &[DataRegion<T>] {
        &self.added
    }

    pub fn removed(&self) -> &[DataRegion<T>] {
        &self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_concatenates_in_order() {
        let mut a = MatrixRestoreData::<i32>::default();
        a.record_value(1, 1, None);
        let mut b = MatrixRestoreData::default();
        b.record_shift(Axis::Row, 0, 2);
        b.record_value(3, 1, Some(7));

        let merged = a.merged(b);
        assert_eq!(merged.ops.len(), 3);
        let prev: Vec<_> = merged.previous_values().collect();
        assert_eq!(
            prev,
            vec![(Position::new(1, 1), None), (Position::new(3, 1), Some(&7))]
        );
    }

    #[test]
    fn empty_is_identity() {
        let mut a = Range1DRestoreData::<f64>::default();
        a.record_shift(4, 0);
        assert!(a.is_empty());
        a.record_overwritten(1, 2, vec![(1, 2, 3.0)]);
        let merged = a.clone().merged(Range1DRestoreData::default());
        assert_eq!(merged, a);
        assert_eq!(merged.min_index(), Some(1));
        assert_eq!(merged.overwritten().collect::<Vec<_>>(), vec![(1, 2, &3.0)]);
    }
}
