//! Point store: one value per cell.
//!
//! Layout is column-of-sorted-rows: an ordered map of columns, each holding an
//! ordered map of rows. Everything that walks cells (region queries, clears,
//! shifts) touches only occupied entries, so cost follows sheet usage rather than
//! declared sheet size.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use gridstore_common::{Axis, Interval, Position, Region, offset_between, shift_index};

use crate::restore::{MatrixOp, MatrixRestoreData};

#[derive(Debug, Clone)]
pub struct SparseMatrixStore<T> {
    columns: BTreeMap<u32, BTreeMap<u32, T>>,
    default_value: T,
    len: usize,
}

impl<T: Clone + Default> Default for SparseMatrixStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone> SparseMatrixStore<T> {
    /// Create an empty store; `default_value` is what every unset cell reads as.
    pub fn new(default_value: T) -> Self {
        Self {
            columns: BTreeMap::new(),
            default_value,
            len: 0,
        }
    }

    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Number of occupied cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, row: u32, col: u32) -> &T {
        self.try_get(row, col).unwrap_or(&self.default_value)
    }

    #[inline]
    pub fn try_get(&self, row: u32, col: u32) -> Option<&T> {
        self.columns.get(&col)?.get(&row)
    }

    #[inline]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.try_get(row, col).is_some()
    }

    pub fn set(&mut self, row: u32, col: u32, value: T) -> MatrixRestoreData<T> {
        let mut restore = MatrixRestoreData::default();
        let previous = self.put(row, col, value);
        restore.record_value(row, col, previous);
        restore
    }

    pub fn batch_set<I>(&mut self, items: I) -> MatrixRestoreData<T>
    where
        I: IntoIterator<Item = (u32, u32, T)>,
    {
        let mut restore = MatrixRestoreData::default();
        for (row, col, value) in items {
            let previous = self.put(row, col, value);
            restore.record_value(row, col, previous);
        }
        restore
    }

    /// Remove a single cell. Clearing an empty cell records nothing.
    pub fn clear(&mut self, row: u32, col: u32) -> MatrixRestoreData<T> {
        let mut restore = MatrixRestoreData::default();
        if let Some(previous) = self.take(row, col) {
            restore.record_value(row, col, Some(previous));
        }
        restore
    }

    pub fn clear_region(&mut self, region: &Region) -> MatrixRestoreData<T> {
        let positions = self.non_empty_positions(region);
        self.clear_positions(positions)
    }

    pub fn clear_positions<I>(&mut self, positions: I) -> MatrixRestoreData<T>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut restore = MatrixRestoreData::default();
        for pos in positions {
            if let Some(previous) = self.take(pos.row, pos.col) {
                restore.record_value(pos.row, pos.col, Some(previous));
            }
        }
        restore
    }

    pub fn insert_row_at(&mut self, row: u32, count: u32) -> MatrixRestoreData<T> {
        self.insert_at(Axis::Row, row, count)
    }

    pub fn insert_col_at(&mut self, col: u32, count: u32) -> MatrixRestoreData<T> {
        self.insert_at(Axis::Col, col, count)
    }

    pub fn remove_row_at(&mut self, row: u32, count: u32) -> MatrixRestoreData<T> {
        self.remove_at(Axis::Row, row, count)
    }

    pub fn remove_col_at(&mut self, col: u32, count: u32) -> MatrixRestoreData<T> {
        self.remove_at(Axis::Col, col, count)
    }

    /// Shift every entry at `index` or beyond on `axis` forward by `count`.
    ///
    /// Entries that would land past [`Interval::MAX_FINITE`] are dropped; the
    /// restore-data brings them back.
    pub fn insert_at(&mut self, axis: Axis, index: u32, count: u32) -> MatrixRestoreData<T> {
        if count == 0 {
            return MatrixRestoreData::default();
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("matrix_insert", ?axis, index, count).entered();

        // Recorded ahead of the shift so undo re-puts them at their old coordinates.
        let first_lost = (u32::MAX - count).max(index);
        let overflow = Region::all().with_interval(axis, Interval::from_start(first_lost));
        let mut restore = self.clear_region(&overflow);
        #[cfg(feature = "tracing")]
        if !restore.is_empty() {
            tracing::debug!(dropped = restore.ops.len(), "insert pushed cells off the sheet");
        }

        self.shift_from(axis, index, i64::from(count));
        restore.record_shift(axis, index, i64::from(count));
        restore
    }

    /// Delete entries in `[index, index + count)` on `axis` and close the gap.
    pub fn remove_at(&mut self, axis: Axis, index: u32, count: u32) -> MatrixRestoreData<T> {
        if count == 0 {
            return MatrixRestoreData::default();
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("matrix_remove", ?axis, index, count).entered();

        let band = band_region(axis, index, count);
        let mut restore = self.clear_region(&band);
        if let Some(after) = band.interval(axis).end().checked_add(1) {
            self.shift_from(axis, after, -i64::from(count));
        }
        restore.record_shift(axis, index, -i64::from(count));
        restore
    }

    /// Occupied positions inside `region`, column-major.
    pub fn non_empty_positions(&self, region: &Region) -> Vec<Position> {
        self.cells_in(*region).map(|(pos, _)| pos).collect()
    }

    /// Occupied cells inside `region` with their values, column-major.
    pub fn non_empty_data(&self, region: &Region) -> Vec<(Position, &T)> {
        self.cells_in(*region).collect()
    }

    /// Every occupied cell, column-major.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.columns.iter().flat_map(|(&col, rows)| {
            rows.iter()
                .map(move |(&row, value)| (Position::new(row, col), value))
        })
    }

    /// Copy the values of `from` so its top-left lands on `to`.
    ///
    /// The destination rectangle is cleared first, so cells that are empty in the
    /// source end up empty in the destination. Source and destination may overlap.
    pub fn copy(&mut self, from: &Region, to: Position) -> MatrixRestoreData<T> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("matrix_copy", %from, %to).entered();

        let (drow, dcol) = offset_between(from.top_left(), to);
        let snapshot: Vec<(Position, T)> = self
            .cells_in(*from)
            .map(|(pos, value)| (pos.offset(drow, dcol), value.clone()))
            .collect();

        let mut restore = self.clear_region(&from.translate(drow, dcol));
        for (pos, value) in snapshot {
            let previous = self.put(pos.row, pos.col, value);
            restore.record_value(pos.row, pos.col, previous);
        }
        restore
    }

    /// First occupied row in `col` strictly after `after_row`.
    pub fn next_non_blank_row(&self, col: u32, after_row: u32) -> Option<u32> {
        self.columns
            .get(&col)?
            .range((Excluded(after_row), Unbounded))
            .next()
            .map(|(&row, _)| row)
    }

    /// First occupied column in `row` strictly after `after_col`.
    pub fn next_non_blank_col(&self, row: u32, after_col: u32) -> Option<u32> {
        self.columns
            .range((Excluded(after_col), Unbounded))
            .find(|(_, rows)| rows.contains_key(&row))
            .map(|(&col, _)| col)
    }

    /// Independent store holding the values inside `region`.
    ///
    /// With `reset_offsets` the values are re-based so `region`'s top-left becomes (0, 0).
    pub fn sub_store(&self, region: &Region, reset_offsets: bool) -> SparseMatrixStore<T> {
        let (drow, dcol) = if reset_offsets {
            offset_between(region.top_left(), Position::new(0, 0))
        } else {
            (0, 0)
        };
        let mut out = SparseMatrixStore::new(self.default_value.clone());
        for (pos, value) in self.cells_in(*region) {
            let pos = pos.offset(drow, dcol);
            out.put(pos.row, pos.col, value.clone());
        }
        out
    }

    /// Undo the changes described by `data`.
    pub fn restore(&mut self, data: MatrixRestoreData<T>) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("matrix_restore", ops = data.ops.len()).entered();

        for op in data.ops.into_iter().rev() {
            match op {
                MatrixOp::Value { row, col, previous } => match previous {
                    Some(value) => {
                        self.put(row, col, value);
                    }
                    None => {
                        self.take(row, col);
                    }
                },
                MatrixOp::Shift { axis, index, delta } => {
                    let count = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
                    if delta > 0 {
                        // The inserted band is empty again by the time its shift is undone.
                        let band = band_region(axis, index, count);
                        for pos in self.non_empty_positions(&band) {
                            self.take(pos.row, pos.col);
                        }
                        if let Some(after) = band.interval(axis).end().checked_add(1) {
                            self.shift_from(axis, after, -delta);
                        }
                    } else {
                        self.shift_from(axis, index, i64::from(count));
                    }
                }
            }
        }
    }

    fn cells_in(&self, region: Region) -> impl Iterator<Item = (Position, &T)> + '_ {
        let (top, bottom) = (region.top(), region.bottom());
        self.columns
            .range(region.left()..=region.right())
            .flat_map(move |(&col, column)| {
                column
                    .range(top..=bottom)
                    .map(move |(&row, value)| (Position::new(row, col), value))
            })
    }

    fn put(&mut self, row: u32, col: u32, value: T) -> Option<T> {
        let previous = self.columns.entry(col).or_default().insert(row, value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    fn take(&mut self, row: u32, col: u32) -> Option<T> {
        let column = self.columns.get_mut(&col)?;
        let previous = column.remove(&row);
        if column.is_empty() {
            self.columns.remove(&col);
        }
        if previous.is_some() {
            self.len -= 1;
        }
        previous
    }

    /// Move every entry whose `axis` coordinate is `>= from` by `delta`.
    ///
    /// Callers guarantee the destination keys stay within `[0, MAX_FINITE]` and do not
    /// collide with entries before `from`.
    fn shift_from(&mut self, axis: Axis, from: u32, delta: i64) {
        match axis {
            Axis::Row => {
                for column in self.columns.values_mut() {
                    let tail = column.split_off(&from);
                    for (row, value) in tail {
                        column.insert(shift_index(row, delta), value);
                    }
                }
            }
            Axis::Col => {
                let tail = self.columns.split_off(&from);
                for (col, rows) in tail {
                    self.columns.insert(shift_index(col, delta), rows);
                }
            }
        }
    }
}

/// Whole-sheet band of `count` rows (or columns) starting at `index`.
fn band_region(axis: Axis, index: u32, count: u32) -> Region {
    let end = index.saturating_add(count - 1);
    Region::all().with_interval(axis, Interval::new(index, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(cells: &[(u32, u32, &'static str)]) -> SparseMatrixStore<&'static str> {
        let mut store = SparseMatrixStore::new("");
        for &(row, col, value) in cells {
            store.set(row, col, value);
        }
        store
    }

    fn snapshot<T: Clone>(store: &SparseMatrixStore<T>) -> Vec<(Position, T)> {
        store.iter().map(|(p, v)| (p, v.clone())).collect()
    }

    #[test]
    fn get_returns_default_for_absent_cells() {
        let store = store_with(&[(1, 1, "a")]);
        assert_eq!(*store.get(1, 1), "a");
        assert_eq!(*store.get(5, 5), "");
        assert!(store.try_get(5, 5).is_none());
        assert!(store.contains(1, 1));
    }

    #[test]
    fn set_records_previous_value() {
        let mut store = store_with(&[(0, 0, "old")]);
        let restore = store.set(0, 0, "new");
        assert_eq!(
            restore.previous_values().collect::<Vec<_>>(),
            vec![(Position::new(0, 0), Some(&"old"))]
        );
        store.restore(restore);
        assert_eq!(*store.get(0, 0), "old");
    }

    #[test]
    fn row_shift_scenario() {
        let mut store = SparseMatrixStore::new("");
        store.set(5, 0, "x");
        store.insert_row_at(0, 2);
        assert_eq!(*store.get(7, 0), "x");
        assert_eq!(*store.get(5, 0), "");
        store.remove_row_at(0, 2);
        assert_eq!(*store.get(5, 0), "x");
    }

    #[test]
    fn insert_before_untouched_entries() {
        let mut store = store_with(&[(1, 0, "a"), (4, 0, "b"), (4, 3, "c")]);
        store.insert_row_at(4, 3);
        assert_eq!(*store.get(1, 0), "a");
        assert_eq!(*store.get(7, 0), "b");
        assert_eq!(*store.get(7, 3), "c");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn remove_cols_deletes_band_and_restores() {
        let mut store = store_with(&[(0, 0, "a"), (0, 2, "b"), (3, 3, "c"), (0, 6, "d")]);
        let before = snapshot(&store);
        let restore = store.remove_col_at(2, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(*store.get(0, 4), "d");
        assert!(!store.contains(0, 2));
        store.restore(restore);
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn clear_unbounded_region_only_visits_occupied_cells() {
        let mut store = store_with(&[(0, 1, "a"), (100_000, 1, "b"), (2, 2, "c")]);
        let restore = store.clear_region(&Region::cols(1, 1));
        assert_eq!(store.len(), 1);
        assert_eq!(restore.previous_values().count(), 2);
        store.restore(restore);
        assert_eq!(*store.get(100_000, 1), "b");
    }

    #[test]
    fn copy_handles_overlapping_source_and_destination() {
        let mut store = store_with(&[(0, 0, "a"), (1, 0, "b"), (2, 0, "c")]);
        let before = snapshot(&store);
        let restore = store.copy(&Region::new(0, 2, 0, 0), Position::new(1, 0));
        assert_eq!(*store.get(0, 0), "a");
        assert_eq!(*store.get(1, 0), "a");
        assert_eq!(*store.get(2, 0), "b");
        assert_eq!(*store.get(3, 0), "c");
        store.restore(restore);
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn copy_clears_destination_holes() {
        let mut store = store_with(&[(0, 0, "a"), (5, 6, "z")]);
        store.copy(&Region::new(0, 1, 0, 1), Position::new(4, 5));
        assert_eq!(*store.get(4, 5), "a");
        assert!(!store.contains(5, 6));
    }

    #[test]
    fn next_non_blank_queries() {
        let store = store_with(&[(2, 1, "a"), (9, 1, "b"), (2, 7, "c")]);
        assert_eq!(store.next_non_blank_row(1, 0), Some(2));
        assert_eq!(store.next_non_blank_row(1, 2), Some(9));
        assert_eq!(store.next_non_blank_row(1, 9), None);
        assert_eq!(store.next_non_blank_row(4, 0), None);
        assert_eq!(store.next_non_blank_col(2, 1), Some(7));
        assert_eq!(store.next_non_blank_col(9, 1), None);
    }

    #[test]
    fn sub_store_rebases_when_asked() {
        let store = store_with(&[(3, 4, "a"), (4, 5, "b"), (9, 9, "out")]);
        let region = Region::new(3, 4, 4, 5);
        let rebased = store.sub_store(&region, true);
        assert_eq!(rebased.len(), 2);
        assert_eq!(*rebased.get(0, 0), "a");
        assert_eq!(*rebased.get(1, 1), "b");
        let kept = store.sub_store(&region, false);
        assert_eq!(*kept.get(3, 4), "a");
        assert!(!kept.contains(9, 9));
    }

    #[test]
    fn merged_restore_undoes_a_sequence() {
        let mut store = store_with(&[(1, 1, "a"), (3, 3, "b")]);
        let before = snapshot(&store);

        let mut undo = store.set(0, 0, "new");
        undo.merge(store.insert_row_at(1, 2));
        undo.merge(store.set(3, 1, "moved-over"));
        undo.merge(store.remove_col_at(0, 1));
        undo.merge(store.clear_region(&Region::all()));

        assert!(store.is_empty());
        store.restore(undo);
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn insert_drops_cells_pushed_off_the_sheet() {
        let last = Interval::MAX_FINITE;
        let mut store = store_with(&[(last, 0, "top"), (last - 1, 0, "below"), (3, 0, "a")]);
        let before = snapshot(&store);

        let restore = store.insert_row_at(0, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(*store.get(last, 0), "below");
        assert_eq!(*store.get(4, 0), "a");
        assert_eq!(
            restore.previous_values().collect::<Vec<_>>(),
            vec![(Position::new(last, 0), Some(&"top"))]
        );

        store.restore(restore);
        assert_eq!(store.len(), 3);
        assert_eq!(snapshot(&store), before);
    }

    #[test]
    fn insert_cols_near_the_edge_keeps_len_in_sync() {
        let last = Interval::MAX_FINITE;
        let mut store = store_with(&[(0, last - 2, "x"), (0, last - 1, "y"), (0, last, "z")]);
        let restore = store.insert_col_at(last - 2, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(*store.get(0, last), "x");
        assert_eq!(store.iter().count(), store.len());
        store.restore(restore);
        assert_eq!(
            snapshot(&store),
            vec![
                (Position::new(0, last - 2), "x"),
                (Position::new(0, last - 1), "y"),
                (Position::new(0, last), "z"),
            ]
        );
    }

    #[test]
    fn reversed_literal_bounds_are_normalized() {
        let mut store = store_with(&[(1, 0, "keep"), (3, 0, "a"), (4, 9, "b"), (7, 0, "keep")]);
        let region = Region {
            rows: Interval::new(5, 2),
            cols: Interval::full(),
        };
        assert_eq!(store.non_empty_positions(&region).len(), 2);

        let restore = store.clear_region(&region);
        assert_eq!(store.len(), 2);
        assert_eq!(*store.get(1, 0), "keep");
        assert_eq!(*store.get(7, 0), "keep");
        store.restore(restore);
        assert_eq!(*store.get(4, 9), "b");
    }

    #[test]
    fn zero_count_is_a_noop() {
        let mut store = store_with(&[(1, 1, "a")]);
        assert!(store.insert_row_at(0, 0).is_empty());
        assert!(store.remove_col_at(0, 0).is_empty());
        assert_eq!(*store.get(1, 1), "a");
    }
}
