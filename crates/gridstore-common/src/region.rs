use core::fmt;

use smallvec::SmallVec;

use crate::axis::Axis;
use crate::interval::Interval;
use crate::position::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle of cells, inclusive on every edge.
///
/// Either axis may be unbounded (`end == Interval::UNBOUNDED`): `Region::rows(2, 4)`
/// covers rows 2..=4 across every column.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region {
    pub rows: Interval,
    pub cols: Interval,
}

/// Remainder of a region after [`Region::break_region`]; never more than four pieces.
pub type RegionPieces = SmallVec<[Region; 4]>;

impl Region {
    /// `Region::new(row_start, row_end, col_start, col_end)`; reversed bounds are swapped.
    #[inline]
    pub fn new(row_start: u32, row_end: u32, col_start: u32, col_end: u32) -> Self {
        Self {
            rows: Interval::new(row_start, row_end),
            cols: Interval::new(col_start, col_end),
        }
    }

    #[inline]
    pub fn from_intervals(rows: Interval, cols: Interval) -> Self {
        Self { rows, cols }
    }

    #[inline]
    pub fn cell(row: u32, col: u32) -> Self {
        Self::new(row, row, col, col)
    }

    /// Whole rows `start..=end`.
    #[inline]
    pub fn rows(start: u32, end: u32) -> Self {
        Self::from_intervals(Interval::new(start, end), Interval::full())
    }

    /// Whole columns `start..=end`.
    #[inline]
    pub fn cols(start: u32, end: u32) -> Self {
        Self::from_intervals(Interval::full(), Interval::new(start, end))
    }

    /// Every cell of the sheet.
    #[inline]
    pub fn all() -> Self {
        Self::from_intervals(Interval::full(), Interval::full())
    }

    /// Rectangle of the given size anchored at `top_left`.
    pub fn from_position(top_left: Position, height: u32, width: u32) -> Self {
        let height = height.max(1);
        let width = width.max(1);
        Self::new(
            top_left.row,
            top_left.row.saturating_add(height - 1),
            top_left.col,
            top_left.col.saturating_add(width - 1),
        )
    }

    #[inline]
    pub fn top(&self) -> u32 {
        self.rows.start()
    }

    #[inline]
    pub fn bottom(&self) -> u32 {
        self.rows.end()
    }

    #[inline]
    pub fn left(&self) -> u32 {
        self.cols.start()
    }

    #[inline]
    pub fn right(&self) -> u32 {
        self.cols.end()
    }

    #[inline]
    pub fn top_left(&self) -> Position {
        Position::new(self.rows.start(), self.cols.start())
    }

    #[inline]
    pub fn height(&self) -> u64 {
        self.rows.len()
    }

    #[inline]
    pub fn width(&self) -> u64 {
        self.cols.len()
    }

    /// Number of cells covered. Unbounded regions report their nominal (huge) size.
    #[inline]
    pub fn area(&self) -> u128 {
        u128::from(self.height()) * u128::from(self.width())
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.rows.is_unbounded() || self.cols.is_unbounded()
    }

    /// The interval this region spans along `axis` (`Axis::Row` gives the rows).
    #[inline]
    pub fn interval(&self, axis: Axis) -> Interval {
        match axis {
            Axis::Row => self.rows,
            Axis::Col => self.cols,
        }
    }

    #[inline]
    pub fn with_interval(&self, axis: Axis, interval: Interval) -> Region {
        match axis {
            Axis::Row => Region::from_intervals(interval, self.cols),
            Axis::Col => Region::from_intervals(self.rows, interval),
        }
    }

    #[inline]
    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.rows.contains(row) && self.cols.contains(col)
    }

    #[inline]
    pub fn contains_position(&self, pos: Position) -> bool {
        self.contains(pos.row, pos.col)
    }

    #[inline]
    pub fn contains_region(&self, other: &Region) -> bool {
        self.rows.contains_interval(other.rows) && self.cols.contains_interval(other.cols)
    }

    #[inline]
    pub fn intersects(&self, other: &Region) -> bool {
        self.rows.overlaps(other.rows) && self.cols.overlaps(other.cols)
    }

    pub fn intersection(&self, other: &Region) -> Option<Region> {
        Some(Region::from_intervals(
            self.rows.intersection(other.rows)?,
            self.cols.intersection(other.cols)?,
        ))
    }

    /// Subtract `other` from `self`.
    ///
    /// Returns the disjoint pieces of `self` lying outside `other`: full-width bands
    /// above and below the intersection, then the left and right pieces beside it.
    /// A region that does not intersect `other` comes back unchanged; one fully
    /// covered by `other` yields no pieces.
    pub fn break_region(&self, other: &Region) -> RegionPieces {
        let mut pieces = RegionPieces::new();
        let Some(hit) = self.intersection(other) else {
            pieces.push(*self);
            return pieces;
        };

        if hit.top() > self.top() {
            pieces.push(Region::from_intervals(
                Interval::new(self.top(), hit.top() - 1),
                self.cols,
            ));
        }
        if hit.bottom() < self.bottom() {
            pieces.push(Region::from_intervals(
                Interval::new(hit.bottom() + 1, self.bottom()),
                self.cols,
            ));
        }
        if hit.left() > self.left() {
            pieces.push(Region::from_intervals(
                hit.rows,
                Interval::new(self.left(), hit.left() - 1),
            ));
        }
        if hit.right() < self.right() {
            pieces.push(Region::from_intervals(
                hit.rows,
                Interval::new(hit.right() + 1, self.right()),
            ));
        }
        pieces
    }

    /// Move by a signed offset; unbounded ends stay unbounded.
    #[inline]
    pub fn translate(&self, drow: i64, dcol: i64) -> Region {
        Region::from_intervals(self.rows.shifted(drow), self.cols.shifted(dcol))
    }

    /// Move the region so its top-left corner lands on `pos`.
    #[inline]
    pub fn moved_to(&self, pos: Position) -> Region {
        let (drow, dcol) = offset_between(self.top_left(), pos);
        self.translate(drow, dcol)
    }
}

/// Signed `(drow, dcol)` that carries `from` onto `to`.
#[inline]
pub fn offset_between(from: Position, to: Position) -> (i64, i64) {
    (
        i64::from(to.row) - i64::from(from.row),
        i64::from(to.col) - i64::from(from.col),
    )
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows {} x cols {}", self.rows, self.cols)
    }
}

impl From<Position> for Region {
    fn from(pos: Position) -> Self {
        Region::cell(pos.row, pos.col)
    }
}
