use core::fmt;

use crate::error::GeometryError;
use crate::interval::shift_index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Zero-based cell coordinate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Offset by a signed delta on each axis, clamping at zero.
    #[inline]
    pub fn offset(self, drow: i64, dcol: i64) -> Self {
        Self {
            row: shift_index(self.row, drow),
            col: shift_index(self.col, dcol),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(u32, u32)> for Position {
    fn from(value: (u32, u32)) -> Self {
        Position::new(value.0, value.1)
    }
}

impl From<Position> for (u32, u32) {
    fn from(value: Position) -> Self {
        (value.row, value.col)
    }
}

impl TryFrom<(i64, i64)> for Position {
    type Error = GeometryError;

    fn try_from(value: (i64, i64)) -> Result<Self, Self::Error> {
        let (row, col) = value;
        if row < 0 {
            return Err(GeometryError::NegativeRow(row));
        }
        if col < 0 {
            return Err(GeometryError::NegativeCol(col));
        }
        let row = u32::try_from(row).map_err(|_| GeometryError::IndexOverflow(row))?;
        let col = u32::try_from(col).map_err(|_| GeometryError::IndexOverflow(col))?;
        Ok(Position::new(row, col))
    }
}
