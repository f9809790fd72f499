use core::fmt;

use crate::error::{GeometryError, checked_index};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive 1D range `[start, end]` along a single axis.
///
/// `end == Interval::UNBOUNDED` means the interval runs to the end of the sheet.
/// Shifting such an interval moves its start but never its end.
///
/// The bounds are only reachable through constructors, so `start <= end` always holds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(u32, u32)", into = "(u32, u32)"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: u32,
    end: u32,
}

const MAX_FINITE: u32 = Interval::MAX_FINITE;

impl Interval {
    pub const UNBOUNDED: u32 = u32::MAX;

    /// Largest finite index; finite ends are clamped here so they never collide with
    /// the unbounded marker.
    pub const MAX_FINITE: u32 = Self::UNBOUNDED - 1;

    /// Build an interval, swapping the bounds if they arrive reversed.
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    #[inline]
    pub fn point(index: u32) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    /// `[start, +inf]`.
    #[inline]
    pub fn from_start(start: u32) -> Self {
        Self {
            start,
            end: Self::UNBOUNDED,
        }
    }

    /// `[0, +inf]`.
    #[inline]
    pub fn full() -> Self {
        Self::from_start(0)
    }

    #[inline]
    pub fn start(self) -> u32 {
        self.start
    }

    #[inline]
    pub fn end(self) -> u32 {
        self.end
    }

    #[inline]
    pub fn is_unbounded(self) -> bool {
        self.end == Self::UNBOUNDED
    }

    /// Number of indices covered.
    #[inline]
    pub fn len(self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    #[inline]
    pub fn contains(self, index: u32) -> bool {
        self.start <= index && index <= self.end
    }

    #[inline]
    pub fn contains_interval(self, other: Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[inline]
    pub fn overlaps(self, other: Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersection(self, other: Interval) -> Option<Interval> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Interval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Move the interval by `delta`, clamping at zero. An unbounded end stays unbounded.
    pub fn shifted(self, delta: i64) -> Interval {
        let start = shift_index(self.start, delta);
        let end = if self.is_unbounded() {
            Self::UNBOUNDED
        } else {
            shift_index(self.end, delta)
        };
        Interval::new(start, end)
    }

    /// Grow the end by `n`.
    pub fn expanded(self, n: u32) -> Interval {
        if self.is_unbounded() {
            return self;
        }
        Interval {
            start: self.start,
            end: self.end.saturating_add(n).min(MAX_FINITE),
        }
    }

    /// Shrink the end by `n`, never past `start`.
    pub fn contracted(self, n: u32) -> Interval {
        if self.is_unbounded() {
            return self;
        }
        Interval {
            start: self.start,
            end: self.end.saturating_sub(n).max(self.start),
        }
    }
}

/// Shift a finite index by a signed amount, clamped to `[0, MAX_FINITE]`.
#[inline]
pub fn shift_index(index: u32, delta: i64) -> u32 {
    let shifted = i64::from(index)
        .saturating_add(delta)
        .clamp(0, i64::from(MAX_FINITE));
    shifted as u32
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "[{}, inf]", self.start)
        } else {
            write!(f, "[{}, {}]", self.start, self.end)
        }
    }
}

impl From<(u32, u32)> for Interval {
    fn from(value: (u32, u32)) -> Self {
        Interval::new(value.0, value.1)
    }
}

impl From<Interval> for (u32, u32) {
    fn from(value: Interval) -> Self {
        (value.start, value.end)
    }
}

impl TryFrom<(i64, i64)> for Interval {
    type Error = GeometryError;

    fn try_from(value: (i64, i64)) -> Result<Self, Self::Error> {
        Ok(Interval::new(checked_index(value.0)?, checked_index(value.1)?))
    }
}
