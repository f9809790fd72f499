//! Sizes along one axis (row heights, column widths) with prefix-sum queries.
//!
//! Explicit sizes live in a [`Range1DStore<f64>`]; every other index takes the
//! default size. A sorted breakpoint cache holds the running offset at both ends of
//! each explicit range, so `get_cumulative` and `get_position` are binary searches
//! over the explicit ranges rather than walks over indices. The cache is rebuilt
//! eagerly after each mutation, starting at the first breakpoint the mutation could
//! have changed.

use crate::error::{StoreError, StoreResult, check_size};
use crate::range1d::Range1DStore;
use crate::restore::Range1DRestoreData;

const MAX_INDEX: u64 = (u32::MAX - 1) as u64;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Breakpoint {
    start: u32,
    end: u32,
    size: f64,
    /// Offset of the first index of the range.
    cumulative_start: f64,
    /// Offset just past the last index of the range.
    cumulative_end: f64,
}

#[derive(Debug, Clone)]
pub struct CumulativeRange1DStore {
    sizes: Range1DStore<f64>,
    breakpoints: Vec<Breakpoint>,
}

impl CumulativeRange1DStore {
    /// Create a store whose unset indices measure `default_size`.
    ///
    /// Negative, NaN or infinite defaults are treated as zero; use [`try_new`](Self::try_new)
    /// to reject them instead.
    pub fn new(default_size: f64) -> Self {
        let default_size = if check_size(default_size) {
            default_size
        } else {
            0.0
        };
        Self {
            sizes: Range1DStore::new(default_size),
            breakpoints: Vec::new(),
        }
    }

    pub fn try_new(default_size: f64) -> StoreResult<Self> {
        if !check_size(default_size) {
            return Err(StoreError::InvalidDefaultSize(default_size));
        }
        Ok(Self::new(default_size))
    }

    #[inline]
    pub fn default_size(&self) -> f64 {
        *self.sizes.default_value()
    }

    /// The explicit sizes backing this store.
    #[inline]
    pub fn sizes(&self) -> &Range1DStore<f64> {
        &self.sizes
    }

    #[inline]
    pub fn get_size(&self, index: u32) -> f64 {
        *self.sizes.get(index)
    }

    /// Set every index in `[start, end]` to `size`. Invalid sizes are stored as zero.
    pub fn set_size(&mut self, start: u32, end: u32, size: f64) -> Range1DRestoreData<f64> {
        let size = if check_size(size) { size } else { 0.0 };
        let restore = self.sizes.set(start, end, size);
        self.recompute_from(start.min(end));
        restore
    }

    pub fn try_set_size(
        &mut self,
        start: u32,
        end: u32,
        size: f64,
    ) -> StoreResult<Range1DRestoreData<f64>> {
        if !check_size(size) {
            return Err(StoreError::InvalidSize { start, end, size });
        }
        Ok(self.set_size(start, end, size))
    }

    pub fn batch_set_sizes<I>(&mut self, items: I) -> Range1DRestoreData<f64>
    where
        I: IntoIterator<Item = (u32, u32, f64)>,
    {
        let items = items
            .into_iter()
            .map(|(start, end, size)| (start, end, if check_size(size) { size } else { 0.0 }));
        let restore = self.sizes.batch_set(items);
        if let Some(first) = restore.min_index() {
            self.recompute_from(first);
        }
        restore
    }

    /// Reset `[start, end]` to the default size.
    pub fn clear_sizes(&mut self, start: u32, end: u32) -> Range1DRestoreData<f64> {
        let restore = self.sizes.clear(start, end);
        if !restore.is_empty() {
            self.recompute_from(start.min(end));
        }
        restore
    }

    /// Remove `[start, end]`, pulling later indices back.
    pub fn cut(&mut self, start: u32, end: u32) -> Range1DRestoreData<f64> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("cumulative_cut", start, end).entered();

        let restore = self.sizes.cut(start, end);
        self.recompute_from(start.min(end));
        restore
    }

    /// Open `count` default-sized indices at `index`.
    pub fn insert_at(&mut self, index: u32, count: u32) -> Range1DRestoreData<f64> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("cumulative_insert", index, count).entered();

        let restore = self.sizes.insert_at(index, count);
        if !restore.is_empty() {
            self.recompute_from(index);
        }
        restore
    }

    pub fn restore(&mut self, data: Range1DRestoreData<f64>) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("cumulative_restore", ops = data.ops.len()).entered();

        let Some(first) = data.min_index() else {
            return;
        };
        self.sizes.restore(data);
        self.recompute_from(first);
    }

    /// Total size of every index strictly before `index`.
    pub fn get_cumulative(&self, index: u32) -> f64 {
        let d = self.default_size();
        let i = self.breakpoints.partition_point(|bp| bp.start < index);
        let Some(bp) = i.checked_sub(1).map(|i| &self.breakpoints[i]) else {
            return f64::from(index) * d;
        };
        if index <= bp.end {
            bp.cumulative_start + f64::from(index - bp.start) * bp.size
        } else {
            bp.cumulative_end + f64::from(index - bp.end - 1) * d
        }
    }

    /// Index whose extent contains `offset`: the `i` with
    /// `get_cumulative(i) <= offset < get_cumulative(i + 1)`.
    ///
    /// Offsets at or below zero map to index 0. When the default size is zero, an
    /// offset past the last explicit range maps to the index right after it.
    pub fn get_position(&self, offset: f64) -> u32 {
        if offset.is_nan() || offset <= 0.0 {
            return 0;
        }
        let i = self
            .breakpoints
            .partition_point(|bp| bp.cumulative_start <= offset);

        let (base, base_offset) = match i.checked_sub(1).map(|i| &self.breakpoints[i]) {
            None => (0_u64, 0.0),
            Some(bp) if offset < bp.cumulative_end => {
                let steps = ((offset - bp.cumulative_start) / bp.size).floor() as u64;
                let index = (u64::from(bp.start) + steps).min(u64::from(bp.end));
                return clamp_index(index);
            }
            Some(bp) => (u64::from(bp.end) + 1, bp.cumulative_end),
        };

        let d = self.default_size();
        if d <= 0.0 {
            return clamp_index(base);
        }
        let steps = ((offset - base_offset) / d).floor();
        clamp_index(base.saturating_add(steps as u64))
    }

    #[inline]
    pub fn get_size_between(&self, a: u32, b: u32) -> f64 {
        self.get_cumulative(b) - self.get_cumulative(a)
    }

    /// Drop every cached breakpoint that could be affected by a change at `index` and
    /// rebuild the tail of the cache. A range ending right before `index` may have
    /// been merged with one starting at it, so it is rebuilt too.
    fn recompute_from(&mut self, index: u32) {
        let keep = self
            .breakpoints
            .partition_point(|bp| bp.end.saturating_add(1) < index);
        self.breakpoints.truncate(keep);

        let d = self.default_size();
        let (mut next, mut offset) = match self.breakpoints.last() {
            Some(bp) => (u64::from(bp.end) + 1, bp.cumulative_end),
            None => (0_u64, 0.0),
        };
        let from = u32::try_from(next).unwrap_or(u32::MAX);
        for (start, end, &size) in self.sizes.ranges_from(from) {
            let cumulative_start = offset + (u64::from(start) - next) as f64 * d;
            let len = u64::from(end) - u64::from(start) + 1;
            let cumulative_end = cumulative_start + len as f64 * size;
            self.breakpoints.push(Breakpoint {
                start,
                end,
                size,
                cumulative_start,
                cumulative_end,
            });
            next = u64::from(end) + 1;
            offset = cumulative_end;
        }
    }
}

#[inline]
fn clamp_index(index: u64) -> u32 {
    index.min(MAX_INDEX) as u32
}
