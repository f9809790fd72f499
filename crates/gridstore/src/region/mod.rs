//! Region store: rectangles with attached data, indexed by an R-tree.
//!
//! Every mutation is expressed as "remove these ids, insert these new regions", which
//! keeps the undo diff trivial and lets large batches rebuild the index in one go.
//! How a new region interacts with the regions it overlaps is decided by the store's
//! [`OverlapStrategy`]; structural edits (clear, insert, remove) are shared.

mod index;
pub mod strategy;

use core::fmt;
use core::marker::PhantomData;

use gridstore_common::{Axis, Interval, Position, Region, offset_between};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::{OverlapPolicy, RegionStoreConfig};
use crate::restore::RegionRestoreData;

use index::RegionIndex;
pub use strategy::{ConsolidateEqual, MergeOnOverlap, Mergeable, NoDedup, OverlapStrategy};

/// Store-assigned identity of a [`DataRegion`]. Ids are never reused by a store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub(crate) u64);

impl RegionId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A region paired with its value, the unit of storage in a region store.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRegion<T> {
    id: RegionId,
    region: Region,
    data: T,
}

impl<T> DataRegion<T> {
    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    #[inline]
    pub fn region(&self) -> &Region {
        &self.region
    }

    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_parts(self) -> (Region, T) {
        (self.region, self.data)
    }
}

/// Plain region store; see the aliases below for the deduplicating variants.
#[derive(Debug, Clone)]
pub struct RegionDataStore<T, S = NoDedup> {
    regions: FxHashMap<RegionId, DataRegion<T>>,
    index: RegionIndex,
    next_id: u64,
    config: RegionStoreConfig,
    _strategy: PhantomData<S>,
}

/// Regions carrying equal data never overlap.
pub type ConsolidatedDataStore<T> = RegionDataStore<T, ConsolidateEqual>;

/// No two regions overlap; overlapping adds are resolved into merged data.
pub type MergeRegionDataStore<T> = RegionDataStore<T, MergeOnOverlap>;

impl<T, S> Default for RegionDataStore<T, S> {
    fn default() -> Self {
        Self::with_config(RegionStoreConfig::default())
    }
}

impl<T, S> RegionDataStore<T, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RegionStoreConfig) -> Self {
        Self {
            regions: FxHashMap::default(),
            index: RegionIndex::default(),
            next_id: 0,
            config,
            _strategy: PhantomData,
        }
    }

    #[inline]
    pub fn config(&self) -> &RegionStoreConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All stored regions, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &DataRegion<T>> + '_ {
        self.regions.values()
    }

    #[inline]
    pub fn get(&self, id: RegionId) -> Option<&DataRegion<T>> {
        self.regions.get(&id)
    }

    /// Regions sharing at least one cell with `region`, ordered by id.
    pub fn get_data_regions(&self, region: &Region) -> Vec<&DataRegion<T>> {
        let mut found: Vec<_> = self
            .index
            .intersecting(region)
            .filter_map(|id| self.regions.get(&id))
            .collect();
        found.sort_unstable_by_key(|dr| dr.id);
        found
    }

    pub fn get_data(&self, region: &Region) -> Vec<&T> {
        self.get_data_regions(region)
            .into_iter()
            .map(|dr| &dr.data)
            .collect()
    }

    pub fn get_regions(&self, region: &Region) -> Vec<Region> {
        self.get_data_regions(region)
            .into_iter()
            .map(|dr| dr.region)
            .collect()
    }

    pub fn get_data_at(&self, row: u32, col: u32) -> Vec<&T> {
        self.get_data(&Region::cell(row, col))
    }

    pub fn any(&self, region: &Region) -> bool {
        self.index.intersecting(region).next().is_some()
    }

    fn allocate(&mut self, region: Region, data: T) -> DataRegion<T> {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        DataRegion { id, region, data }
    }

    /// Remove `remove` and insert the given regions verbatim (ids included).
    /// Returns the removed regions.
    fn apply_raw(
        &mut self,
        remove: &[RegionId],
        insert: Vec<DataRegion<T>>,
    ) -> Vec<DataRegion<T>> {
        let rebuild = self.index.prefers_rebuild(remove.len() + insert.len());
        let mut removed = Vec::with_capacity(remove.len());
        for id in remove {
            let Some(dr) = self.regions.remove(id) else {
                continue;
            };
            if !rebuild {
                self.index.remove(dr.id, &dr.region);
            }
            removed.push(dr);
        }
        for dr in insert {
            if !rebuild {
                self.index.insert(dr.id, &dr.region);
            }
            self.regions.insert(dr.id, dr);
        }
        if rebuild {
            self.index
                .rebuild(self.regions.values().map(|dr| (dr.id, &dr.region)));
        }
        removed
    }
}

impl<T: Clone, S> RegionDataStore<T, S> {
    /// Remove `remove` and add fresh regions for `add`, recording both.
    pub(crate) fn apply(
        &mut self,
        remove: &[RegionId],
        add: Vec<(Region, T)>,
    ) -> RegionRestoreData<T> {
        if remove.is_empty() && add.is_empty() {
            return RegionRestoreData::default();
        }
        let added: Vec<DataRegion<T>> = add
            .into_iter()
            .map(|(region, data)| self.allocate(region, data))
            .collect();
        let removed = self.apply_raw(remove, added.clone());
        RegionRestoreData { added, removed }
    }

    /// Delete every stored region overlapping `region`, keeping the parts outside it.
    pub fn clear(&mut self, region: &Region) -> RegionRestoreData<T> {
        self.clear_where(region, |_| true)
    }

    fn clear_where(
        &mut self,
        region: &Region,
        mut keep: impl FnMut(&T) -> bool,
    ) -> RegionRestoreData<T> {
        let mut remove = Vec::new();
        let mut add = Vec::new();
        for dr in self.get_data_regions(region) {
            if !keep(&dr.data) {
                continue;
            }
            remove.push(dr.id);
            add.extend(
                dr.region
                    .break_region(region)
                    .into_iter()
                    .map(|piece| (piece, dr.data.clone())),
            );
        }
        self.apply(&remove, add)
    }

    pub fn insert_rows(
        &mut self,
        index: u32,
        count: u32,
        expand: Option<bool>,
    ) -> RegionRestoreData<T> {
        self.insert_at(Axis::Row, index, count, expand)
    }

    pub fn insert_cols(
        &mut self,
        index: u32,
        count: u32,
        expand: Option<bool>,
    ) -> RegionRestoreData<T> {
        self.insert_at(Axis::Col, index, count, expand)
    }

    /// Open `count` rows/cols at `index`.
    ///
    /// Regions starting at or after `index` shift; regions spanning `index` grow.
    /// With `expand` (defaulting to the store config), a region ending right before
    /// `index` grows as well. Regions covering the whole axis are left alone.
    pub fn insert_at(
        &mut self,
        axis: Axis,
        index: u32,
        count: u32,
        expand: Option<bool>,
    ) -> RegionRestoreData<T> {
        if count == 0 {
            return RegionRestoreData::default();
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("region_insert", ?axis, index, count).entered();

        let expand = expand.unwrap_or(self.config.expand_when_inserting_after);
        let reach_start = if expand { index.saturating_sub(1) } else { index };
        let reach = Region::all().with_interval(axis, Interval::from_start(reach_start));

        let mut remove = Vec::new();
        let mut add = Vec::new();
        for dr in self.get_data_regions(&reach) {
            let iv = dr.region.interval(axis);
            if iv == Interval::full() {
                continue;
            }
            let moved = if iv.start() >= index {
                iv.shifted(i64::from(count))
            } else if iv.end() >= index || (expand && iv.end().checked_add(1) == Some(index)) {
                iv.expanded(count)
            } else {
                continue;
            };
            if moved == iv {
                continue;
            }
            remove.push(dr.id);
            add.push((dr.region.with_interval(axis, moved), dr.data.clone()));
        }
        self.apply(&remove, add)
    }

    pub fn remove_rows(&mut self, start: u32, end: u32) -> RegionRestoreData<T> {
        self.remove_at(Axis::Row, start, end)
    }

    pub fn remove_cols(&mut self, start: u32, end: u32) -> RegionRestoreData<T> {
        self.remove_at(Axis::Col, start, end)
    }

    /// Delete rows/cols `[start, end]` and close the gap.
    ///
    /// A region left with at most `min_area` cells is dropped. A region the removed
    /// span cuts through the middle of is contracted. Otherwise the surviving part
    /// is kept and moved back if it lay after the span.
    pub fn remove_at(&mut self, axis: Axis, start: u32, end: u32) -> RegionRestoreData<T> {
        let span = Interval::new(start, end);
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("region_remove", ?axis, %span).entered();

        let len = i64::try_from(span.len()).unwrap_or(i64::MAX);
        let removed = Region::all().with_interval(axis, span);
        let reach = Region::all().with_interval(axis, Interval::from_start(span.start()));

        let mut remove = Vec::new();
        let mut add = Vec::new();
        for dr in self.get_data_regions(&reach) {
            let iv = dr.region.interval(axis);
            remove.push(dr.id);
            if iv.start() > span.end() {
                add.push((dr.region.with_interval(axis, iv.shifted(-len)), dr.data.clone()));
                continue;
            }
            let pieces = dr.region.break_region(&removed);
            let remaining: u128 = pieces.iter().map(Region::area).sum();
            if remaining <= self.config.min_area {
                continue;
            }
            if iv.start() < span.start() && iv.end() > span.end() {
                let shrunk = iv.contracted(u32::try_from(len).unwrap_or(u32::MAX));
                add.push((dr.region.with_interval(axis, shrunk), dr.data.clone()));
                continue;
            }
            for piece in pieces {
                let piv = piece.interval(axis);
                let piece = if piv.start() > span.end() {
                    piece.with_interval(axis, piv.shifted(-len))
                } else {
                    piece
                };
                add.push((piece, dr.data.clone()));
            }
        }
        self.apply(&remove, add)
    }

    /// Independent store holding the parts of this store inside `region`, moved to
    /// start at (0, 0) when `reset_offsets` is set.
    pub fn sub_store(&self, region: &Region, reset_offsets: bool) -> RegionDataStore<T, S> {
        let (drow, dcol) = if reset_offsets {
            offset_between(region.top_left(), Position::new(0, 0))
        } else {
            (0, 0)
        };
        let mut out = RegionDataStore::with_config(self.config.clone());
        let pieces: Vec<_> = self
            .get_data_regions(region)
            .into_iter()
            .filter_map(|dr| {
                let hit = dr.region.intersection(region)?;
                Some((hit.translate(drow, dcol), dr.data.clone()))
            })
            .collect();
        let inserted: Vec<_> = pieces
            .into_iter()
            .map(|(r, d)| out.allocate(r, d))
            .collect();
        out.apply_raw(&[], inserted);
        out
    }

    /// Undo the changes described by `data`.
    pub fn restore(&mut self, data: RegionRestoreData<T>) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "region_restore",
            added = data.added.len(),
            removed = data.removed.len()
        )
        .entered();

        let added: FxHashSet<RegionId> = data.added.iter().map(|dr| dr.id).collect();
        let removed: FxHashSet<RegionId> = data.removed.iter().map(|dr| dr.id).collect();
        let delete: Vec<RegionId> = data
            .added
            .iter()
            .map(|dr| dr.id)
            .filter(|id| !removed.contains(id))
            .collect();
        let reinsert: Vec<DataRegion<T>> = data
            .removed
            .into_iter()
            .filter(|dr| !added.contains(&dr.id))
            .collect();
        self.apply_raw(&delete, reinsert);
    }
}

impl<T: Clone + PartialEq, S> RegionDataStore<T, S> {
    /// Like [`clear`](Self::clear), restricted to regions whose data equals `data`.
    pub fn clear_data(&mut self, region: &Region, data: &T) -> RegionRestoreData<T> {
        self.clear_where(region, |d| d == data)
    }
}

impl<T: Clone + PartialEq, S: OverlapStrategy<T>> RegionDataStore<T, S> {
    #[inline]
    pub fn policy(&self) -> OverlapPolicy {
        S::POLICY
    }

    /// Add `data` over `region`, resolving overlaps per the store's strategy.
    pub fn add(&mut self, region: Region, data: T) -> RegionRestoreData<T> {
        S::add(self, region, data)
    }

    /// Copy the regions inside `from` so that its top-left lands on `to`, replacing
    /// whatever the destination held.
    pub fn copy(&mut self, from: &Region, to: Position) -> RegionRestoreData<T> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("region_copy", %from, %to).entered();

        let (drow, dcol) = offset_between(from.top_left(), to);
        let pieces: Vec<(Region, T)> = self
            .get_data_regions(from)
            .into_iter()
            .filter_map(|dr| {
                let hit = dr.region.intersection(from)?;
                Some((hit.translate(drow, dcol), dr.data.clone()))
            })
            .collect();

        let mut restore = self.clear(&from.translate(drow, dcol));
        for (region, data) in pieces {
            restore.merge(self.add(region, data));
        }
        restore
    }
}
