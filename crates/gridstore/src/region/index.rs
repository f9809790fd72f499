use gridstore_common::Region;
use rstar::{AABB, RTree, RTreeObject};

use super::RegionId;

/// Batches at least this large (and at least as large as the live tree) rebuild the
/// tree with `bulk_load` instead of inserting one entry at a time.
const BULK_REBUILD_MIN: usize = 64;

/// Envelope scalar. Whole-row and whole-column rectangles both reach `u32::MAX`, so the
/// area of a node covering them is about 2^64 and needs more than 64 signed bits.
type Coord = i128;

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    id: RegionId,
    envelope: AABB<[Coord; 2]>,
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for IndexEntry {}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[Coord; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope(region: &Region) -> AABB<[Coord; 2]> {
    let min = [region.top().into(), region.left().into()];
    let max = [region.bottom().into(), region.right().into()];
    AABB::from_corners(min, max)
}

/// R-tree over region rectangles, keyed by region id.
#[derive(Debug, Clone, Default)]
pub(crate) struct RegionIndex {
    tree: RTree<IndexEntry>,
}

impl RegionIndex {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tree.size()
    }

    pub(crate) fn insert(&mut self, id: RegionId, region: &Region) {
        self.tree.insert(IndexEntry {
            id,
            envelope: envelope(region),
        });
    }

    pub(crate) fn remove(&mut self, id: RegionId, region: &Region) -> bool {
        self.tree
            .remove(&IndexEntry {
                id,
                envelope: envelope(region),
            })
            .is_some()
    }

    /// Ids of every indexed rectangle sharing at least one cell with `region`.
    pub(crate) fn intersecting(&self, region: &Region) -> impl Iterator<Item = RegionId> + '_ {
        self.tree
            .locate_in_envelope_intersecting(&envelope(region))
            .map(|entry| entry.id)
    }

    /// Whether a batch touching `touched` entries should go through [`rebuild`](Self::rebuild).
    #[inline]
    pub(crate) fn prefers_rebuild(&self, touched: usize) -> bool {
        touched >= BULK_REBUILD_MIN && touched >= self.tree.size()
    }

    /// Replace the whole tree with one bulk-loaded from `entries`.
    pub(crate) fn rebuild<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (RegionId, &'a Region)>,
    {
        let entries: Vec<IndexEntry> = entries
            .into_iter()
            .map(|(id, region)| IndexEntry {
                id,
                envelope: envelope(region),
            })
            .collect();
        #[cfg(feature = "tracing")]
        tracing::debug!(entries = entries.len(), "bulk rebuilding region index");
        self.tree = RTree::bulk_load(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(index: &RegionIndex, region: Region) -> Vec<RegionId> {
        let mut ids: Vec<_> = index.intersecting(&region).collect();
        ids.sort();
        ids
    }

    #[test]
    fn intersecting_is_inclusive_on_edges() {
        let mut index = RegionIndex::default();
        index.insert(RegionId(1), &Region::new(0, 2, 0, 2));
        index.insert(RegionId(2), &Region::new(3, 4, 3, 4));
        assert_eq!(ids(&index, Region::cell(2, 2)), vec![RegionId(1)]);
        assert_eq!(ids(&index, Region::new(2, 3, 2, 3)), vec![RegionId(1), RegionId(2)]);
        assert!(ids(&index, Region::cell(0, 4)).is_empty());
    }

    #[test]
    fn unbounded_regions_are_found_far_away() {
        let mut index = RegionIndex::default();
        index.insert(RegionId(7), &Region::cols(5, 5));
        assert_eq!(ids(&index, Region::cell(4_000_000_000, 5)), vec![RegionId(7)]);
        assert!(index.remove(RegionId(7), &Region::cols(5, 5)));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn whole_rows_and_columns_split_without_overflow() {
        let mut index = RegionIndex::default();
        for i in 0..16u32 {
            let region = if i % 2 == 0 {
                Region::rows(i, i)
            } else {
                Region::cols(i, i)
            };
            index.insert(RegionId(u64::from(i)), &region);
        }
        assert_eq!(index.len(), 16);
        assert_eq!(
            ids(&index, Region::cell(4, 1)),
            vec![RegionId(1), RegionId(4)]
        );
        assert_eq!(ids(&index, Region::cell(3_000_000_000, 15)), vec![RegionId(15)]);
        assert!(index.remove(RegionId(4), &Region::rows(4, 4)));
        assert_eq!(ids(&index, Region::cell(4, 1)), vec![RegionId(1)]);
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut index = RegionIndex::default();
        index.insert(RegionId(1), &Region::cell(0, 0));
        let regions: Vec<_> = (0..100u32)
            .map(|i| (RegionId(u64::from(i) + 10), Region::cell(i, i)))
            .collect();
        assert!(index.prefers_rebuild(regions.len()));
        index.rebuild(regions.iter().map(|(id, r)| (*id, r)));
        assert_eq!(index.len(), 100);
        assert_eq!(ids(&index, Region::cell(0, 0)), vec![RegionId(10)]);
    }
}
