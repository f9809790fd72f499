//! Overlap resolution for [`RegionDataStore::add`].
//!
//! Each strategy is a zero-sized tag chosen through the store's type parameter, so
//! the store is monomorphized per strategy and `add` dispatches statically.

use gridstore_common::Region;

use super::RegionDataStore;
use crate::config::OverlapPolicy;
use crate::restore::RegionRestoreData;

/// Values that can absorb another value of the same type, e.g. layering one cell
/// format over another. `self` is the existing value and `other` the newer one.
pub trait Mergeable {
    fn merge(&mut self, other: &Self);
}

/// Decides how a newly added region interacts with the regions it overlaps.
pub trait OverlapStrategy<T>: Sized {
    const POLICY: OverlapPolicy;

    fn add(store: &mut RegionDataStore<T, Self>, region: Region, data: T) -> RegionRestoreData<T>;
}

/// Insert as-is; overlapping regions coexist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDedup;

/// Regions with equal data are split so they never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidateEqual;

/// Overlaps are resolved into a region carrying the merged data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOnOverlap;

impl<T: Clone + PartialEq> OverlapStrategy<T> for NoDedup {
    const POLICY: OverlapPolicy = OverlapPolicy::NoDedup;

    fn add(store: &mut RegionDataStore<T, Self>, region: Region, data: T) -> RegionRestoreData<T> {
        store.apply(&[], vec![(region, data)])
    }
}

impl<T: Clone + PartialEq> OverlapStrategy<T> for ConsolidateEqual {
    const POLICY: OverlapPolicy = OverlapPolicy::ConsolidateEqual;

    fn add(store: &mut RegionDataStore<T, Self>, region: Region, data: T) -> RegionRestoreData<T> {
        let equal: Vec<_> = store
            .get_data_regions(&region)
            .into_iter()
            .filter(|dr| dr.data == data)
            .collect();
        if equal.iter().any(|dr| dr.region.contains_region(&region)) {
            return RegionRestoreData::default();
        }

        let remove: Vec<_> = equal.iter().map(|dr| dr.id).collect();
        let mut add: Vec<(Region, T)> = equal
            .iter()
            .flat_map(|dr| {
                dr.region
                    .break_region(&region)
                    .into_iter()
                    .map(|piece| (piece, dr.data.clone()))
            })
            .collect();
        add.push((region, data));
        store.apply(&remove, add)
    }
}

impl<T: Clone + PartialEq + Mergeable> OverlapStrategy<T> for MergeOnOverlap {
    const POLICY: OverlapPolicy = OverlapPolicy::MergeOnOverlap;

    fn add(store: &mut RegionDataStore<T, Self>, region: Region, data: T) -> RegionRestoreData<T> {
        let overlaps = store.get_data_regions(&region);
        if overlaps
            .iter()
            .any(|dr| dr.data == data && dr.region.contains_region(&region))
        {
            return RegionRestoreData::default();
        }

        let mut remove = Vec::with_capacity(overlaps.len());
        let mut add = Vec::new();
        let mut leftovers = vec![region];
        for dr in overlaps {
            remove.push(dr.id);
            if dr.data == data && region.contains_region(&dr.region) {
                continue;
            }
            let Some(hit) = dr.region.intersection(&region) else {
                continue;
            };
            let mut merged = dr.data.clone();
            merged.merge(&data);
            add.push((hit, merged));
            add.extend(
                dr.region
                    .break_region(&region)
                    .into_iter()
                    .map(|piece| (piece, dr.data.clone())),
            );
            leftovers = leftovers
                .into_iter()
                .flat_map(|piece| piece.break_region(&hit))
                .collect();
        }
        add.extend(leftovers.into_iter().map(|piece| (piece, data.clone())));
        store.apply(&remove, add)
    }
}
