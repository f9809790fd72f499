use gridstore::{
    ConsolidatedDataStore, MergeRegionDataStore, Mergeable, Position, Region, RegionDataStore,
    SparseMatrixStore,
};
use proptest::prelude::*;

const SPAN: u32 = 20;

fn region() -> impl Strategy<Value = Region> {
    prop_oneof![
        8 => (0..SPAN, 0..SPAN, 0..SPAN, 0..SPAN).prop_map(|(a, b, c, d)| Region::new(a, b, c, d)),
        1 => (0..SPAN, 0..SPAN).prop_map(|(a, b)| Region::rows(a, b)),
        1 => (0..SPAN, 0..SPAN).prop_map(|(a, b)| Region::cols(a, b)),
    ]
}

#[derive(Debug, Clone, PartialEq)]
struct Tags(u8);

impl Mergeable for Tags {
    fn merge(&mut self, other: &Self) {
        self.0 |= other.0;
    }
}

#[derive(Debug, Clone)]
enum Edit {
    Add(Region, u8),
    Clear(Region),
    InsertRows(u32, u32),
    RemoveCols(u32, u32),
    Copy(Region, u32, u32),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        6 => (region(), 0..3u8).prop_map(|(r, v)| Edit::Add(r, v)),
        1 => region().prop_map(Edit::Clear),
        1 => (0..SPAN, 1..4u32).prop_map(|(i, n)| Edit::InsertRows(i, n)),
        1 => (0..SPAN, 0..SPAN).prop_map(|(a, b)| Edit::RemoveCols(a, b)),
        1 => (region(), 0..SPAN, 0..SPAN).prop_map(|(r, row, col)| Edit::Copy(r, row, col)),
    ]
}

/// Pairs of stored regions that share a cell, optionally only among equal data.
fn overlapping_pairs<T: PartialEq, S>(
    store: &RegionDataStore<T, S>,
    same_data_only: bool,
) -> Vec<(Region, Region)> {
    let all: Vec<_> = store.iter().collect();
    let mut pairs = Vec::new();
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            if same_data_only && a.data() != b.data() {
                continue;
            }
            if a.region().intersects(b.region()) {
                pairs.push((*a.region(), *b.region()));
            }
        }
    }
    pairs
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn consolidated_equal_data_never_overlaps(edits in prop::collection::vec(edit(), 1..24)) {
        let mut store = ConsolidatedDataStore::<u8>::new();
        for e in &edits {
            match *e {
                Edit::Add(r, v) => { store.add(r, v); }
                Edit::Clear(ref r) => { store.clear(r); }
                Edit::InsertRows(i, n) => { store.insert_rows(i, n, None); }
                Edit::RemoveCols(a, b) => { store.remove_cols(a, b); }
                Edit::Copy(ref r, row, col) => { store.copy(r, Position::new(row, col)); }
            }
            let pairs = overlapping_pairs(&store, true);
            prop_assert!(pairs.is_empty(), "after {:?}: {:?}", e, pairs);
        }
    }

    #[test]
    fn merge_store_never_overlaps(edits in prop::collection::vec(edit(), 1..24)) {
        let mut store = MergeRegionDataStore::<Tags>::new();
        for e in &edits {
            match *e {
                Edit::Add(r, v) => { store.add(r, Tags(1 << v)); }
                Edit::Clear(ref r) => { store.clear(r); }
                Edit::InsertRows(i, n) => { store.insert_rows(i, n, None); }
                Edit::RemoveCols(a, b) => { store.remove_cols(a, b); }
                Edit::Copy(ref r, row, col) => { store.copy(r, Position::new(row, col)); }
            }
            let pairs = overlapping_pairs(&store, false);
            prop_assert!(pairs.is_empty(), "after {:?}: {:?}", e, pairs);
        }
    }

    #[test]
    fn merge_store_cell_carries_every_layer(adds in prop::collection::vec((region(), 0..8u8), 1..12)) {
        let mut store = MergeRegionDataStore::<Tags>::new();
        for &(r, v) in &adds {
            store.add(r, Tags(1 << v));
        }
        for row in 0..SPAN {
            for col in 0..SPAN {
                let expected = adds
                    .iter()
                    .filter(|(r, _)| r.contains(row, col))
                    .fold(0u8, |acc, (_, v)| acc | (1 << v));
                let found = store.get_data_at(row, col);
                if expected == 0 {
                    prop_assert!(found.is_empty());
                } else {
                    let want = Tags(expected);
                    prop_assert_eq!(found, vec![&want]);
                }
            }
        }
    }

    #[test]
    fn matrix_insert_then_remove_is_identity(
        cells in prop::collection::vec((0..SPAN, 0..SPAN, any::<u16>()), 0..40),
        index in 0..SPAN,
        count in 1..6u32,
        rows in any::<bool>(),
    ) {
        let mut store = SparseMatrixStore::new(0u16);
        for &(r, c, v) in &cells {
            store.set(r, c, v);
        }
        let before: Vec<_> = store.iter().map(|(p, v)| (p, *v)).collect();
        if rows {
            store.insert_row_at(index, count);
            store.remove_row_at(index, count);
        } else {
            store.insert_col_at(index, count);
            store.remove_col_at(index, count);
        }
        let after: Vec<_> = store.iter().map(|(p, v)| (p, *v)).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn region_insert_then_remove_is_identity(
        adds in prop::collection::vec((region(), 0..4u8), 0..12),
        index in 0..SPAN,
        count in 1..6u32,
        rows in any::<bool>(),
        expand in any::<bool>(),
    ) {
        let mut store = RegionDataStore::<u8>::new();
        for &(r, v) in &adds {
            store.add(r, v);
        }
        let snapshot = |s: &RegionDataStore<u8>| {
            let mut all: Vec<_> = s.iter().map(|dr| (*dr.region(), *dr.data())).collect();
            all.sort();
            all
        };
        let before = snapshot(&store);
        let end = index + count - 1;
        if rows {
            store.insert_rows(index, count, Some(expand));
            store.remove_rows(index, end);
        } else {
            store.insert_cols(index, count, Some(expand));
            store.remove_cols(index, end);
        }
        prop_assert_eq!(snapshot(&store), before);
    }
}
