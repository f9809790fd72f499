use core::fmt;

/// How a region store resolves a new region that overlaps existing ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OverlapPolicy {
    /// Overlaps are kept as-is.
    NoDedup,
    /// Regions carrying equal data are split/merged so they never overlap.
    ConsolidateEqual,
    /// Overlapping regions are resolved into a region carrying the merged data.
    MergeOnOverlap,
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoDedup => "no-dedup",
            Self::ConsolidateEqual => "consolidate-equal",
            Self::MergeOnOverlap => "merge-on-overlap",
        })
    }
}

/// Per-store settings for [`RegionDataStore`](crate::region::RegionDataStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStoreConfig {
    /// When removing rows/cols, a region whose surviving area is at most this many
    /// cells is dropped instead of being contracted.
    pub min_area: u128,
    /// Whether inserting at `index` also grows regions whose trailing edge is `index - 1`.
    /// Individual insert calls may override it.
    pub expand_when_inserting_after: bool,
}

impl Default for RegionStoreConfig {
    fn default() -> Self {
        Self {
            min_area: 0,
            expand_when_inserting_after: true,
        }
    }
}

impl RegionStoreConfig {
    pub fn with_min_area(mut self, min_area: u128) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_expand_when_inserting_after(mut self, expand: bool) -> Self {
        self.expand_when_inserting_after = expand;
        self
    }
}
