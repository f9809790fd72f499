//! In-memory storage for spreadsheet-like grids.
//!
//! Four stores cover the shapes grid data comes in:
//!
//! - [`SparseMatrixStore`]: one value per occupied cell.
//! - [`Range1DStore`]: values over runs of rows or columns, and
//!   [`CumulativeRange1DStore`] for sizes with offset queries.
//! - [`RegionDataStore`]: values attached to rectangles, with
//!   [`ConsolidatedDataStore`] and [`MergeRegionDataStore`] resolving overlaps.
//!
//! Every mutation returns restore-data that undoes it when passed back to the same
//! store's `restore`. Restore-data from consecutive calls can be merged into one
//! undo step.

pub mod config;
pub mod cumulative;
pub mod error;
pub mod matrix;
pub mod range1d;
pub mod region;
pub mod restore;
#[cfg(feature = "tracing")]
pub mod telemetry;

pub use config::{OverlapPolicy, RegionStoreConfig};
pub use cumulative::CumulativeRange1DStore;
pub use error::{StoreError, StoreResult};
pub use matrix::SparseMatrixStore;
pub use range1d::Range1DStore;
pub use region::{
    ConsolidateEqual, ConsolidatedDataStore, DataRegion, MergeOnOverlap, MergeRegionDataStore,
    Mergeable, NoDedup, OverlapStrategy, RegionDataStore, RegionId,
};
pub use restore::{MatrixRestoreData, Range1DRestoreData, RegionRestoreData};

pub use gridstore_common::{Axis, GeometryError, Interval, Position, Region};
