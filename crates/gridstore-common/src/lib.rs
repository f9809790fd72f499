//! Geometry shared by the gridstore stores.
//!
//! Everything here is a small `Copy` value type. Indices are zero-based `u32`;
//! an interval whose end is [`Interval::UNBOUNDED`] stands for "to the end of the
//! sheet", which is how whole rows and whole columns are expressed.

pub mod axis;
pub mod error;
pub mod interval;
pub mod position;
pub mod region;

pub use axis::*;
pub use error::*;
pub use interval::*;
pub use position::*;
pub use region::*;
