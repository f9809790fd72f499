use gridstore_common::GeometryError;
use thiserror::Error;

/// Errors surfaced at the few fallible store boundaries.
///
/// Reads and mutations never fail; only configuration values that would make the
/// cumulative arithmetic meaningless are rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("default size must be finite and non-negative, got {0}")]
    InvalidDefaultSize(f64),
    #[error("size for [{start}, {end}] must be finite and non-negative, got {size}")]
    InvalidSize { start: u32, end: u32, size: f64 },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub(crate) fn check_size(size: f64) -> bool {
    size.is_finite() && size >= 0.0
}
