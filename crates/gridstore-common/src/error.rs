use thiserror::Error;

/// Errors returned when building geometry from unchecked (signed) inputs.
///
/// The stores themselves never fail on geometry: every `u32` index is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("row {0} is negative")]
    NegativeRow(i64),
    #[error("col {0} is negative")]
    NegativeCol(i64),
    #[error("index {0} is negative")]
    NegativeIndex(i64),
    #[error("index {0} exceeds {max}", max = u32::MAX)]
    IndexOverflow(i64),
}

pub(crate) fn checked_index(value: i64) -> Result<u32, GeometryError> {
    if value < 0 {
        return Err(GeometryError::NegativeIndex(value));
    }
    u32::try_from(value).map_err(|_| GeometryError::IndexOverflow(value))
}
