#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a structural edit.
///
/// `Row` means the edit moves things vertically (rows are inserted or removed),
/// `Col` means columns are inserted or removed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Col,
}

