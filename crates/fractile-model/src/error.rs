#![forbid(unsafe_code)]

use std::fmt;

use crate::cell::CellKey;
use crate::ids::ContainerId;

/// Errors returned by model operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// `grab_cell` on a cell that does not render as filled.
    CellNotFilled { cell: CellKey },
    /// The cell belongs to a discarded generation or a removed container.
    StaleCell { cell: CellKey },
    DenominatorOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
    ContainerCountOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },
    UnknownContainer(ContainerId),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellNotFilled { cell } => write!(f, "cell {cell} is not filled"),
            Self::StaleCell { cell } => write!(f, "cell {cell} no longer exists"),
            Self::DenominatorOutOfRange {
                requested,
                min,
                max,
            } => write!(f, "denominator must be in {min}..={max} (got {requested})"),
            Self::ContainerCountOutOfRange {
                requested,
                min,
                max,
            } => write!(
                f,
                "container count must be in {min}..={max} (got {requested})"
            ),
            Self::UnknownContainer(id) => write!(f, "unknown container {id}"),
        }
    }
}

impl std::error::Error for ModelError {}
