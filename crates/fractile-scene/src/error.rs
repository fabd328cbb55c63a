#![forbid(unsafe_code)]

use std::fmt;

use fractile_model::{CellKey, ContainerId, ModelError, PieceId};

/// Errors from cell geometry queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// `index` is not below the current slot count.
    IndexOutOfRange { index: usize, count: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, count } => {
                write!(f, "cell index {index} out of range (count {count})")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Errors from the scene coordinator.
///
/// `MissingPresenter` and `MissingController` mean the presenter/controller
/// pairing with the model drifted: an event was lost or arrived out of
/// order. They are logged at error level where they are raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    MissingPresenter { container: ContainerId },
    MissingController { piece: PieceId },
    /// `build()` without a container presentation factory.
    MissingContainerFactory,
    /// `build()` with a config that fails validation.
    InvalidConfig { errors: Vec<String> },
    /// The cell was discarded by a rebuild.
    StaleCell { cell: CellKey },
    Geometry(GeometryError),
    Model(ModelError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPresenter { container } => {
                write!(f, "no live presenter for {container}")
            }
            Self::MissingController { piece } => write!(f, "no live controller for {piece}"),
            Self::MissingContainerFactory => {
                write!(f, "a container presentation factory is required")
            }
            Self::InvalidConfig { errors } => {
                write!(f, "invalid scene config: {}", errors.join("; "))
            }
            Self::StaleCell { cell } => write!(f, "cell {cell} was discarded by a rebuild"),
            Self::Geometry(e) => write!(f, "geometry error: {e}"),
            Self::Model(e) => write!(f, "model error: {e}"),
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GeometryError> for SceneError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

impl From<ModelError> for SceneError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}
