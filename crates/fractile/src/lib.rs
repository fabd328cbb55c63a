#![forbid(unsafe_code)]

//! Fractile public facade crate.
//!
//! Re-exports the types most integrations need from the internal crates and
//! offers a [`Workbench`] that wires a [`FractionModel`] to a
//! [`SceneCoordinator`] in one call.

use std::fmt;
use std::rc::Rc;

// --- Core re-exports -------------------------------------------------------

pub use fractile_core::animation::dt_from_secs;
pub use fractile_core::event::{PointerEvent, PointerEventKind, PointerId};
pub use fractile_core::geometry::{Affine, Point, Rect, Size, Vector};

// --- Model re-exports ------------------------------------------------------

pub use fractile_model::{
    CellKey, CellModel, CellRef, ContainerId, ContainerRef, FractionModel, ModelError, PieceId,
    PieceRef,
};

// --- Scene re-exports ------------------------------------------------------

pub use fractile_scene::{
    CellLayout, CircularLayout, ConfigError, DropTarget, PieceView, RectangularLayout,
    SceneConfig, SceneCoordinator, SceneError, SceneSnapshot,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Fractile integrations.
#[derive(Debug)]
pub enum Error {
    Model(ModelError),
    Scene(SceneError),
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(err) => write!(f, "{err}"),
            Self::Scene(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Scene(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

impl From<SceneError> for Error {
    fn from(err: SceneError) -> Self {
        Self::Scene(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for Fractile APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Workbench ------------------------------------------------------------

/// Container shape for a [`Workbench`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    #[default]
    Rectangular,
    Circular,
}

/// An in-memory model and the scene presenting it.
pub struct Workbench {
    model: Rc<FractionModel>,
    scene: SceneCoordinator,
}

impl Workbench {
    /// Model with `containers` containers of `denominator` cells, presented
    /// with `shape` under `config`. Pieces are drawn by `create_view`.
    pub fn new(
        containers: usize,
        denominator: usize,
        shape: Shape,
        config: SceneConfig,
        create_view: impl Fn(&PieceRef) -> Box<dyn PieceView> + 'static,
    ) -> Result<Self> {
        let model = Rc::new(FractionModel::new(containers, denominator)?);
        let builder = SceneCoordinator::builder(Rc::clone(&model)).config(config);
        let builder = match shape {
            Shape::Rectangular => builder.rectangular(),
            Shape::Circular => builder.circular(),
        };
        let scene = builder.piece_factory(create_view).build()?;
        Ok(Self { model, scene })
    }

    #[must_use]
    pub fn model(&self) -> &Rc<FractionModel> {
        &self.model
    }

    #[must_use]
    pub fn scene(&self) -> &SceneCoordinator {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneCoordinator {
        &mut self.scene
    }
}

impl fmt::Debug for Workbench {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbench")
            .field("denominator", &self.model.denominator().get())
            .field("scene", &self.scene)
            .finish()
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CellModel, DropTarget, Error, FractionModel, PieceView, Point, PointerEvent, Result,
        SceneConfig, SceneCoordinator, Shape, Workbench,
    };

    pub use crate::{core, model, scene};
}

pub use fractile_core as core;
pub use fractile_model as model;
pub use fractile_scene as scene;
