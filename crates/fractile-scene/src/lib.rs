#![forbid(unsafe_code)]

//! Fractile Scene
//!
//! Places draggable pieces into the cells of fraction containers.
//!
//! # Key Components
//!
//! - [`SceneCoordinator`] - Owns presenters and controllers, resolves drags
//! - [`ContainerPresenter`] - Cell geometry and per-slot visibility for one container
//! - [`PieceController`] - Motion and drag state for one piece
//! - [`CellLayout`] - Shape strategy: [`RectangularLayout`], [`CircularLayout`]
//! - [`SceneConfig`] - Spacing, thresholds, bucket and motion tuning
//!
//! # Role in Fractile
//! `fractile-scene` is the interaction layer. It listens to a
//! [`fractile_model::CellModel`], keeps one presenter per container and one
//! controller per piece, and calls back into the model when a piece is
//! grabbed, dropped, or lands.
//!
//! # How it fits in the system
//! Rendering is left to the integrator: presenters expose slot geometry and
//! visibility, controllers push positions into a [`PieceView`]. Pointer
//! events come in through [`SceneCoordinator::handle_pointer`] and time
//! advances through [`SceneCoordinator::step`].

pub mod bucket;
pub mod cell_geometry;
pub mod config;
pub mod container_presenter;
pub mod coordinator;
pub mod error;
pub mod layout;
pub mod piece_controller;
pub mod snapshot;

pub use bucket::Bucket;
pub use cell_geometry::{
    CellGeometry, CellLayout, CellSlot, CircularLayout, RectangularLayout, SlotShape,
};
pub use config::{BucketConfig, ConfigError, MotionConfig, SceneConfig};
pub use container_presenter::{CellDownCallback, ContainerPresenter, RebuildHook};
pub use coordinator::{
    ContainerPresentationFactory, DropTarget, PiecePresentationFactory, SceneCoordinator,
    SceneCoordinatorBuilder,
};
pub use error::{GeometryError, SceneError};
pub use layout::FlowLayout;
pub use piece_controller::{DragState, PieceController, PieceView};
pub use snapshot::{ContainerSnapshot, PieceSnapshot, SceneSnapshot};
