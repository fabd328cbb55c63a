#![forbid(unsafe_code)]

//! Model: the containers, cells, and pieces a fraction scene presents.
//!
//! # Primary responsibilities
//! - **Container**: one whole, split into `denominator` cells. Rebuilding
//!   discards every cell; no cell survives a denominator change.
//! - **Cell**: one slot with observable `is_filled` (logical occupancy) and
//!   `appears_filled` (rendered occupancy, lags while a piece is in flight).
//! - **Piece**: one draggable unit with optional origin/destination cells.
//! - **CellModel**: the four operations the scene layer calls back into.
//!
//! [`FractionModel`] is a complete in-memory implementation of
//! [`CellModel`], used by the scene tests and usable as-is by integrators
//! that do not bring their own model.

pub mod cell;
pub mod container;
pub mod error;
pub mod ids;
pub mod model;
pub mod piece;

pub use cell::{Cell, CellKey, CellRef};
pub use container::{Container, ContainerRef};
pub use error::ModelError;
pub use ids::{ContainerId, IdAllocator, PieceId};
pub use model::{CellModel, FractionModel};
pub use piece::{Piece, PieceRef};

/// Fewest containers a scene shows.
pub const MIN_CONTAINERS: usize = 1;

/// Most containers a scene shows.
pub const MAX_CONTAINERS: usize = 6;

/// Smallest denominator.
pub const MIN_DENOMINATOR: usize = 1;

/// Largest denominator.
pub const MAX_DENOMINATOR: usize = 8;
