#![forbid(unsafe_code)]

//! One fractional slot of a container.
//!
//! # Invariants
//!
//! 1. `index` is in `[0, container.cell_count())` for the generation the cell
//!    was created in.
//! 2. Cell equality is identity: two distinct cells are never equal, even
//!    with the same container, index, and generation.
//! 3. A cell from an older generation is stale. It is never reused and never
//!    becomes live again.

use std::fmt;
use std::rc::Rc;

use fractile_core::reactive::Observable;
use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::ids::ContainerId;

/// Shared handle to a [`Cell`].
pub type CellRef = Rc<Cell>;

/// Value identifying a cell slot across snapshots and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub container: ContainerId,
    pub generation: u64,
    pub index: usize,
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/gen{}/cell{}",
            self.container, self.generation, self.index
        )
    }
}

/// A cell and its two occupancy flags.
pub struct Cell {
    container: ContainerId,
    index: usize,
    generation: u64,
    is_filled: Observable<bool>,
    appears_filled: Observable<bool>,
}

impl Cell {
    pub(crate) fn new(container: ContainerId, index: usize, generation: u64) -> Self {
        Self {
            container,
            index,
            generation,
            is_filled: Observable::new(false),
            appears_filled: Observable::new(false),
        }
    }

    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Rebuild generation of the owning container when this cell was made.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn key(&self) -> CellKey {
        CellKey {
            container: self.container,
            generation: self.generation,
            index: self.index,
        }
    }

    /// Logical occupancy: a piece lives here or is on its way.
    #[must_use]
    pub fn is_filled(&self) -> &Observable<bool> {
        &self.is_filled
    }

    /// Rendered occupancy.
    #[must_use]
    pub fn appears_filled(&self) -> &Observable<bool> {
        &self.appears_filled
    }

    /// Whether `container` has discarded this cell (or never owned it).
    #[must_use]
    pub fn is_stale(&self, container: &Container) -> bool {
        !container.owns(self)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Cell {}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("key", &self.key())
            .field("is_filled", &self.is_filled.get())
            .field("appears_filled", &self.appears_filled.get())
            .finish()
    }
}
