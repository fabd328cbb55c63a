#![forbid(unsafe_code)]

//! A whole unit divided into `denominator` cells.
//!
//! # Invariants
//!
//! 1. `cells().len() == cell_count().get()` outside of a rebuild.
//! 2. A denominator change discards every cell and bumps the generation
//!    before `cell_count` notifies, so subscribers always observe the new
//!    cells.
//! 3. Setting the current denominator again is a no-op: the cells survive
//!    and nobody is notified.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use fractile_core::reactive::Observable;
use tracing::debug;

use crate::cell::{Cell, CellRef};
use crate::ids::ContainerId;

/// Shared handle to a [`Container`].
pub type ContainerRef = Rc<Container>;

struct CellSet {
    generation: u64,
    cells: Vec<CellRef>,
}

impl CellSet {
    fn build(container: ContainerId, generation: u64, count: usize) -> Self {
        Self {
            generation,
            cells: (0..count)
                .map(|index| Rc::new(Cell::new(container, index, generation)))
                .collect(),
        }
    }
}

pub struct Container {
    id: ContainerId,
    cells: RefCell<CellSet>,
    cell_count: Observable<usize>,
    filled_count: Observable<usize>,
}

impl Container {
    /// Create a container with `denominator` empty cells.
    #[must_use]
    pub fn new(id: ContainerId, denominator: usize) -> Self {
        Self {
            id,
            cells: RefCell::new(CellSet::build(id, 0, denominator)),
            cell_count: Observable::new(denominator),
            filled_count: Observable::new(0),
        }
    }

    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// The current cells in index order.
    #[must_use]
    pub fn cells(&self) -> Vec<CellRef> {
        self.cells.borrow().cells.clone()
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<CellRef> {
        self.cells.borrow().cells.get(index).cloned()
    }

    /// Observable length of the cell sequence (the denominator).
    #[must_use]
    pub fn cell_count(&self) -> &Observable<usize> {
        &self.cell_count
    }

    /// Observable number of cells that render as filled.
    #[must_use]
    pub fn filled_count(&self) -> &Observable<usize> {
        &self.filled_count
    }

    /// Current rebuild generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.cells.borrow().generation
    }

    /// Whether `cell` is one of this container's current cells.
    #[must_use]
    pub fn owns(&self, cell: &Cell) -> bool {
        let set = self.cells.borrow();
        cell.container() == self.id
            && cell.generation() == set.generation
            && set
                .cells
                .get(cell.index())
                .is_some_and(|current| std::ptr::eq(current.as_ref(), cell))
    }

    /// Replace every cell with `denominator` fresh, empty ones.
    ///
    /// Returns `false` (and does nothing) when the denominator is unchanged.
    pub fn set_denominator(&self, denominator: usize) -> bool {
        if self.cell_count.get() == denominator {
            return false;
        }
        {
            let mut set = self.cells.borrow_mut();
            let generation = set.generation + 1;
            *set = CellSet::build(self.id, generation, denominator);
            debug!(container = %self.id, generation, denominator, "container cells rebuilt");
        }
        self.filled_count.set(0);
        self.cell_count.set(denominator);
        true
    }

    /// Recount cells that render as filled.
    pub fn refresh_filled_count(&self) {
        let filled = self
            .cells
            .borrow()
            .cells
            .iter()
            .filter(|cell| cell.appears_filled().get())
            .count();
        self.filled_count.set(filled);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("generation", &self.generation())
            .field("cell_count", &self.cell_count.get())
            .field("filled_count", &self.filled_count.get())
            .finish()
    }
}
