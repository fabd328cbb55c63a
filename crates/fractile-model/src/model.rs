#![forbid(unsafe_code)]

//! The collaborator interface the scene calls back into, and an in-memory
//! implementation of it.
//!
//! # Invariants
//!
//! 1. `containers` holds between [`MIN_CONTAINERS`] and [`MAX_CONTAINERS`]
//!    entries and every container has the model's denominator.
//! 2. A cell is `is_filled` iff it renders as filled or a live piece has it
//!    as destination.
//! 3. After any rebuild or removal no piece refers to a discarded cell.
//!
//! # Failure Modes
//!
//! Out-of-range counts and operations on stale cells return [`ModelError`]
//! and leave the model untouched.

use std::rc::Rc;

use fractile_core::reactive::{Observable, ObservableList};
use tracing::{debug, warn};

use crate::cell::CellRef;
use crate::container::{Container, ContainerRef};
use crate::error::ModelError;
use crate::ids::{ContainerId, IdAllocator};
use crate::piece::{Piece, PieceRef};
use crate::{MAX_CONTAINERS, MAX_DENOMINATOR, MIN_CONTAINERS, MIN_DENOMINATOR};

/// Operations the scene layer needs from the application model.
pub trait CellModel {
    /// Containers in layout order.
    fn containers(&self) -> &ObservableList<ContainerRef>;

    /// Pieces currently in play.
    fn pieces(&self) -> &ObservableList<PieceRef>;

    /// The piece reached its destination; settle it.
    fn complete_piece(&self, piece: &PieceRef);

    /// Hand out a fresh piece from the bucket.
    fn grab_from_bucket(&self) -> PieceRef;

    /// Detach the piece occupying `cell`.
    fn grab_cell(&self, cell: &CellRef) -> Result<PieceRef, ModelError>;

    /// Record that `piece` is headed for `cell`.
    fn target_piece_to_cell(&self, piece: &PieceRef, cell: &CellRef);
}

// ---------------------------------------------------------------------------
// FractionModel
// ---------------------------------------------------------------------------

/// Reference in-memory model: N containers sharing one denominator.
#[derive(Debug)]
pub struct FractionModel {
    ids: IdAllocator,
    denominator: Observable<usize>,
    containers: ObservableList<ContainerRef>,
    pieces: ObservableList<PieceRef>,
}

fn check_denominator(n: usize) -> Result<(), ModelError> {
    if (MIN_DENOMINATOR..=MAX_DENOMINATOR).contains(&n) {
        Ok(())
    } else {
        Err(ModelError::DenominatorOutOfRange {
            requested: n,
            min: MIN_DENOMINATOR,
            max: MAX_DENOMINATOR,
        })
    }
}

fn check_container_count(n: usize) -> Result<(), ModelError> {
    if (MIN_CONTAINERS..=MAX_CONTAINERS).contains(&n) {
        Ok(())
    } else {
        Err(ModelError::ContainerCountOutOfRange {
            requested: n,
            min: MIN_CONTAINERS,
            max: MAX_CONTAINERS,
        })
    }
}

impl FractionModel {
    /// Create `container_count` empty containers split into `denominator`.
    pub fn new(container_count: usize, denominator: usize) -> Result<Self, ModelError> {
        check_container_count(container_count)?;
        check_denominator(denominator)?;
        let model = Self {
            ids: IdAllocator::new(),
            denominator: Observable::new(denominator),
            containers: ObservableList::new(),
            pieces: ObservableList::new(),
        };
        for _ in 0..container_count {
            model.push_container();
        }
        Ok(model)
    }

    #[must_use]
    pub fn denominator(&self) -> &Observable<usize> {
        &self.denominator
    }

    #[must_use]
    pub fn container(&self, id: ContainerId) -> Option<ContainerRef> {
        self.containers.find(|c| c.id() == id)
    }

    /// The container currently owning `cell`, if the cell is live.
    #[must_use]
    pub fn container_of(&self, cell: &CellRef) -> Option<ContainerRef> {
        self.container(cell.container())
            .filter(|container| container.owns(cell))
    }

    /// Whether `cell` belongs to a current container generation.
    #[must_use]
    pub fn is_live(&self, cell: &CellRef) -> bool {
        self.container_of(cell).is_some()
    }

    /// Re-split every container. Fresh cells start empty.
    pub fn set_denominator(&self, denominator: usize) -> Result<(), ModelError> {
        check_denominator(denominator)?;
        if self.denominator.get() == denominator {
            return Ok(());
        }
        debug!(denominator, "model denominator changed");
        self.denominator.set(denominator);
        for container in self.containers.snapshot() {
            container.set_denominator(denominator);
        }
        self.clear_stale_piece_refs();
        Ok(())
    }

    /// Append a container. Fails at [`MAX_CONTAINERS`].
    pub fn add_container(&self) -> Result<ContainerRef, ModelError> {
        check_container_count(self.containers.len() + 1)?;
        Ok(self.push_container())
    }

    /// Remove the container `id`. Fails below [`MIN_CONTAINERS`].
    pub fn remove_container(&self, id: ContainerId) -> Result<ContainerRef, ModelError> {
        if self.container(id).is_none() {
            return Err(ModelError::UnknownContainer(id));
        }
        check_container_count(self.containers.len().saturating_sub(1))?;
        let removed = self
            .containers
            .remove_by(|c| c.id() == id)
            .ok_or(ModelError::UnknownContainer(id))?;
        debug!(container = %id, "container removed");
        self.clear_stale_piece_refs();
        Ok(removed)
    }

    /// Grow or shrink from the end until there are `count` containers.
    pub fn set_container_count(&self, count: usize) -> Result<(), ModelError> {
        check_container_count(count)?;
        while self.containers.len() < count {
            self.push_container();
        }
        while self.containers.len() > count {
            let Some(last) = self.containers.snapshot().last().map(|c| c.id()) else {
                break;
            };
            self.remove_container(last)?;
        }
        Ok(())
    }

    /// Place a settled piece directly into `cell`.
    pub fn fill_cell(&self, cell: &CellRef) -> Result<(), ModelError> {
        let container = self
            .container_of(cell)
            .ok_or(ModelError::StaleCell { cell: cell.key() })?;
        cell.is_filled().set(true);
        cell.appears_filled().set(true);
        container.refresh_filled_count();
        Ok(())
    }

    /// Filled cells across all containers.
    #[must_use]
    pub fn filled_total(&self) -> usize {
        self.containers
            .snapshot()
            .iter()
            .map(|c| c.filled_count().get())
            .sum()
    }

    fn push_container(&self) -> ContainerRef {
        let container = Rc::new(Container::new(
            self.ids.next_container(),
            self.denominator.get(),
        ));
        debug!(container = %container.id(), "container added");
        self.containers.push(Rc::clone(&container));
        container
    }

    fn clear_stale_piece_refs(&self) {
        for piece in self.pieces.snapshot() {
            for slot in [piece.origin_cell(), piece.destination_cell()] {
                let stale = slot.with(|cell| cell.as_ref().is_some_and(|c| !self.is_live(c)));
                if stale {
                    debug!(piece = %piece.id(), "cleared reference to discarded cell");
                    slot.set(None);
                }
            }
        }
    }
}

impl CellModel for FractionModel {
    fn containers(&self) -> &ObservableList<ContainerRef> {
        &self.containers
    }

    fn pieces(&self) -> &ObservableList<PieceRef> {
        &self.pieces
    }

    fn complete_piece(&self, piece: &PieceRef) {
        let removed = self.pieces.remove_by(|p| Rc::ptr_eq(p, piece));
        if removed.is_none() {
            warn!(piece = %piece.id(), "complete_piece on a piece not in play");
            return;
        }
        let destination = piece.destination_cell().get();
        match destination.and_then(|cell| self.container_of(&cell).map(|c| (cell, c))) {
            Some((cell, container)) => {
                cell.appears_filled().set(true);
                container.refresh_filled_count();
                debug!(piece = %piece.id(), cell = %cell.key(), "piece settled in cell");
            }
            None => debug!(piece = %piece.id(), "piece returned to bucket"),
        }
    }

    fn grab_from_bucket(&self) -> PieceRef {
        let piece = Rc::new(Piece::new(self.ids.next_piece(), None));
        debug!(piece = %piece.id(), "piece taken from bucket");
        self.pieces.push(Rc::clone(&piece));
        piece
    }

    fn grab_cell(&self, cell: &CellRef) -> Result<PieceRef, ModelError> {
        let container = self
            .container_of(cell)
            .ok_or(ModelError::StaleCell { cell: cell.key() })?;
        if !cell.appears_filled().get() {
            return Err(ModelError::CellNotFilled { cell: cell.key() });
        }
        cell.appears_filled().set(false);
        cell.is_filled().set(false);
        container.refresh_filled_count();

        let piece = Rc::new(Piece::new(self.ids.next_piece(), Some(Rc::clone(cell))));
        debug!(piece = %piece.id(), cell = %cell.key(), "piece taken from cell");
        self.pieces.push(Rc::clone(&piece));
        Ok(piece)
    }

    fn target_piece_to_cell(&self, piece: &PieceRef, cell: &CellRef) {
        if let Some(previous) = piece.destination_cell().get()
            && previous != *cell
            && !previous.appears_filled().get()
        {
            previous.is_filled().set(false);
        }
        piece.destination_cell().set(Some(Rc::clone(cell)));
        cell.is_filled().set(true);
        debug!(piece = %piece.id(), cell = %cell.key(), "piece targeted");
    }
}
