#![forbid(unsafe_code)]

//! One draggable unit.
//!
//! A piece with no destination cell is in the bucket (or headed there).

use std::fmt;
use std::rc::Rc;

use fractile_core::reactive::Observable;

use crate::cell::CellRef;
use crate::ids::PieceId;

/// Shared handle to a [`Piece`].
pub type PieceRef = Rc<Piece>;

pub struct Piece {
    id: PieceId,
    origin_cell: Observable<Option<CellRef>>,
    destination_cell: Observable<Option<CellRef>>,
    user_controlled: Observable<bool>,
}

impl Piece {
    #[must_use]
    pub fn new(id: PieceId, origin: Option<CellRef>) -> Self {
        Self {
            id,
            origin_cell: Observable::new(origin),
            destination_cell: Observable::new(None),
            user_controlled: Observable::new(false),
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    /// Cell the piece left, `None` for the bucket.
    #[must_use]
    pub fn origin_cell(&self) -> &Observable<Option<CellRef>> {
        &self.origin_cell
    }

    /// Cell the piece is headed for, `None` for the bucket.
    #[must_use]
    pub fn destination_cell(&self) -> &Observable<Option<CellRef>> {
        &self.destination_cell
    }

    /// Mirrors the drag state of the piece's controller.
    #[must_use]
    pub fn user_controlled(&self) -> &Observable<bool> {
        &self.user_controlled
    }

    #[must_use]
    pub fn is_in_bucket(&self) -> bool {
        self.destination_cell.with(Option::is_none)
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = |cell: &Option<CellRef>| cell.as_ref().map(|c| c.key());
        f.debug_struct("Piece")
            .field("id", &self.id)
            .field("origin", &self.origin_cell.with(key))
            .field("destination", &self.destination_cell.with(key))
            .field("user_controlled", &self.user_controlled.get())
            .finish()
    }
}
