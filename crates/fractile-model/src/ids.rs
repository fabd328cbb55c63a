#![forbid(unsafe_code)]

//! Stable entity identifiers.
//!
//! IDs are assigned monotonically from 1 by an [`IdAllocator`], so ordering
//! by ID is creation order. `0` is never handed out.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a [`Container`](crate::Container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Wrap a raw value. Intended for tests and external models that manage
    /// their own numbering.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// Identifier of a [`Piece`](crate::Piece).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(u64);

impl PieceId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece#{}", self.0)
    }
}

/// Monotonic ID source shared by one model.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: std::cell::Cell<u64>,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_raw(&self) -> u64 {
        let next = self.last.get().saturating_add(1);
        self.last.set(next);
        next
    }

    pub fn next_container(&self) -> ContainerId {
        ContainerId(self.next_raw())
    }

    pub fn next_piece(&self) -> PieceId {
        PieceId(self.next_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_nonzero() {
        let ids = IdAllocator::new();
        let a = ids.next_container();
        let b = ids.next_piece();
        let c = ids.next_container();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert!(a < c);
    }

    #[test]
    fn display_names_the_kind() {
        assert_eq!(ContainerId::from_raw(3).to_string(), "container#3");
        assert_eq!(PieceId::from_raw(9).to_string(), "piece#9");
    }
}
