#![forbid(unsafe_code)]

//! Canonical pointer events.
//!
//! The rendering substrate delivers presses, moves, and releases already
//! mapped into the scene frame. A drag is bound to the [`PointerId`] that
//! started it so that a second touch cannot steal it.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Identifier of one pointer (mouse, pen, or a single touch contact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub u32);

impl PointerId {
    /// The primary mouse pointer.
    pub const MOUSE: Self = Self(0);
}

impl Default for PointerId {
    fn default() -> Self {
        Self::MOUSE
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    /// Pointer pressed.
    Down,
    /// Pointer moved (pressed or not).
    Move,
    /// Pointer released.
    Up,
    /// The substrate lost the pointer (focus loss, capture lost).
    Cancel,
}

/// A pointer event in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub pointer: PointerId,
    pub point: Point,
}

impl PointerEvent {
    /// Create a new pointer event for the primary mouse pointer.
    #[must_use]
    pub const fn new(kind: PointerEventKind, point: Point) -> Self {
        Self {
            kind,
            pointer: PointerId::MOUSE,
            point,
        }
    }

    #[must_use]
    pub const fn down(point: Point) -> Self {
        Self::new(PointerEventKind::Down, point)
    }

    #[must_use]
    pub const fn moved(point: Point) -> Self {
        Self::new(PointerEventKind::Move, point)
    }

    #[must_use]
    pub const fn up(point: Point) -> Self {
        Self::new(PointerEventKind::Up, point)
    }

    /// Attach an explicit pointer identifier.
    #[must_use]
    pub const fn with_pointer(mut self, pointer: PointerId) -> Self {
        self.pointer = pointer;
        self
    }

    /// Whether this event ends any gesture bound to its pointer.
    #[inline]
    #[must_use]
    pub const fn is_release(&self) -> bool {
        matches!(self.kind, PointerEventKind::Up | PointerEventKind::Cancel)
    }
}
