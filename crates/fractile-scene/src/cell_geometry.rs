#![forbid(unsafe_code)]

//! Per-container subdivision into cell slots.
//!
//! A [`CellLayout`] turns a cell count into slot shapes, midpoints, and
//! divider lines in the container's local frame (origin at the top-left of
//! the footprint's bounding box, `y` down). [`CellGeometry`] caches the
//! result for the current count.
//!
//! # Invariants
//!
//! 1. `slots(n).len() == n` and slot `i` has `index == i`.
//! 2. Every midpoint lies strictly inside the footprint.
//! 3. Layouts are pure: the same count always yields the same geometry.
//! 4. A rebuild discards every slot and divider; nothing is diffed.
//!
//! # Failure Modes
//!
//! `midpoint_of(index)` with `index >= count` returns
//! [`GeometryError::IndexOutOfRange`].

use std::f64::consts::TAU;
use std::fmt;
use std::rc::Rc;

use fractile_core::geometry::{Point, Rect, Segment, Size, Vector};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Outline of one slot in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotShape {
    /// Horizontal band of a rectangular container.
    Band(Rect),
    /// Angular wedge of a circular container, angles in radians measured
    /// clockwise (screen `y` down) from the positive `x` axis.
    Wedge {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

impl SlotShape {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match *self {
            Self::Band(rect) => rect.contains(p),
            Self::Wedge {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let offset = p - center;
                if offset.length() > radius {
                    return false;
                }
                if end_angle - start_angle >= TAU {
                    return true;
                }
                let angle = offset.angle().rem_euclid(TAU);
                angle >= start_angle && angle < end_angle
            }
        }
    }
}

/// One slot: its shape and the point a piece snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSlot {
    pub index: usize,
    pub shape: SlotShape,
    pub midpoint: Point,
}

// ---------------------------------------------------------------------------
// CellLayout strategy
// ---------------------------------------------------------------------------

/// How a container divides its footprint.
pub trait CellLayout: fmt::Debug {
    /// Short name for diagnostics ("rectangular", "circular").
    fn name(&self) -> &'static str;

    /// Bounding size of the container in its local frame.
    fn footprint(&self) -> Size;

    /// Slots for `count` cells, in index order.
    fn slots(&self, count: usize) -> Vec<CellSlot>;

    /// Divider strokes between adjacent slots.
    fn dividers(&self, count: usize) -> Vec<Segment>;

    /// Whether `local` is inside the container outline.
    fn contains(&self, local: Point) -> bool;
}

/// Vertical stack of equal bands, index 0 at the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangularLayout {
    size: Size,
}

impl RectangularLayout {
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self { size }
    }
}

impl CellLayout for RectangularLayout {
    fn name(&self) -> &'static str {
        "rectangular"
    }

    fn footprint(&self) -> Size {
        self.size
    }

    fn slots(&self, count: usize) -> Vec<CellSlot> {
        if count == 0 {
            return Vec::new();
        }
        let n = count as f64;
        let band_height = self.size.height / n;
        (0..count)
            .map(|index| {
                let sorted_index = (count - 1 - index) as f64;
                let band = Rect::new(
                    0.0,
                    self.size.height * sorted_index / n,
                    self.size.width,
                    band_height,
                );
                CellSlot {
                    index,
                    shape: SlotShape::Band(band),
                    midpoint: band.center(),
                }
            })
            .collect()
    }

    fn dividers(&self, count: usize) -> Vec<Segment> {
        let band_height = self.size.height / count.max(1) as f64;
        (1..count)
            .map(|j| {
                let y = j as f64 * band_height;
                Segment::new(Point::new(0.0, y), Point::new(self.size.width, y))
            })
            .collect()
    }

    fn contains(&self, local: Point) -> bool {
        Rect::from_size(self.size).contains(local)
    }
}

/// Equal wedges around the centre, index 0 starting at angle 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularLayout {
    radius: f64,
}

impl CircularLayout {
    #[must_use]
    pub const fn new(radius: f64) -> Self {
        Self { radius }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.radius, self.radius)
    }

    /// Distance from the centre to the centroid of a wedge spanning `sweep`.
    fn centroid_distance(&self, sweep: f64) -> f64 {
        if sweep >= TAU {
            0.0
        } else {
            4.0 * self.radius * (sweep / 2.0).sin() / (3.0 * sweep)
        }
    }
}

impl CellLayout for CircularLayout {
    fn name(&self) -> &'static str {
        "circular"
    }

    fn footprint(&self) -> Size {
        Size::square(2.0 * self.radius)
    }

    fn slots(&self, count: usize) -> Vec<CellSlot> {
        if count == 0 {
            return Vec::new();
        }
        let sweep = TAU / count as f64;
        let center = self.center();
        let reach = self.centroid_distance(sweep);
        (0..count)
            .map(|index| {
                let start_angle = index as f64 * sweep;
                let end_angle = (index + 1) as f64 * sweep;
                let bisector = Vector::from_angle(start_angle + sweep / 2.0);
                CellSlot {
                    index,
                    shape: SlotShape::Wedge {
                        center,
                        radius: self.radius,
                        start_angle,
                        end_angle,
                    },
                    midpoint: center + bisector * reach,
                }
            })
            .collect()
    }

    fn dividers(&self, count: usize) -> Vec<Segment> {
        if count < 2 {
            return Vec::new();
        }
        let sweep = TAU / count as f64;
        let center = self.center();
        (0..count)
            .map(|i| {
                let spoke = Vector::from_angle(i as f64 * sweep) * self.radius;
                Segment::new(center, center + spoke)
            })
            .collect()
    }

    fn contains(&self, local: Point) -> bool {
        local.distance(self.center()) <= self.radius
    }
}

// ---------------------------------------------------------------------------
// CellGeometry
// ---------------------------------------------------------------------------

/// Slot geometry for a container's current cell count.
#[derive(Debug, Clone)]
pub struct CellGeometry {
    layout: Rc<dyn CellLayout>,
    slots: Vec<CellSlot>,
    dividers: Vec<Segment>,
}

impl CellGeometry {
    #[must_use]
    pub fn new(layout: Rc<dyn CellLayout>, count: usize) -> Self {
        let mut geometry = Self {
            layout,
            slots: Vec::new(),
            dividers: Vec::new(),
        };
        geometry.rebuild(count);
        geometry
    }

    /// Discard everything and lay out `count` slots from scratch.
    pub fn rebuild(&mut self, count: usize) {
        self.slots = self.layout.slots(count);
        self.dividers = self.layout.dividers(count);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn layout(&self) -> &Rc<dyn CellLayout> {
        &self.layout
    }

    #[must_use]
    pub fn footprint(&self) -> Size {
        self.layout.footprint()
    }

    #[must_use]
    pub fn slots(&self) -> &[CellSlot] {
        &self.slots
    }

    #[must_use]
    pub fn dividers(&self) -> &[Segment] {
        &self.dividers
    }

    /// Local midpoint of slot `index`.
    pub fn midpoint_of(&self, index: usize) -> Result<Point, GeometryError> {
        self.slots
            .get(index)
            .map(|slot| slot.midpoint)
            .ok_or(GeometryError::IndexOutOfRange {
                index,
                count: self.slots.len(),
            })
    }

    /// Index of the slot under `local`, if any.
    #[must_use]
    pub fn hit_test(&self, local: Point) -> Option<usize> {
        if !self.layout.contains(local) {
            return None;
        }
        self.slots
            .iter()
            .find(|slot| slot.shape.contains(local))
            .map(|slot| slot.index)
    }
}
