#![forbid(unsafe_code)]

//! Per-piece presentation state and motion.
//!
//! A controller moves its piece from `origin` to `destination` (both in the
//! overlay frame) on a critically damped [`SpringPoint`]. While the pointer
//! owns the piece the spring is bypassed and the piece follows the pointer.
//!
//! # Drag state machine
//!
//! ```text
//!            begin_drag            release
//!   Idle ───────────────▶ UserControlled ───────▶ Idle
//! ```
//!
//! Arrival is reported once per launch, and never while user-controlled.

use std::fmt;
use std::time::Duration;

use fractile_core::animation::{Animation, SpringPoint};
use fractile_core::event::PointerId;
use fractile_core::geometry::{Point, Vector};
use fractile_model::{CellKey, PieceId, PieceRef};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::MotionConfig;

/// Visual counterpart of a piece supplied by the integrator.
pub trait PieceView {
    /// The piece moved; `midpoint` is in the overlay frame.
    fn set_midpoint(&mut self, midpoint: Point);

    /// The pointer took or released the piece.
    fn set_user_controlled(&mut self, _active: bool) {}

    /// A candidate cell is near while dragging; tilt toward it.
    fn orient(&mut self, _toward: Point, _dt: Duration) {}

    /// The controller is going away.
    fn dispose(&mut self) {}
}

/// Whether a pointer currently owns the piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    Idle,
    UserControlled {
        pointer: PointerId,
        /// Piece midpoint minus pointer position at grab time.
        grab_offset: Vector,
    },
}

pub struct PieceController {
    piece: PieceRef,
    origin: Point,
    destination: Point,
    origin_cell: Option<CellKey>,
    destination_cell: Option<CellKey>,
    motion: SpringPoint,
    drag: DragState,
    arrived: bool,
    hint: Option<Point>,
    view: Box<dyn PieceView>,
}

impl PieceController {
    /// Start a controller at `origin` heading for `destination`.
    #[must_use]
    pub fn new(
        piece: PieceRef,
        origin: Point,
        destination: Point,
        motion: &MotionConfig,
        mut view: Box<dyn PieceView>,
    ) -> Self {
        let mut spring = SpringPoint::new(origin, motion.stiffness, motion.damping);
        spring.launch(origin, destination);
        view.set_midpoint(origin);
        Self {
            piece,
            origin,
            destination,
            origin_cell: None,
            destination_cell: None,
            motion: spring,
            drag: DragState::Idle,
            arrived: false,
            hint: None,
            view,
        }
    }

    /// Record which cells the endpoints were resolved from.
    #[must_use]
    pub fn with_cells(mut self, origin: Option<CellKey>, destination: Option<CellKey>) -> Self {
        self.origin_cell = origin;
        self.destination_cell = destination;
        self
    }

    #[must_use]
    pub fn piece(&self) -> &PieceRef {
        &self.piece
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> PieceId {
        self.piece.id()
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[inline]
    #[must_use]
    pub fn destination(&self) -> Point {
        self.destination
    }

    #[must_use]
    pub fn origin_cell(&self) -> Option<CellKey> {
        self.origin_cell
    }

    #[must_use]
    pub fn destination_cell(&self) -> Option<CellKey> {
        self.destination_cell
    }

    /// Current position in the overlay frame.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        self.motion.position()
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    #[must_use]
    pub fn is_user_controlled(&self) -> bool {
        matches!(self.drag, DragState::UserControlled { .. })
    }

    /// Most recent orientation hint.
    #[must_use]
    pub fn hint(&self) -> Option<Point> {
        self.hint
    }

    /// Whether the piece has settled on its destination.
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Restart the trip from `origin`.
    pub fn set_origin(&mut self, origin: Point, cell: Option<CellKey>) {
        self.origin = origin;
        self.origin_cell = cell;
        self.arrived = false;
        self.motion.launch(origin, self.destination);
        self.view.set_midpoint(origin);
    }

    /// Head for a new destination without losing momentum.
    pub fn set_destination(&mut self, destination: Point, cell: Option<CellKey>) {
        self.destination = destination;
        self.destination_cell = cell;
        self.arrived = false;
        if !self.is_user_controlled() {
            self.motion.set_target(destination);
        }
    }

    /// Forget the origin cell (it was discarded); the origin point stays.
    pub fn forget_origin_cell(&mut self) {
        self.origin_cell = None;
    }

    /// Hand the piece to `pointer` pressed at `pointer_point`.
    pub fn begin_drag(&mut self, pointer: PointerId, pointer_point: Point) {
        let at = self.motion.position();
        self.drag = DragState::UserControlled {
            pointer,
            grab_offset: at - pointer_point,
        };
        self.motion.snap_to(at);
        self.arrived = false;
        self.hint = None;
        self.piece.user_controlled().set(true);
        self.view.set_user_controlled(true);
    }

    /// Follow the pointer. No-op unless user-controlled.
    pub fn drag_to(&mut self, pointer_point: Point) {
        if let DragState::UserControlled { grab_offset, .. } = self.drag {
            let at = pointer_point + grab_offset;
            self.motion.snap_to(at);
            self.view.set_midpoint(at);
        }
    }

    /// End the drag: travel from the current position to `destination`.
    pub fn release(&mut self, destination: Point, cell: Option<CellKey>) {
        let at = self.motion.position();
        self.drag = DragState::Idle;
        self.hint = None;
        self.piece.user_controlled().set(false);
        self.view.set_user_controlled(false);
        self.origin = at;
        self.destination = destination;
        self.destination_cell = cell;
        self.arrived = false;
        self.motion.launch(at, destination);
    }

    /// Pass an orientation hint through to the view.
    pub fn orient(&mut self, toward: Point, dt: Duration) {
        self.hint = Some(toward);
        self.view.orient(toward, dt);
    }

    /// Advance motion by `dt`. Returns `true` on the step the piece arrives.
    pub fn step(&mut self, dt: Duration) -> bool {
        if self.is_user_controlled() || self.arrived {
            return false;
        }
        self.motion.tick(dt);
        if self.motion.is_at_rest() {
            self.motion.snap_to(self.destination);
            self.arrived = true;
        }
        let at = self.motion.position();
        self.view.set_midpoint(at);
        if self.arrived {
            trace!(piece = %self.id(), x = at.x, y = at.y, "piece arrived");
        }
        self.arrived
    }

    /// Release the view.
    pub fn dispose(&mut self) {
        self.view.dispose();
    }
}

impl fmt::Debug for PieceController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceController")
            .field("piece", &self.id())
            .field("midpoint", &self.midpoint())
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("drag", &self.drag)
            .field("arrived", &self.arrived)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractile_model::{CellModel, FractionModel};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Trace {
        midpoints: Vec<Point>,
        controlled: Vec<bool>,
        orients: usize,
    }

    struct TraceView(Rc<RefCell<Trace>>);

    impl PieceView for TraceView {
        fn set_midpoint(&mut self, midpoint: Point) {
            self.0.borrow_mut().midpoints.push(midpoint);
        }
        fn set_user_controlled(&mut self, active: bool) {
            self.0.borrow_mut().controlled.push(active);
        }
        fn orient(&mut self, _toward: Point, _dt: Duration) {
            self.0.borrow_mut().orients += 1;
        }
    }

    const FRAME: Duration = Duration::from_millis(16);

    fn controller(origin: Point, destination: Point) -> (PieceController, Rc<RefCell<Trace>>) {
        let model = FractionModel::new(1, 1).unwrap();
        let piece = model.grab_from_bucket();
        let trace = Rc::new(RefCell::new(Trace::default()));
        let view = Box::new(TraceView(Rc::clone(&trace)));
        (
            PieceController::new(piece, origin, destination, &MotionConfig::default(), view),
            trace,
        )
    }

    fn run_until_arrival(c: &mut PieceController) -> usize {
        for frame in 1..=600 {
            if c.step(FRAME) {
                return frame;
            }
        }
        panic!("piece never arrived: {c:?}");
    }

    #[test]
    fn travels_to_destination_and_reports_once() {
        let (mut c, _) = controller(Point::new(0.0, 50.0), Point::new(100.0, -200.0));
        run_until_arrival(&mut c);
        assert_eq!(c.midpoint(), Point::new(100.0, -200.0));
        assert!(!c.step(FRAME));
        assert!(c.has_arrived());
    }

    #[test]
    fn drag_follows_pointer_with_offset() {
        let (mut c, trace) = controller(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
        c.begin_drag(PointerId::MOUSE, Point::new(12.0, 15.0));
        assert!(c.is_user_controlled());
        assert!(c.piece().user_controlled().get());
        c.drag_to(Point::new(102.0, 115.0));
        assert_eq!(c.midpoint(), Point::new(100.0, 110.0));
        assert!(!c.step(FRAME), "no arrival while dragging");
        assert_eq!(trace.borrow().controlled, vec![true]);
    }

    #[test]
    fn release_launches_from_current_position() {
        let (mut c, trace) = controller(Point::ORIGIN, Point::ORIGIN);
        c.begin_drag(PointerId::MOUSE, Point::ORIGIN);
        c.drag_to(Point::new(40.0, 0.0));
        c.release(Point::new(0.0, 50.0), None);
        assert_eq!(c.origin(), Point::new(40.0, 0.0));
        assert_eq!(c.drag_state(), DragState::Idle);
        assert!(!c.piece().user_controlled().get());
        run_until_arrival(&mut c);
        assert_eq!(c.midpoint(), Point::new(0.0, 50.0));
        assert_eq!(trace.borrow().controlled, vec![true, false]);
    }

    #[test]
    fn drag_to_is_ignored_when_idle() {
        let (mut c, _) = controller(Point::ORIGIN, Point::ORIGIN);
        c.drag_to(Point::new(500.0, 500.0));
        assert_eq!(c.midpoint(), Point::ORIGIN);
    }

    #[test]
    fn retarget_wakes_settled_piece() {
        let (mut c, _) = controller(Point::ORIGIN, Point::new(20.0, 0.0));
        run_until_arrival(&mut c);
        c.set_destination(Point::new(-20.0, 0.0), None);
        assert!(!c.has_arrived());
        run_until_arrival(&mut c);
        assert_eq!(c.midpoint(), Point::new(-20.0, 0.0));
    }

    #[test]
    fn orient_records_hint() {
        let (mut c, trace) = controller(Point::ORIGIN, Point::ORIGIN);
        c.begin_drag(PointerId::MOUSE, Point::ORIGIN);
        c.orient(Point::new(5.0, 5.0), FRAME);
        assert_eq!(c.hint(), Some(Point::new(5.0, 5.0)));
        assert_eq!(trace.borrow().orients, 1);
        c.release(Point::ORIGIN, None);
        assert_eq!(c.hint(), None);
    }
}
