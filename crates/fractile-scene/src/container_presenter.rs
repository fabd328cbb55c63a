#![forbid(unsafe_code)]

//! Live visual counterpart of one model container.
//!
//! A presenter owns the container's [`CellGeometry`] and one slot binding
//! per cell. It follows the container's `cell_count` and rebuilds as soon as
//! the count changes; each slot mirrors its cell's `appears_filled` flag.
//!
//! # Invariants
//!
//! 1. After any notification, `slot_count() == container.cells().len()` and
//!    slot `i` is bound to `container.cells()[i]`.
//! 2. Only a slot whose cell appears filled reports a press.
//! 3. After [`dispose`](ContainerPresenter::dispose) the presenter holds no
//!    subscription on the container or any of its cells.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use fractile_core::event::PointerEvent;
use fractile_core::geometry::{Affine, Point, Segment, Size};
use fractile_core::reactive::Subscription;
use fractile_model::{CellRef, Container, ContainerId, ContainerRef};
use tracing::debug;

use crate::cell_geometry::{CellGeometry, CellLayout};
use crate::error::GeometryError;

/// Receives `(cell, event)` when a filled slot is pressed.
pub type CellDownCallback = Rc<dyn Fn(&CellRef, &PointerEvent)>;

/// Called with the container id after every rebuild.
pub type RebuildHook = Rc<dyn Fn(ContainerId)>;

struct SlotBinding {
    cell: CellRef,
    visible: Rc<std::cell::Cell<bool>>,
    _link: Subscription,
}

impl SlotBinding {
    fn bind(cell: CellRef) -> Self {
        let visible = Rc::new(std::cell::Cell::new(false));
        let flag = Rc::clone(&visible);
        let link = cell.appears_filled().link(move |filled| flag.set(*filled));
        Self {
            cell,
            visible,
            _link: link,
        }
    }
}

struct PresenterState {
    geometry: CellGeometry,
    slots: Vec<SlotBinding>,
    generation: u64,
    rebuilds: u64,
    on_rebuilt: Option<RebuildHook>,
}

impl PresenterState {
    fn rebuild(&mut self, container: &Container) {
        self.slots.clear();
        let cells = container.cells();
        self.geometry.rebuild(cells.len());
        self.slots = cells.into_iter().map(SlotBinding::bind).collect();
        self.generation = container.generation();
        self.rebuilds += 1;
    }
}

pub struct ContainerPresenter {
    id: ContainerId,
    container: Weak<Container>,
    state: Rc<RefCell<PresenterState>>,
    on_cell_down: CellDownCallback,
    subscription: Option<Subscription>,
    local_to_scene: Affine,
    disposed: bool,
}

impl ContainerPresenter {
    /// Build geometry for `container`'s current cells and start following
    /// its cell count.
    #[must_use]
    pub fn create_for(
        container: &ContainerRef,
        layout: Rc<dyn CellLayout>,
        on_cell_down: CellDownCallback,
    ) -> Self {
        let cells = container.cells();
        let state = Rc::new(RefCell::new(PresenterState {
            geometry: CellGeometry::new(layout, cells.len()),
            slots: cells.into_iter().map(SlotBinding::bind).collect(),
            generation: container.generation(),
            rebuilds: 0,
            on_rebuilt: None,
        }));

        let weak_state = Rc::downgrade(&state);
        let weak_container = Rc::downgrade(container);
        let id = container.id();
        let subscription = container.cell_count().subscribe(move |_| {
            let (Some(state), Some(container)) = (weak_state.upgrade(), weak_container.upgrade())
            else {
                return;
            };
            let hook = {
                let mut state = state.borrow_mut();
                state.rebuild(&container);
                debug!(container = %id, cells = state.slots.len(), "presenter rebuilt");
                state.on_rebuilt.clone()
            };
            if let Some(hook) = hook {
                hook(id);
            }
        });

        debug!(
            container = %id,
            layout = state.borrow().geometry.layout().name(),
            "presenter created"
        );
        Self {
            id,
            container: Rc::downgrade(container),
            state,
            on_cell_down,
            subscription: Some(subscription),
            local_to_scene: Affine::IDENTITY,
            disposed: false,
        }
    }

    /// Install a hook run after every rebuild.
    pub fn set_rebuild_hook(&mut self, hook: RebuildHook) {
        self.state.borrow_mut().on_rebuilt = Some(hook);
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// The presented container, if the model still holds it.
    #[must_use]
    pub fn container(&self) -> Option<ContainerRef> {
        self.container.upgrade()
    }

    /// Container generation the slots were built from.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Number of rebuilds since creation.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.state.borrow().rebuilds
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.state.borrow().slots.len()
    }

    /// Name of the cell layout strategy.
    #[must_use]
    pub fn layout_name(&self) -> &'static str {
        self.state.borrow().geometry.layout().name()
    }

    #[must_use]
    pub fn footprint(&self) -> Size {
        self.state.borrow().geometry.footprint()
    }

    #[must_use]
    pub fn dividers(&self) -> Vec<Segment> {
        self.state.borrow().geometry.dividers().to_vec()
    }

    /// Local midpoint of cell `index`.
    pub fn midpoint_of(&self, index: usize) -> Result<Point, GeometryError> {
        self.state.borrow().geometry.midpoint_of(index)
    }

    /// Whether slot `index` currently renders its piece.
    #[must_use]
    pub fn slot_visible(&self, index: usize) -> bool {
        self.state
            .borrow()
            .slots
            .get(index)
            .is_some_and(|slot| slot.visible.get())
    }

    /// The outline is emphasised while any cell renders as filled.
    #[must_use]
    pub fn is_outlined(&self) -> bool {
        self.container
            .upgrade()
            .is_some_and(|c| c.filled_count().get() > 0)
    }

    /// Transform from this presenter's local frame to the scene frame.
    #[must_use]
    pub fn local_to_scene(&self) -> Affine {
        self.local_to_scene
    }

    /// Where the layout placed this presenter in the scene.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.local_to_scene.apply(Point::ORIGIN)
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.local_to_scene = Affine::translation(origin.to_vector());
    }

    /// Map a scene point into the local frame.
    #[must_use]
    pub fn scene_to_local(&self, scene: Point) -> Option<Point> {
        self.local_to_scene.inverse().map(|inv| inv.apply(scene))
    }

    /// Index of the slot under `local`.
    #[must_use]
    pub fn hit_test(&self, local: Point) -> Option<usize> {
        self.state.borrow().geometry.hit_test(local)
    }

    /// Route a press at `local`. Returns `true` when a filled slot reported
    /// it to the cell-down callback.
    pub fn pointer_down(&self, local: Point, event: &PointerEvent) -> bool {
        let pressed = {
            let state = self.state.borrow();
            state
                .geometry
                .hit_test(local)
                .and_then(|index| state.slots.get(index))
                .filter(|slot| slot.visible.get())
                .map(|slot| Rc::clone(&slot.cell))
        };
        match pressed {
            Some(cell) => {
                (self.on_cell_down)(&cell, event);
                true
            }
            None => false,
        }
    }

    /// Whether `cell` is bound to one of the current slots.
    #[must_use]
    pub fn presents(&self, cell: &CellRef) -> bool {
        self.state
            .borrow()
            .slots
            .get(cell.index())
            .is_some_and(|slot| Rc::ptr_eq(&slot.cell, cell))
    }

    /// Stop following the container and release every slot binding.
    ///
    /// Call exactly once.
    pub fn dispose(&mut self) {
        debug_assert!(!self.disposed, "presenter {} disposed twice", self.id);
        self.subscription = None;
        let mut state = self.state.borrow_mut();
        state.slots.clear();
        state.on_rebuilt = None;
        self.disposed = true;
        debug!(container = %self.id, "presenter disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl fmt::Debug for ContainerPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerPresenter")
            .field("id", &self.id)
            .field("origin", &self.origin())
            .field("slots", &self.slot_count())
            .field("generation", &self.generation())
            .field("disposed", &self.disposed)
            .finish()
    }
}
