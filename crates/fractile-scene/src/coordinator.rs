#![forbid(unsafe_code)]

//! Top-level owner of a fraction scene.
//!
//! The coordinator pairs every model container with a [`ContainerPresenter`]
//! and every model piece with a [`PieceController`], runs the per-frame
//! update, resolves drags, and maps cell midpoints into the overlay frame
//! that dragged pieces render in.
//!
//! # Reconciliation
//!
//! Model collection listeners never touch the coordinator directly; they
//! queue a notice. [`SceneCoordinator::reconcile`] drains the queue and
//! creates or disposes presenters and controllers. Every public entry point
//! reconciles first (and again after calling into the model), so structural
//! changes never happen mid-iteration in `step` or inside drag handling.
//!
//! # Frames
//!
//! - *local*: a presenter's frame, origin at its footprint's top-left.
//! - *scene*: the frame pointer events arrive in; the flow layout and the
//!   bucket are placed here.
//! - *overlay*: the scene translated so `config.overlay_origin` is `(0, 0)`.
//!   Piece positions live here.
//!
//! # Invariants
//!
//! 1. After `reconcile()`, each container in the model has exactly one live
//!    presenter and (when a piece factory is installed) each piece has
//!    exactly one live controller.
//! 2. A cell is only ever resolved through the presenter whose generation
//!    matches the cell's; older cells are stale.
//! 3. When cells are discarded (rebuild or container removal), any idle
//!    controller heading for one of them is redirected to the bucket.
//!
//! # Failure Modes
//!
//! A missing presenter or controller is an invariant violation: it is
//! logged with `tracing::error!` and returned as [`SceneError`], aborting
//! the operation. No unfilled cell in range is not an error; it is `None`
//! and routes the piece back to the bucket.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use fractile_core::event::{PointerEvent, PointerEventKind, PointerId};
use fractile_core::geometry::{Affine, Point, Size};
use fractile_core::reactive::Subscription;
use fractile_model::{
    CellKey, CellModel, CellRef, ContainerId, ContainerRef, PieceId, PieceRef,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, error, trace, warn};

use crate::bucket::Bucket;
use crate::cell_geometry::{CellLayout, CircularLayout, RectangularLayout};
use crate::config::SceneConfig;
use crate::container_presenter::{CellDownCallback, ContainerPresenter};
use crate::error::SceneError;
use crate::layout::FlowLayout;
use crate::piece_controller::{PieceController, PieceView};
use crate::snapshot::{ContainerSnapshot, PieceSnapshot, SceneSnapshot};

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Chooses the cell layout for each container.
pub trait ContainerPresentationFactory {
    fn layout_for(&self, container: &ContainerRef) -> Rc<dyn CellLayout>;
}

impl<F> ContainerPresentationFactory for F
where
    F: Fn(&ContainerRef) -> Rc<dyn CellLayout>,
{
    fn layout_for(&self, container: &ContainerRef) -> Rc<dyn CellLayout> {
        self(container)
    }
}

/// Creates the visual for each piece.
pub trait PiecePresentationFactory {
    fn create_view(&self, piece: &PieceRef) -> Box<dyn PieceView>;
}

impl<F> PiecePresentationFactory for F
where
    F: Fn(&PieceRef) -> Box<dyn PieceView>,
{
    fn create_view(&self, piece: &PieceRef) -> Box<dyn PieceView> {
        self(piece)
    }
}

/// One layout shared by every container.
#[derive(Debug, Clone)]
struct SharedLayout(Rc<dyn CellLayout>);

impl ContainerPresentationFactory for SharedLayout {
    fn layout_for(&self, _container: &ContainerRef) -> Rc<dyn CellLayout> {
        Rc::clone(&self.0)
    }
}

enum LayoutChoice {
    Rectangular,
    Circular,
    Custom(Box<dyn ContainerPresentationFactory>),
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and builds a [`SceneCoordinator`].
pub struct SceneCoordinatorBuilder {
    model: Rc<dyn CellModel>,
    config: SceneConfig,
    layout: Option<LayoutChoice>,
    piece_factory: Option<Box<dyn PiecePresentationFactory>>,
}

impl SceneCoordinatorBuilder {
    #[must_use]
    pub fn config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    /// Rectangular containers sized by `config.rectangular_size`.
    #[must_use]
    pub fn rectangular(mut self) -> Self {
        self.layout = Some(LayoutChoice::Rectangular);
        self
    }

    /// Circular containers sized by `config.circular_radius`.
    #[must_use]
    pub fn circular(mut self) -> Self {
        self.layout = Some(LayoutChoice::Circular);
        self
    }

    #[must_use]
    pub fn container_factory(
        mut self,
        factory: impl ContainerPresentationFactory + 'static,
    ) -> Self {
        self.layout = Some(LayoutChoice::Custom(Box::new(factory)));
        self
    }

    /// Without a piece factory every new piece is completed immediately.
    #[must_use]
    pub fn piece_factory(mut self, factory: impl PiecePresentationFactory + 'static) -> Self {
        self.piece_factory = Some(Box::new(factory));
        self
    }

    /// Validate, subscribe to the model, and adopt what it already holds.
    pub fn build(self) -> Result<SceneCoordinator, SceneError> {
        let errors = self.config.validate();
        if !errors.is_empty() {
            return Err(SceneError::InvalidConfig { errors });
        }
        let container_factory: Box<dyn ContainerPresentationFactory> = match self.layout {
            None => return Err(SceneError::MissingContainerFactory),
            Some(LayoutChoice::Rectangular) => Box::new(SharedLayout(Rc::new(
                RectangularLayout::new(self.config.rectangular_size),
            ))),
            Some(LayoutChoice::Circular) => Box::new(SharedLayout(Rc::new(CircularLayout::new(
                self.config.circular_radius,
            )))),
            Some(LayoutChoice::Custom(factory)) => factory,
        };

        let queue: Rc<RefCell<VecDeque<SceneNotice>>> = Rc::new(RefCell::new(VecDeque::new()));
        let subscriptions = vec![
            {
                let q = Rc::clone(&queue);
                self.model.containers().on_added(move |c: &ContainerRef| {
                    q.borrow_mut().push_back(SceneNotice::ContainerAdded(Rc::clone(c)));
                })
            },
            {
                let q = Rc::clone(&queue);
                self.model.containers().on_removed(move |c: &ContainerRef| {
                    q.borrow_mut().push_back(SceneNotice::ContainerRemoved(Rc::clone(c)));
                })
            },
            {
                let q = Rc::clone(&queue);
                self.model.pieces().on_added(move |p: &PieceRef| {
                    q.borrow_mut().push_back(SceneNotice::PieceAdded(Rc::clone(p)));
                })
            },
            {
                let q = Rc::clone(&queue);
                self.model.pieces().on_removed(move |p: &PieceRef| {
                    q.borrow_mut().push_back(SceneNotice::PieceRemoved(Rc::clone(p)));
                })
            },
        ];
        {
            let mut pending = queue.borrow_mut();
            self.model
                .containers()
                .for_each(|c| pending.push_back(SceneNotice::ContainerAdded(Rc::clone(c))));
            self.model
                .pieces()
                .for_each(|p| pending.push_back(SceneNotice::PieceAdded(Rc::clone(p))));
        }

        let mut scene = SceneCoordinator {
            flow: FlowLayout::new(self.config.container_spacing, self.config.container_anchor),
            bucket: Bucket::from_config(&self.config.bucket),
            model: self.model,
            config: self.config,
            container_factory,
            piece_factory: self.piece_factory,
            presenters: BTreeMap::new(),
            controllers: BTreeMap::new(),
            drags: BTreeMap::new(),
            queue,
            presses: Vec::new(),
            subscriptions,
            layout_dirty: false,
            disposed: false,
        };
        scene.reconcile()?;
        debug!(
            containers = scene.presenters.len(),
            pieces = scene.controllers.len(),
            "scene built"
        );
        Ok(scene)
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

enum SceneNotice {
    ContainerAdded(ContainerRef),
    ContainerRemoved(ContainerRef),
    PieceAdded(PieceRef),
    PieceRemoved(PieceRef),
    CellsRebuilt(ContainerId),
    CellPressed(CellRef, PointerEvent),
}

/// Where a released piece was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum DropTarget {
    Cell { cell: CellKey },
    Bucket,
}

pub struct SceneCoordinator {
    model: Rc<dyn CellModel>,
    config: SceneConfig,
    flow: FlowLayout,
    bucket: Bucket,
    container_factory: Box<dyn ContainerPresentationFactory>,
    piece_factory: Option<Box<dyn PiecePresentationFactory>>,
    presenters: BTreeMap<ContainerId, ContainerPresenter>,
    controllers: BTreeMap<PieceId, PieceController>,
    drags: BTreeMap<PointerId, PieceId>,
    queue: Rc<RefCell<VecDeque<SceneNotice>>>,
    presses: Vec<(CellRef, PointerEvent)>,
    subscriptions: Vec<Subscription>,
    layout_dirty: bool,
    disposed: bool,
}

impl SceneCoordinator {
    /// Start configuring a scene over `model`.
    #[must_use]
    pub fn builder<M: CellModel + 'static>(model: Rc<M>) -> SceneCoordinatorBuilder {
        SceneCoordinatorBuilder {
            model,
            config: SceneConfig::default(),
            layout: None,
            piece_factory: None,
        }
    }

    // -- reconciliation ----------------------------------------------------

    /// Apply every queued model change.
    pub fn reconcile(&mut self) -> Result<(), SceneError> {
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(notice) = next else {
                break;
            };
            match notice {
                SceneNotice::ContainerAdded(container) => self.adopt_container(&container),
                SceneNotice::ContainerRemoved(container) => self.release_container(&container)?,
                SceneNotice::PieceAdded(piece) => self.adopt_piece(&piece),
                SceneNotice::PieceRemoved(piece) => self.release_piece(&piece)?,
                SceneNotice::CellsRebuilt(id) => self.redirect_stale(id),
                SceneNotice::CellPressed(cell, event) => self.presses.push((cell, event)),
            }
        }
        self.relayout_if_dirty();
        Ok(())
    }

    fn adopt_container(&mut self, container: &ContainerRef) {
        let id = container.id();
        if self.presenters.contains_key(&id) {
            warn!(container = %id, "container announced twice");
            return;
        }
        let layout = self.container_factory.layout_for(container);
        let presses = Rc::clone(&self.queue);
        let on_cell_down: CellDownCallback = Rc::new(move |cell: &CellRef, event: &PointerEvent| {
            presses
                .borrow_mut()
                .push_back(SceneNotice::CellPressed(Rc::clone(cell), *event));
        });
        let mut presenter = ContainerPresenter::create_for(container, layout, on_cell_down);
        let rebuilds = Rc::clone(&self.queue);
        presenter.set_rebuild_hook(Rc::new(move |id: ContainerId| {
            rebuilds.borrow_mut().push_back(SceneNotice::CellsRebuilt(id));
        }));
        self.presenters.insert(id, presenter);
        self.layout_dirty = true;
    }

    fn release_container(&mut self, container: &ContainerRef) -> Result<(), SceneError> {
        let id = container.id();
        let Some(mut presenter) = self.presenters.remove(&id) else {
            error!(container = %id, "container removed without a live presenter");
            return Err(SceneError::MissingPresenter { container: id });
        };
        presenter.dispose();
        self.layout_dirty = true;
        self.redirect_stale(id);
        Ok(())
    }

    fn adopt_piece(&mut self, piece: &PieceRef) {
        if self.piece_factory.is_none() {
            debug!(piece = %piece.id(), "no piece presentation; completing immediately");
            self.model.complete_piece(piece);
            return;
        }
        if self.controllers.contains_key(&piece.id()) {
            warn!(piece = %piece.id(), "piece announced twice");
            return;
        }
        self.relayout_if_dirty();
        let (origin, origin_cell) = self.resolve_endpoint(piece.origin_cell().get());
        let (destination, destination_cell) = self.resolve_endpoint(piece.destination_cell().get());
        let Some(factory) = self.piece_factory.as_ref() else {
            return;
        };
        let view = factory.create_view(piece);
        let controller =
            PieceController::new(Rc::clone(piece), origin, destination, &self.config.motion, view)
                .with_cells(origin_cell, destination_cell);
        debug!(piece = %piece.id(), ?origin, ?destination, "controller created");
        self.controllers.insert(piece.id(), controller);
    }

    fn release_piece(&mut self, piece: &PieceRef) -> Result<(), SceneError> {
        let id = piece.id();
        match self.controllers.remove(&id) {
            Some(mut controller) => {
                controller.dispose();
                self.drags.retain(|_, dragged| *dragged != id);
                debug!(piece = %id, "controller disposed");
                Ok(())
            }
            None if self.piece_factory.is_none() => Ok(()),
            None => {
                error!(piece = %id, "piece removed without a live controller");
                Err(SceneError::MissingController { piece: id })
            }
        }
    }

    /// Overlay point for an optional cell; the bucket when absent or stale.
    fn resolve_endpoint(&self, cell: Option<CellRef>) -> (Point, Option<CellKey>) {
        let Some(cell) = cell else {
            return (self.bucket_point(), None);
        };
        match self.key_midpoint(cell.key()) {
            Ok(at) => (at, Some(cell.key())),
            Err(e) => {
                warn!(cell = %cell.key(), error = %e, "piece endpoint unresolvable; using bucket");
                (self.bucket_point(), None)
            }
        }
    }

    /// Send idle pieces aimed at discarded cells of `id` back to the bucket.
    fn redirect_stale(&mut self, id: ContainerId) {
        let live_generation = self.presenters.get(&id).map(ContainerPresenter::generation);
        let is_stale =
            |key: CellKey| key.container == id && Some(key.generation) != live_generation;
        let fallback = self.bucket_point();
        for controller in self.controllers.values_mut() {
            if controller.origin_cell().is_some_and(is_stale) {
                controller.forget_origin_cell();
            }
            if controller.destination_cell().is_some_and(is_stale) {
                debug!(
                    piece = %controller.id(),
                    container = %id,
                    user_controlled = controller.is_user_controlled(),
                    "destination cell discarded; redirecting to bucket"
                );
                controller.set_destination(fallback, None);
            }
        }
    }

    fn relayout_if_dirty(&mut self) {
        if !self.layout_dirty {
            return;
        }
        self.layout_dirty = false;
        let order = self.container_order();
        let sizes: Vec<Size> = order
            .iter()
            .filter_map(|id| self.presenters.get(id).map(ContainerPresenter::footprint))
            .collect();
        let rects = self.flow.place(&sizes);
        for (id, rect) in order.iter().zip(rects) {
            if let Some(presenter) = self.presenters.get_mut(id) {
                presenter.set_origin(rect.origin());
            }
        }
        debug!(containers = order.len(), "containers laid out");

        // Pieces in flight follow their target cell to its new position.
        let moved: Vec<(PieceId, Point, CellKey)> = self
            .controllers
            .values()
            .filter(|c| !c.is_user_controlled())
            .filter_map(|c| {
                let key = c.destination_cell()?;
                let at = self.key_midpoint(key).ok()?;
                (at != c.destination()).then_some((c.id(), at, key))
            })
            .collect();
        for (id, at, key) in moved {
            if let Some(controller) = self.controllers.get_mut(&id) {
                controller.set_destination(at, Some(key));
            }
        }
    }

    /// Live containers in model order.
    fn container_order(&self) -> Vec<ContainerId> {
        self.model
            .containers()
            .snapshot()
            .iter()
            .map(|c| c.id())
            .filter(|id| self.presenters.contains_key(id))
            .collect()
    }

    // -- frames --------------------------------------------------------------

    fn scene_to_overlay(&self) -> Affine {
        Affine::translation(-self.config.overlay_origin.to_vector())
    }

    fn to_overlay(&self, scene: Point) -> Point {
        self.scene_to_overlay().apply(scene)
    }

    /// Bucket reference point in the overlay frame.
    #[must_use]
    pub fn bucket_point(&self) -> Point {
        self.to_overlay(self.bucket.reference_point())
    }

    fn key_midpoint(&self, key: CellKey) -> Result<Point, SceneError> {
        let Some(presenter) = self.presenters.get(&key.container) else {
            error!(container = %key.container, cell = %key, "cell lookup without a live presenter");
            return Err(SceneError::MissingPresenter {
                container: key.container,
            });
        };
        if presenter.generation() != key.generation {
            return Err(SceneError::StaleCell { cell: key });
        }
        let local = presenter.midpoint_of(key.index)?;
        Ok(presenter
            .local_to_scene()
            .then(self.scene_to_overlay())
            .apply(local))
    }

    /// A cell's midpoint in the overlay frame.
    pub fn cell_midpoint_in_overlay_frame(&mut self, cell: &CellRef) -> Result<Point, SceneError> {
        self.reconcile()?;
        self.key_midpoint(cell.key())
    }

    // -- nearest-cell search ---------------------------------------------------

    fn nearest(
        &self,
        point: Point,
        threshold: Option<f64>,
    ) -> Result<Option<(CellRef, Point)>, SceneError> {
        let mut best = None;
        let mut best_distance = threshold.unwrap_or(f64::INFINITY);
        for container in self.model.containers().snapshot() {
            for cell in container.cells() {
                if cell.is_filled().get() {
                    continue;
                }
                let at = self.key_midpoint(cell.key())?;
                let distance = at.distance(point);
                if distance < best_distance {
                    best_distance = distance;
                    best = Some((cell, at));
                }
            }
        }
        Ok(best)
    }

    /// Nearest unfilled cell to `point` (overlay frame).
    ///
    /// With a threshold, cells at or beyond it are ignored. Ties go to the
    /// first cell in container-then-index order.
    pub fn find_closest_cell(
        &mut self,
        point: Point,
        threshold: Option<f64>,
    ) -> Result<Option<CellRef>, SceneError> {
        self.reconcile()?;
        Ok(self.nearest(point, threshold)?.map(|(cell, _)| cell))
    }

    // -- per-frame update --------------------------------------------------------

    /// Advance every piece by `dt` and hint dragged pieces toward nearby cells.
    ///
    /// A failed hint lookup does not cut the frame short: every controller
    /// still advances and arrivals are completed before the first error is
    /// returned.
    pub fn step(&mut self, dt: Duration) -> Result<(), SceneError> {
        self.reconcile()?;
        let span = debug_span!("scene_step", controllers = self.controllers.len());
        let _guard = span.enter();

        let ids: Vec<PieceId> = self.controllers.keys().copied().collect();
        let mut arrived = Vec::new();
        let mut failure = None;
        for id in ids {
            let Some(controller) = self.controllers.get_mut(&id) else {
                continue;
            };
            if controller.step(dt) {
                arrived.push(Rc::clone(controller.piece()));
            }
            if !controller.is_user_controlled() {
                continue;
            }
            let midpoint = controller.midpoint();
            let hint = match self.nearest(midpoint, Some(self.config.hint_threshold)) {
                Ok(hint) => hint,
                Err(err) => {
                    failure.get_or_insert(err);
                    continue;
                }
            };
            if let Some((cell, toward)) = hint
                && let Some(controller) = self.controllers.get_mut(&id)
            {
                trace!(piece = %id, cell = %cell.key(), "orientation hint");
                controller.orient(toward, dt);
            }
        }

        for piece in arrived {
            debug!(piece = %piece.id(), "piece arrived; completing");
            self.model.complete_piece(&piece);
        }
        let reconciled = self.reconcile();
        match failure {
            Some(err) => Err(err),
            None => reconciled,
        }
    }

    // -- pointer input -----------------------------------------------------------

    /// Dispatch a pointer event. Returns whether the scene consumed it.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<bool, SceneError> {
        match event.kind {
            PointerEventKind::Down => Ok(self.pointer_down(event)?.is_some()),
            PointerEventKind::Move => self.pointer_move(event),
            PointerEventKind::Up | PointerEventKind::Cancel => {
                Ok(self.pointer_up(event)?.is_some())
            }
        }
    }

    /// Route a press: a filled cell wins over the bucket. Returns the piece
    /// the press picked up.
    pub fn pointer_down(&mut self, event: PointerEvent) -> Result<Option<PieceId>, SceneError> {
        self.reconcile()?;
        if self.drags.contains_key(&event.pointer) {
            return Ok(None);
        }
        for id in self.container_order() {
            let Some(presenter) = self.presenters.get(&id) else {
                continue;
            };
            if let Some(local) = presenter.scene_to_local(event.point)
                && presenter.pointer_down(local, &event)
            {
                break;
            }
        }
        self.reconcile()?;

        let press = self.presses.pop();
        self.presses.clear();
        if let Some((cell, pressed)) = press {
            return self.begin_cell_drag(&cell, pressed).map(Some);
        }
        if self.bucket.contains(event.point) {
            return self.begin_bucket_drag(event).map(Some);
        }
        Ok(None)
    }

    /// Take a fresh piece from the bucket and start dragging it.
    pub fn begin_bucket_drag(&mut self, event: PointerEvent) -> Result<PieceId, SceneError> {
        self.reconcile()?;
        let piece = self.model.grab_from_bucket();
        self.reconcile()?;
        let at = self.to_overlay(event.point);
        self.start_drag(&piece, at, None, event)?;
        Ok(piece.id())
    }

    /// Detach the piece in `cell` and start dragging it.
    pub fn begin_cell_drag(
        &mut self,
        cell: &CellRef,
        event: PointerEvent,
    ) -> Result<PieceId, SceneError> {
        self.reconcile()?;
        let at = self.key_midpoint(cell.key())?;
        let piece = self.model.grab_cell(cell)?;
        self.reconcile()?;
        self.start_drag(&piece, at, Some(cell.key()), event)?;
        Ok(piece.id())
    }

    fn start_drag(
        &mut self,
        piece: &PieceRef,
        origin: Point,
        origin_cell: Option<CellKey>,
        event: PointerEvent,
    ) -> Result<(), SceneError> {
        let pointer_at = self.to_overlay(event.point);
        let Some(controller) = self.controllers.get_mut(&piece.id()) else {
            if self.piece_factory.is_none() {
                debug!(piece = %piece.id(), "piece completed without presentation; no drag");
                return Ok(());
            }
            error!(piece = %piece.id(), "grabbed piece has no live controller");
            return Err(SceneError::MissingController { piece: piece.id() });
        };
        controller.set_origin(origin, origin_cell);
        controller.begin_drag(event.pointer, pointer_at);
        self.drags.insert(event.pointer, piece.id());
        debug!(piece = %piece.id(), pointer = event.pointer.0, ?origin, "drag started");
        Ok(())
    }

    /// Move the piece held by the event's pointer. Returns whether one moved.
    pub fn pointer_move(&mut self, event: PointerEvent) -> Result<bool, SceneError> {
        self.reconcile()?;
        let Some(&id) = self.drags.get(&event.pointer) else {
            return Ok(false);
        };
        let at = self.to_overlay(event.point);
        let Some(controller) = self.controllers.get_mut(&id) else {
            self.drags.remove(&event.pointer);
            error!(piece = %id, "dragged piece has no live controller");
            return Err(SceneError::MissingController { piece: id });
        };
        controller.drag_to(at);
        Ok(true)
    }

    /// Release the piece held by the event's pointer and resolve its target.
    pub fn pointer_up(&mut self, event: PointerEvent) -> Result<Option<DropTarget>, SceneError> {
        self.reconcile()?;
        let Some(id) = self.drags.remove(&event.pointer) else {
            return Ok(None);
        };
        let at = self.to_overlay(event.point);
        let (piece, midpoint) = match self.controllers.get_mut(&id) {
            Some(controller) => {
                controller.drag_to(at);
                (Rc::clone(controller.piece()), controller.midpoint())
            }
            None => {
                error!(piece = %id, "released piece has no live controller");
                return Err(SceneError::MissingController { piece: id });
            }
        };

        let target = self.nearest(midpoint, Some(self.config.drop_threshold))?;
        let fallback = self.bucket_point();
        let controller = self
            .controllers
            .get_mut(&id)
            .ok_or(SceneError::MissingController { piece: id })?;
        let outcome = match target {
            Some((cell, destination)) => {
                controller.release(destination, Some(cell.key()));
                self.model.target_piece_to_cell(&piece, &cell);
                DropTarget::Cell { cell: cell.key() }
            }
            None => {
                controller.release(fallback, None);
                DropTarget::Bucket
            }
        };
        debug!(piece = %id, ?outcome, "piece dropped");
        self.reconcile()?;
        Ok(Some(outcome))
    }

    // -- teardown ------------------------------------------------------------------

    /// Drop the model subscriptions and every presenter and controller.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.subscriptions.clear();
        for presenter in self.presenters.values_mut() {
            presenter.dispose();
        }
        for controller in self.controllers.values_mut() {
            controller.dispose();
        }
        self.presenters.clear();
        self.controllers.clear();
        self.drags.clear();
        self.presses.clear();
        self.queue.borrow_mut().clear();
        self.disposed = true;
        debug!("scene disposed");
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // -- queries ---------------------------------------------------------------------

    #[must_use]
    pub fn model(&self) -> &Rc<dyn CellModel> {
        &self.model
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    #[must_use]
    pub fn presenter(&self, id: ContainerId) -> Option<&ContainerPresenter> {
        self.presenters.get(&id)
    }

    #[must_use]
    pub fn controller(&self, id: PieceId) -> Option<&PieceController> {
        self.controllers.get(&id)
    }

    pub fn presenters(&self) -> impl Iterator<Item = &ContainerPresenter> {
        self.presenters.values()
    }

    pub fn controllers(&self) -> impl Iterator<Item = &PieceController> {
        self.controllers.values()
    }

    /// Scene position of a container's top-left corner.
    #[must_use]
    pub fn container_origin(&self, id: ContainerId) -> Option<Point> {
        self.presenters.get(&id).map(ContainerPresenter::origin)
    }

    /// Piece held by `pointer`, if any.
    #[must_use]
    pub fn dragged_piece(&self, pointer: PointerId) -> Option<PieceId> {
        self.drags.get(&pointer).copied()
    }

    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        let containers = self
            .container_order()
            .iter()
            .filter_map(|id| self.presenters.get(id))
            .map(|p| ContainerSnapshot {
                id: p.id(),
                layout: p.layout_name().to_owned(),
                origin: p.origin(),
                footprint: p.footprint(),
                generation: p.generation(),
                visible: (0..p.slot_count()).map(|i| p.slot_visible(i)).collect(),
                outlined: p.is_outlined(),
            })
            .collect();
        let pieces = self
            .controllers
            .values()
            .map(|c| PieceSnapshot {
                id: c.id(),
                midpoint: c.midpoint(),
                origin: c.origin(),
                destination: c.destination(),
                origin_cell: c.origin_cell(),
                destination_cell: c.destination_cell(),
                drag: c.drag_state(),
                arrived: c.has_arrived(),
            })
            .collect();
        SceneSnapshot {
            bucket: self.bucket.rect(),
            containers,
            pieces,
            active_drags: self.drags.len(),
        }
    }
}

impl Drop for SceneCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for SceneCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneCoordinator")
            .field("presenters", &self.presenters.len())
            .field("controllers", &self.controllers.len())
            .field("drags", &self.drags.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
