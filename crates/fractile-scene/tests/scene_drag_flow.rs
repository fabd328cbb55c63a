#![forbid(unsafe_code)]

//! End-to-end drag scenarios against an in-memory [`FractionModel`].
//!
//! Default config, rectangular containers (50x200). With one container the
//! container's top-left sits at (-25, -250); cell `i` of four has its
//! midpoint at (0, -75 - 50 i). The bucket spans (-150, 50)..(150, 150) and
//! returning pieces aim at (0, 50).
//!
//! Run:
//!   cargo test -p fractile-scene --test scene_drag_flow

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use fractile_core::event::{PointerEvent, PointerEventKind, PointerId};
use fractile_core::geometry::Point;
use fractile_core::reactive::ObservableList;
use fractile_model::{
    CellKey, CellModel, CellRef, ContainerRef, FractionModel, ModelError, PieceRef,
};
use fractile_scene::{
    DragState, DropTarget, MotionConfig, PieceView, SceneConfig, SceneCoordinator, SceneError,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

const FRAME: Duration = Duration::from_millis(16);

/// Delegates to [`FractionModel`] and records `target_piece_to_cell` calls.
struct RecordingModel {
    inner: FractionModel,
    targeted: RefCell<Vec<CellKey>>,
}

impl RecordingModel {
    fn new(containers: usize, denominator: usize) -> Rc<Self> {
        Rc::new(Self {
            inner: FractionModel::new(containers, denominator).unwrap(),
            targeted: RefCell::new(Vec::new()),
        })
    }

    fn container(&self, n: usize) -> ContainerRef {
        self.inner.containers().snapshot()[n].clone()
    }

    fn cell(&self, container: usize, index: usize) -> CellRef {
        self.container(container).cell(index).unwrap()
    }
}

impl CellModel for RecordingModel {
    fn containers(&self) -> &ObservableList<ContainerRef> {
        self.inner.containers()
    }

    fn pieces(&self) -> &ObservableList<PieceRef> {
        self.inner.pieces()
    }

    fn complete_piece(&self, piece: &PieceRef) {
        self.inner.complete_piece(piece);
    }

    fn grab_from_bucket(&self) -> PieceRef {
        self.inner.grab_from_bucket()
    }

    fn grab_cell(&self, cell: &CellRef) -> Result<PieceRef, ModelError> {
        self.inner.grab_cell(cell)
    }

    fn target_piece_to_cell(&self, piece: &PieceRef, cell: &CellRef) {
        self.targeted.borrow_mut().push(cell.key());
        self.inner.target_piece_to_cell(piece, cell);
    }
}

struct NullView;

impl PieceView for NullView {
    fn set_midpoint(&mut self, _midpoint: Point) {}
}

fn scene_for(model: &Rc<RecordingModel>, config: SceneConfig) -> SceneCoordinator {
    SceneCoordinator::builder(Rc::clone(model))
        .config(config)
        .rectangular()
        .piece_factory(|_: &PieceRef| -> Box<dyn PieceView> { Box::new(NullView) })
        .build()
        .unwrap()
}

fn scene(model: &Rc<RecordingModel>) -> SceneCoordinator {
    scene_for(model, SceneConfig::default())
}

fn close(a: Point, b: Point) -> bool {
    a.distance(b) < 1e-9
}

/// Step until every piece has landed.
fn settle(scene: &mut SceneCoordinator) {
    for _ in 0..600 {
        scene.step(FRAME).unwrap();
        if scene.controllers().next().is_none() {
            return;
        }
    }
    panic!("pieces never settled: {:?}", scene.snapshot());
}

/// Press in the bucket, carry to `to`, release there.
fn carry_from_bucket(scene: &mut SceneCoordinator, to: Point) -> Option<DropTarget> {
    scene
        .pointer_down(PointerEvent::down(Point::new(0.0, 100.0)))
        .unwrap()
        .expect("bucket press picks up a piece");
    assert!(scene.pointer_move(PointerEvent::moved(to)).unwrap());
    scene.pointer_up(PointerEvent::up(to)).unwrap()
}

// ============================================================================
// Drop resolution
// ============================================================================

#[test]
fn drop_near_cell_targets_it_once() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let cell = model.cell(0, 2);

    let outcome = carry_from_bucket(&mut scene, Point::new(5.0, -170.0));
    assert_eq!(outcome, Some(DropTarget::Cell { cell: cell.key() }));
    assert_eq!(*model.targeted.borrow(), vec![cell.key()]);

    let expected = scene.cell_midpoint_in_overlay_frame(&cell).unwrap();
    assert!(close(expected, Point::new(0.0, -175.0)));
    let controller = scene.controllers().next().unwrap();
    assert!(close(controller.destination(), expected));
    assert_eq!(controller.destination_cell(), Some(cell.key()));
    assert!(cell.is_filled().get());
    assert!(!cell.appears_filled().get());

    settle(&mut scene);
    assert!(cell.appears_filled().get());
    assert_eq!(model.inner.filled_total(), 1);
    assert!(scene.presenter(cell.container()).unwrap().slot_visible(2));
}

#[test]
fn filled_cell_falls_back_to_nearest_unfilled() {
    let model = RecordingModel::new(1, 4);
    model.inner.fill_cell(&model.cell(0, 2)).unwrap();
    let mut scene = scene(&model);

    // Cell 1 at (0, -125) is 45.3 away; cell 3 at (0, -225) is 55.2 away.
    let outcome = carry_from_bucket(&mut scene, Point::new(5.0, -170.0));
    assert_eq!(
        outcome,
        Some(DropTarget::Cell {
            cell: model.cell(0, 1).key()
        })
    );
}

#[test]
fn drop_out_of_range_returns_to_bucket() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);

    // Nearest cell (0, -225) is 125 away.
    let outcome = carry_from_bucket(&mut scene, Point::new(0.0, -350.0));
    assert_eq!(outcome, Some(DropTarget::Bucket));
    assert!(model.targeted.borrow().is_empty());
    let controller = scene.controllers().next().unwrap();
    assert!(close(controller.destination(), scene.bucket_point()));
    assert_eq!(controller.destination_cell(), None);

    settle(&mut scene);
    assert_eq!(model.inner.filled_total(), 0);
    assert!(model.inner.pieces().is_empty());
}

#[test]
fn round_trip_bucket_cell_bucket() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let cell = model.cell(0, 2);

    carry_from_bucket(&mut scene, Point::new(0.0, -175.0));
    settle(&mut scene);
    assert_eq!(model.inner.filled_total(), 1);

    // Press the filled cell: it empties and a piece starts there.
    let id = scene
        .pointer_down(PointerEvent::down(Point::new(0.0, -175.0)))
        .unwrap()
        .expect("filled cell press picks up a piece");
    assert!(!cell.is_filled().get());
    assert!(!scene.presenter(cell.container()).unwrap().slot_visible(2));
    let controller = scene.controller(id).unwrap();
    assert_eq!(controller.origin_cell(), Some(cell.key()));
    assert!(controller.is_user_controlled());

    scene
        .pointer_move(PointerEvent::moved(Point::new(0.0, 100.0)))
        .unwrap();
    let outcome = scene
        .pointer_up(PointerEvent::up(Point::new(0.0, 100.0)))
        .unwrap();
    assert_eq!(outcome, Some(DropTarget::Bucket));
    let controller = scene.controller(id).unwrap();
    assert_eq!(controller.destination_cell(), None);
    assert!(controller.piece().destination_cell().get().is_none());

    settle(&mut scene);
    assert_eq!(model.inner.filled_total(), 0);
    assert!(!model.cell(0, 2).is_filled().get());
}

#[test]
fn grab_offset_is_kept_through_the_drag() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let cell = model.cell(0, 0);
    model.inner.fill_cell(&cell).unwrap();

    // Press 10 right of the cell midpoint (0, -75).
    let id = scene
        .pointer_down(PointerEvent::down(Point::new(10.0, -75.0)))
        .unwrap()
        .unwrap();
    scene
        .pointer_move(PointerEvent::moved(Point::new(110.0, -75.0)))
        .unwrap();
    assert!(close(
        scene.controller(id).unwrap().midpoint(),
        Point::new(100.0, -75.0)
    ));
}

#[test]
fn exact_midpoint_drop_selects_that_cell() {
    for index in 0..4 {
        let model = RecordingModel::new(1, 4);
        let mut scene = scene(&model);
        let cell = model.cell(0, index);
        let at = scene.cell_midpoint_in_overlay_frame(&cell).unwrap();
        assert_eq!(
            carry_from_bucket(&mut scene, at),
            Some(DropTarget::Cell { cell: cell.key() }),
            "cell {index}"
        );
    }
}

#[test]
fn threshold_is_exclusive() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let probe = Point::new(0.0, 25.0); // exactly 100 below cell 0

    assert_eq!(scene.find_closest_cell(probe, Some(100.0)).unwrap(), None);
    assert_eq!(
        scene.find_closest_cell(probe, Some(100.5)).unwrap(),
        Some(model.cell(0, 0))
    );
    assert_eq!(
        scene.find_closest_cell(Point::new(0.0, 900.0), None).unwrap(),
        Some(model.cell(0, 0))
    );
}

#[test]
fn no_unfilled_cells_means_no_candidate() {
    let model = RecordingModel::new(1, 2);
    model.inner.fill_cell(&model.cell(0, 0)).unwrap();
    model.inner.fill_cell(&model.cell(0, 1)).unwrap();
    let mut scene = scene(&model);
    assert_eq!(scene.find_closest_cell(Point::ORIGIN, None).unwrap(), None);
}

#[test]
fn overlay_origin_shifts_every_overlay_point() {
    let model = RecordingModel::new(1, 4);
    let config = SceneConfig {
        overlay_origin: Point::new(100.0, 50.0),
        ..SceneConfig::default()
    };
    let mut scene = scene_for(&model, config);
    let cell = model.cell(0, 2);

    assert!(close(
        scene.cell_midpoint_in_overlay_frame(&cell).unwrap(),
        Point::new(-100.0, -225.0)
    ));
    assert!(close(scene.bucket_point(), Point::new(-100.0, 0.0)));
    assert_eq!(
        carry_from_bucket(&mut scene, Point::new(5.0, -170.0)),
        Some(DropTarget::Cell { cell: cell.key() })
    );
}

// ============================================================================
// Drag hints and pointers
// ============================================================================

#[test]
fn dragged_piece_is_hinted_toward_nearby_cell() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let id = scene
        .pointer_down(PointerEvent::down(Point::new(0.0, 100.0)))
        .unwrap()
        .unwrap();

    scene.step(FRAME).unwrap();
    assert_eq!(scene.controller(id).unwrap().hint(), None);

    scene
        .pointer_move(PointerEvent::moved(Point::new(5.0, -170.0)))
        .unwrap();
    scene.step(FRAME).unwrap();
    let hint = scene.controller(id).unwrap().hint().unwrap();
    assert!(close(hint, Point::new(0.0, -175.0)));
    // A held piece never lands on its own.
    assert!(!scene.controller(id).unwrap().has_arrived());
}

#[test]
fn hint_skips_filled_cells() {
    let model = RecordingModel::new(1, 4);
    model.inner.fill_cell(&model.cell(0, 2)).unwrap();
    let mut scene = scene(&model);
    let id = scene
        .pointer_down(PointerEvent::down(Point::new(0.0, 100.0)))
        .unwrap()
        .unwrap();

    scene
        .pointer_move(PointerEvent::moved(Point::new(5.0, -170.0)))
        .unwrap();
    scene.step(FRAME).unwrap();
    let hint = scene.controller(id).unwrap().hint().unwrap();
    assert!(close(hint, Point::new(0.0, -125.0)), "hint: {hint:?}");
}

#[test]
fn one_long_frame_lands_a_slow_piece() {
    let model = RecordingModel::new(1, 4);
    let config = SceneConfig {
        motion: MotionConfig {
            stiffness: 1.0,
            damping: 2.0,
        },
        ..SceneConfig::default()
    };
    let mut scene = scene_for(&model, config);

    // Released 10 units above the bucket point; out of range of every cell.
    let outcome = carry_from_bucket(&mut scene, Point::new(0.0, 60.0));
    assert_eq!(outcome, Some(DropTarget::Bucket));

    scene.step(Duration::from_secs(1)).unwrap();
    assert_eq!(scene.controllers().count(), 1);

    scene.step(Duration::from_secs(29)).unwrap();
    assert_eq!(scene.controllers().count(), 0);
    assert!(model.inner.pieces().is_empty());
}

#[test]
fn drag_is_bound_to_its_pointer() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let id = scene
        .pointer_down(PointerEvent::down(Point::new(0.0, 100.0)))
        .unwrap()
        .unwrap();
    let other = PointerId(7);

    let stray = PointerEvent::moved(Point::new(0.0, -200.0)).with_pointer(other);
    assert!(!scene.pointer_move(stray).unwrap());
    assert_eq!(scene.pointer_up(stray).unwrap(), None);
    assert_eq!(scene.dragged_piece(PointerId::MOUSE), Some(id));
    assert!(close(
        scene.controller(id).unwrap().midpoint(),
        Point::new(0.0, 100.0)
    ));
}

#[test]
fn two_pointers_drag_independently() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let touch = PointerId(2);
    let a = scene
        .pointer_down(PointerEvent::down(Point::new(-50.0, 100.0)))
        .unwrap()
        .unwrap();
    let b = scene
        .pointer_down(PointerEvent::down(Point::new(50.0, 100.0)).with_pointer(touch))
        .unwrap()
        .unwrap();
    assert_ne!(a, b);
    assert_eq!(scene.snapshot().active_drags, 2);

    scene
        .pointer_move(PointerEvent::moved(Point::new(50.0, 0.0)).with_pointer(touch))
        .unwrap();
    assert!(close(
        scene.controller(a).unwrap().midpoint(),
        Point::new(-50.0, 100.0)
    ));
    assert!(close(
        scene.controller(b).unwrap().midpoint(),
        Point::new(50.0, 0.0)
    ));
}

#[test]
fn cancel_releases_like_up() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    scene
        .handle_pointer(PointerEvent::down(Point::new(0.0, 100.0)))
        .unwrap();
    scene
        .handle_pointer(PointerEvent::moved(Point::new(5.0, -170.0)))
        .unwrap();
    let consumed = scene
        .handle_pointer(PointerEvent::new(
            PointerEventKind::Cancel,
            Point::new(5.0, -170.0),
        ))
        .unwrap();
    assert!(consumed);
    assert_eq!(scene.dragged_piece(PointerId::MOUSE), None);
    assert_eq!(*model.targeted.borrow(), vec![model.cell(0, 2).key()]);
    assert_eq!(
        scene.controllers().next().unwrap().drag_state(),
        DragState::Idle
    );
}

#[test]
fn press_outside_everything_is_ignored() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    assert!(
        !scene
            .handle_pointer(PointerEvent::down(Point::new(400.0, 400.0)))
            .unwrap()
    );
    // Unfilled cells do not start drags either.
    assert!(
        !scene
            .handle_pointer(PointerEvent::down(Point::new(0.0, -175.0)))
            .unwrap()
    );
    assert!(model.inner.pieces().is_empty());
}

#[test]
fn filled_cell_wins_over_overlapping_bucket() {
    let model = RecordingModel::new(1, 4);
    let cell = model.cell(0, 2);
    model.inner.fill_cell(&cell).unwrap();
    let mut config = SceneConfig::default();
    config.bucket.center = Point::new(0.0, -175.0);
    let mut scene = scene_for(&model, config);

    let from_cell = scene
        .pointer_down(PointerEvent::down(Point::new(0.0, -175.0)))
        .unwrap()
        .unwrap();
    assert_eq!(
        scene.controller(from_cell).unwrap().origin_cell(),
        Some(cell.key())
    );

    // Cell 1 is empty, so the same bucket area hands out a fresh piece.
    let from_bucket = scene
        .pointer_down(PointerEvent::down(Point::new(0.0, -130.0)).with_pointer(PointerId(3)))
        .unwrap()
        .unwrap();
    assert_eq!(scene.controller(from_bucket).unwrap().origin_cell(), None);
}

// ============================================================================
// Structural changes while pieces are in flight
// ============================================================================

#[test]
fn rebuild_mid_flight_redirects_to_bucket() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let old_cell = model.cell(0, 2);
    carry_from_bucket(&mut scene, Point::new(20.0, -120.0));
    scene.step(FRAME).unwrap();

    model.inner.set_denominator(3).unwrap();
    scene.step(FRAME).unwrap();

    let presenter = scene.presenter(old_cell.container()).unwrap();
    assert_eq!(presenter.slot_count(), 3);
    assert_eq!(presenter.generation(), 1);
    let controller = scene.controllers().next().unwrap();
    assert_eq!(controller.destination_cell(), None);
    assert!(close(controller.destination(), scene.bucket_point()));

    settle(&mut scene);
    assert_eq!(model.inner.filled_total(), 0);

    let press = PointerEvent::down(Point::new(0.0, -175.0));
    assert_eq!(
        scene.begin_cell_drag(&old_cell, press),
        Err(SceneError::StaleCell {
            cell: old_cell.key()
        })
    );
}

#[test]
fn removed_container_sends_its_pieces_home() {
    let model = RecordingModel::new(2, 4);
    let mut scene = scene(&model);
    let second = model.container(1);
    // Second container is centred at x = 30.
    let outcome = carry_from_bucket(&mut scene, Point::new(30.0, -170.0));
    assert_eq!(
        outcome,
        Some(DropTarget::Cell {
            cell: second.cell(2).unwrap().key()
        })
    );

    model.inner.remove_container(second.id()).unwrap();
    scene.step(FRAME).unwrap();
    assert!(scene.presenter(second.id()).is_none());
    let controller = scene.controllers().next().unwrap();
    assert!(close(controller.destination(), scene.bucket_point()));

    settle(&mut scene);
    assert_eq!(model.inner.filled_total(), 0);
    // The survivor is re-centred.
    assert!(close(
        scene.container_origin(model.container(0).id()).unwrap(),
        Point::new(-25.0, -250.0)
    ));
}

#[test]
fn added_container_reflows_pieces_in_flight() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    let cell = model.cell(0, 2);
    carry_from_bucket(&mut scene, Point::new(5.0, -170.0));

    model.inner.add_container().unwrap();
    scene.step(FRAME).unwrap();

    let moved = Point::new(-30.0, -175.0);
    assert!(close(scene.cell_midpoint_in_overlay_frame(&cell).unwrap(), moved));
    let controller = scene.controllers().next().unwrap();
    assert!(close(controller.destination(), moved));
    assert_eq!(controller.destination_cell(), Some(cell.key()));

    settle(&mut scene);
    assert!(cell.appears_filled().get());
}

// ============================================================================
// Construction and teardown
// ============================================================================

#[test]
fn builder_requires_a_container_factory() {
    let model = RecordingModel::new(1, 4);
    let err = SceneCoordinator::builder(Rc::clone(&model))
        .build()
        .unwrap_err();
    assert_eq!(err, SceneError::MissingContainerFactory);
}

#[test]
fn builder_rejects_invalid_config() {
    let model = RecordingModel::new(1, 4);
    let config = SceneConfig {
        drop_threshold: -1.0,
        ..SceneConfig::default()
    };
    let err = SceneCoordinator::builder(Rc::clone(&model))
        .config(config)
        .circular()
        .build()
        .unwrap_err();
    assert!(matches!(err, SceneError::InvalidConfig { ref errors } if errors.len() == 1));
}

#[test]
fn circular_scene_uses_wedges() {
    let model = RecordingModel::new(2, 3);
    let scene = SceneCoordinator::builder(Rc::clone(&model))
        .circular()
        .build()
        .unwrap();
    let snapshot = scene.snapshot();
    assert_eq!(snapshot.containers.len(), 2);
    for container in &snapshot.containers {
        assert_eq!(container.layout, "circular");
        assert_eq!(container.visible, vec![false; 3]);
    }
}

#[test]
fn custom_factory_picks_layout_per_container() {
    use fractile_scene::{CellLayout, CircularLayout, RectangularLayout};
    use fractile_core::geometry::Size;

    let model = RecordingModel::new(2, 2);
    let first = model.container(0).id();
    let scene = SceneCoordinator::builder(Rc::clone(&model))
        .container_factory(move |c: &ContainerRef| -> Rc<dyn CellLayout> {
            if c.id() == first {
                Rc::new(RectangularLayout::new(Size::new(40.0, 160.0)))
            } else {
                Rc::new(CircularLayout::new(50.0))
            }
        })
        .build()
        .unwrap();
    let layouts: Vec<_> = scene
        .snapshot()
        .containers
        .into_iter()
        .map(|c| c.layout)
        .collect();
    assert_eq!(layouts, ["rectangular", "circular"]);
}

#[test]
fn without_piece_factory_pieces_complete_at_once() {
    let model = RecordingModel::new(1, 4);
    let mut scene = SceneCoordinator::builder(Rc::clone(&model))
        .rectangular()
        .build()
        .unwrap();

    let picked = scene
        .pointer_down(PointerEvent::down(Point::new(0.0, 100.0)))
        .unwrap();
    assert!(picked.is_some());
    assert!(model.inner.pieces().is_empty());
    assert_eq!(scene.dragged_piece(PointerId::MOUSE), None);
    assert!(scene.controllers().next().is_none());
    scene.step(FRAME).unwrap();
}

#[test]
fn pieces_already_in_play_are_adopted() {
    let model = RecordingModel::new(1, 4);
    let cell = model.cell(0, 1);
    let piece = model.inner.grab_from_bucket();
    model.inner.target_piece_to_cell(&piece, &cell);

    let mut scene = scene(&model);
    let controller = scene.controller(piece.id()).unwrap();
    assert!(close(controller.origin(), scene.bucket_point()));
    assert!(close(controller.destination(), Point::new(0.0, -125.0)));

    settle(&mut scene);
    assert!(cell.appears_filled().get());
}

#[test]
fn dispose_releases_every_subscription() {
    let model = RecordingModel::new(2, 4);
    let container = model.container(0);
    let cell = model.cell(0, 0);
    let mut scene = scene(&model);
    carry_from_bucket(&mut scene, Point::new(-30.0, -75.0));
    assert!(model.inner.containers().listener_count() > 0);
    assert!(container.cell_count().live_subscriber_count() > 0);

    scene.dispose();
    scene.dispose();
    assert!(scene.is_disposed());
    assert_eq!(model.inner.containers().listener_count(), 0);
    assert_eq!(model.inner.pieces().listener_count(), 0);
    assert_eq!(container.cell_count().live_subscriber_count(), 0);
    assert_eq!(cell.appears_filled().live_subscriber_count(), 0);
    assert!(scene.controllers().next().is_none());
}

#[test]
fn dropping_the_scene_disposes_it() {
    let model = RecordingModel::new(1, 4);
    drop(scene(&model));
    assert_eq!(model.inner.containers().listener_count(), 0);
    assert_eq!(model.container(0).cell_count().live_subscriber_count(), 0);
}

#[test]
fn snapshot_serializes() {
    let model = RecordingModel::new(1, 4);
    let mut scene = scene(&model);
    carry_from_bucket(&mut scene, Point::new(5.0, -170.0));

    let json = serde_json::to_value(scene.snapshot()).unwrap();
    assert_eq!(json["containers"][0]["layout"], "rectangular");
    assert_eq!(json["containers"][0]["visible"].as_array().unwrap().len(), 4);
    assert_eq!(json["pieces"][0]["drag"]["state"], "idle");
    assert_eq!(json["active_drags"], 0);
}
