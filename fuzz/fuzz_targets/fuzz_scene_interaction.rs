#![no_main]

use std::rc::Rc;
use std::time::Duration;

use arbitrary::Arbitrary;
use fractile_core::event::{PointerEvent, PointerEventKind, PointerId};
use fractile_core::geometry::Point;
use fractile_model::{CellModel, FractionModel, PieceRef};
use fractile_scene::{PieceView, SceneCoordinator};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Pointer { kind: u8, pointer: u8, x: i16, y: i16 },
    Step { millis: u8 },
    SetDenominator(u8),
    SetContainers(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    circular: bool,
    containers: u8,
    denominator: u8,
    ops: Vec<Op>,
}

struct NullView;

impl PieceView for NullView {
    fn set_midpoint(&mut self, _midpoint: Point) {}
}

fuzz_target!(|input: Input| {
    let containers = usize::from(input.containers % 6) + 1;
    let denominator = usize::from(input.denominator % 8) + 1;
    let model = Rc::new(FractionModel::new(containers, denominator).unwrap());
    let builder = SceneCoordinator::builder(Rc::clone(&model))
        .piece_factory(|_: &PieceRef| -> Box<dyn PieceView> { Box::new(NullView) });
    let builder = if input.circular {
        builder.circular()
    } else {
        builder.rectangular()
    };
    let mut scene = builder.build().unwrap();

    for op in input.ops.iter().take(256) {
        match *op {
            Op::Pointer { kind, pointer, x, y } => {
                let kind = match kind % 4 {
                    0 => PointerEventKind::Down,
                    1 => PointerEventKind::Move,
                    2 => PointerEventKind::Up,
                    _ => PointerEventKind::Cancel,
                };
                let event = PointerEvent::new(kind, Point::new(f64::from(x), f64::from(y)))
                    .with_pointer(PointerId(u32::from(pointer % 3)));
                scene.handle_pointer(event).unwrap();
            }
            Op::Step { millis } => {
                scene.step(Duration::from_millis(u64::from(millis))).unwrap();
            }
            Op::SetDenominator(n) => {
                let _ = model.set_denominator(usize::from(n % 10));
            }
            Op::SetContainers(n) => {
                let _ = model.set_container_count(usize::from(n % 8));
            }
        }
    }
    scene.reconcile().unwrap();

    // Post-conditions that must always hold:
    for container in model.containers().snapshot() {
        let presenter = scene
            .presenter(container.id())
            .expect("container without presenter");
        assert_eq!(presenter.generation(), container.generation());
        assert_eq!(presenter.slot_count(), container.cell_count().get());
        let appearing = container
            .cells()
            .iter()
            .filter(|c| c.appears_filled().get())
            .count();
        assert_eq!(container.filled_count().get(), appearing);
    }
    for piece in model.pieces().snapshot() {
        let controller = scene.controller(piece.id()).expect("piece without controller");
        if let Some(key) = controller.destination_cell() {
            let presenter = scene.presenter(key.container).expect("dangling destination");
            assert_eq!(presenter.generation(), key.generation, "stale destination");
        }
    }
    assert_eq!(scene.presenters().count(), model.containers().len());
    assert_eq!(scene.controllers().count(), model.pieces().len());
});
