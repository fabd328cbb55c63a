//! Property-based invariant tests for geometry primitives.
//!
//! 1. Translation-only transforms preserve distances
//! 2. `inverse` undoes `apply` for invertible transforms
//! 3. `Rect::centered_at` is centered on its input

use fractile_core::geometry::{Affine, Point, Rect, Size, Vector};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -1_000.0f64..1_000.0
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn translation_preserves_distance(a in point(), b in point(), dx in coord(), dy in coord()) {
        let t = Affine::translation(Vector::new(dx, dy));
        let before = a.distance(b);
        let after = t.apply(a).distance(t.apply(b));
        prop_assert!((before - after).abs() < 1e-6);
    }

    #[test]
    fn inverse_round_trips(
        p in point(),
        sx in 0.1f64..10.0,
        sy in 0.1f64..10.0,
        angle in -3.2f64..3.2,
        dx in coord(),
        dy in coord(),
    ) {
        let t = Affine::scale(sx, sy)
            .then(Affine::rotation(angle))
            .then(Affine::translation(Vector::new(dx, dy)));
        let inv = t.inverse().expect("non-singular");
        let back = inv.apply(t.apply(p));
        prop_assert!(back.distance(p) < 1e-6, "{p:?} -> {back:?}");
    }

    #[test]
    fn centered_rect_center_matches(c in point(), w in 0.0f64..500.0, h in 0.0f64..500.0) {
        let rect = Rect::centered_at(c, Size::new(w, h));
        prop_assert!(rect.center().distance(c) < 1e-9);
        prop_assert!((rect.center_top().y - (c.y - h / 2.0)).abs() < 1e-9);
    }
}
