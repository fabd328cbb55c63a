#![forbid(unsafe_code)]

//! Horizontal flow of container footprints.

use fractile_core::geometry::{Point, Rect, Size};

/// Lays children left to right with fixed spacing, each vertically centred,
/// the whole row centred on `anchor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowLayout {
    spacing: f64,
    anchor: Point,
}

impl FlowLayout {
    #[must_use]
    pub const fn new(spacing: f64, anchor: Point) -> Self {
        Self { spacing, anchor }
    }

    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    #[must_use]
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Scene rectangle for each of `sizes`, in order.
    #[must_use]
    pub fn place(&self, sizes: &[Size]) -> Vec<Rect> {
        if sizes.is_empty() {
            return Vec::new();
        }
        let gaps = self.spacing * (sizes.len() - 1) as f64;
        let row_width: f64 = sizes.iter().map(|s| s.width).sum::<f64>() + gaps;
        let mut x = self.anchor.x - row_width / 2.0;
        sizes
            .iter()
            .map(|size| {
                let top = self.anchor.y - size.height / 2.0;
                let rect = Rect::new(x, top, size.width, size.height);
                x += size.width + self.spacing;
                rect
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_child_is_centred_on_anchor() {
        let flow = FlowLayout::new(10.0, Point::new(0.0, -150.0));
        let rects = flow.place(&[Size::new(50.0, 200.0)]);
        assert_eq!(rects, vec![Rect::new(-25.0, -250.0, 50.0, 200.0)]);
        assert_eq!(rects[0].center(), Point::new(0.0, -150.0));
    }

    #[test]
    fn children_are_spaced_and_vertically_centred() {
        let flow = FlowLayout::new(10.0, Point::ORIGIN);
        let rects = flow.place(&[Size::new(50.0, 200.0), Size::new(120.0, 120.0)]);
        // Row width 50 + 10 + 120 = 180.
        assert_eq!(rects[0], Rect::new(-90.0, -100.0, 50.0, 200.0));
        assert_eq!(rects[1], Rect::new(-30.0, -60.0, 120.0, 120.0));
    }

    #[test]
    fn empty_row() {
        assert!(FlowLayout::new(10.0, Point::ORIGIN).place(&[]).is_empty());
    }
}
