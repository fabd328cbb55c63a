#![forbid(unsafe_code)]

//! The reservoir pieces come from and return to.

use fractile_core::geometry::{Point, Rect};

use crate::config::BucketConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    rect: Rect,
}

impl Bucket {
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    #[must_use]
    pub fn from_config(config: &BucketConfig) -> Self {
        Self::new(Rect::centered_at(config.center, config.size))
    }

    /// Scene bounds.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Where returning pieces aim: the middle of the top edge.
    #[must_use]
    pub fn reference_point(&self) -> Point {
        self.rect.center_top()
    }

    #[must_use]
    pub fn contains(&self, scene: Point) -> bool {
        self.rect.contains(scene)
    }
}
