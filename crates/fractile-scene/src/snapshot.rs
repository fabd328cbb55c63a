#![forbid(unsafe_code)]

//! Serializable picture of a scene for debugging and golden tests.

use fractile_core::geometry::{Point, Rect, Size};
use fractile_model::{CellKey, ContainerId, PieceId};
use serde::{Deserialize, Serialize};

use crate::piece_controller::DragState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub bucket: Rect,
    pub containers: Vec<ContainerSnapshot>,
    pub pieces: Vec<PieceSnapshot>,
    pub active_drags: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub id: ContainerId,
    pub layout: String,
    pub origin: Point,
    pub footprint: Size,
    pub generation: u64,
    /// Slot visibility in index order.
    pub visible: Vec<bool>,
    pub outlined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub midpoint: Point,
    pub origin: Point,
    pub destination: Point,
    pub origin_cell: Option<CellKey>,
    pub destination_cell: Option<CellKey>,
    pub drag: DragState,
    pub arrived: bool,
}
