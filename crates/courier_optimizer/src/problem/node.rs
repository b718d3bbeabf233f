use courier_matrix_providers::coordinate::Coordinate;
use serde::Serialize;

use crate::{define_index_newtype, problem::time_window::TimeWindow};

define_index_newtype!(NodeIdx, Node);

/// The depot is always the first node.
pub const DEPOT: NodeIdx = NodeIdx::new(0);

impl NodeIdx {
    pub fn is_depot(&self) -> bool {
        *self == DEPOT
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Node {
    coordinate: Coordinate,
    time_window: TimeWindow,
}

impl Node {
    pub fn new(coordinate: Coordinate, time_window: TimeWindow) -> Self {
        Node {
            coordinate,
            time_window,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }
}
