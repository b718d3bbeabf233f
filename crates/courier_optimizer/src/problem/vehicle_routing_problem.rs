use courier_matrix_providers::coordinate::Coordinate;
use jiff::SignedDuration;
use thiserror::Error;

use crate::problem::{
    node::{DEPOT, Node, NodeIdx},
    time_window::TimeWindow,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("A depot is required")]
    MissingDepot,

    #[error("At least one stop is required")]
    EmptyStops,

    #[error("A time window is required for every stop ({stops} stops, {time_windows} time windows)")]
    TimeWindowCountMismatch { stops: usize, time_windows: usize },

    #[error("At least one vehicle is required")]
    NoVehicles,

    #[error("The search time limit must be positive")]
    NonPositiveTimeLimit,

    #[error("The service duration cannot be negative")]
    NegativeServiceDuration,
}

/// Stops to visit from a single depot by a bounded fleet, each within its window.
///
/// Nodes keep the caller's order: node 0 is the depot and stop `k` is node `k + 1`.
#[derive(Debug, Clone)]
pub struct VehicleRoutingProblem {
    nodes: Vec<Node>,
    service_duration: SignedDuration,
    max_vehicles: usize,
    time_limit: SignedDuration,
}

impl VehicleRoutingProblem {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, index: NodeIdx) -> &Node {
        &self.nodes[index]
    }

    pub fn depot(&self) -> &Node {
        &self.nodes[DEPOT]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn stop_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Node indices of every stop, depot excluded.
    pub fn stops(&self) -> impl Iterator<Item = NodeIdx> {
        (1..self.nodes.len()).map(NodeIdx::new)
    }

    /// Node coordinates in node order, depot first.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.nodes.iter().map(Node::coordinate).collect()
    }

    #[inline]
    pub fn time_window(&self, index: NodeIdx) -> TimeWindow {
        self.nodes[index].time_window()
    }

    pub fn service_duration(&self) -> SignedDuration {
        self.service_duration
    }

    pub fn max_vehicles(&self) -> usize {
        self.max_vehicles
    }

    pub fn time_limit(&self) -> SignedDuration {
        self.time_limit
    }
}

#[derive(Default)]
pub struct VehicleRoutingProblemBuilder {
    depot: Option<Coordinate>,
    stops: Option<Vec<Coordinate>>,
    time_windows: Option<Vec<TimeWindow>>,
    service_duration: Option<SignedDuration>,
    max_vehicles: Option<usize>,
    time_limit: Option<SignedDuration>,
}

impl VehicleRoutingProblemBuilder {
    pub const DEFAULT_TIME_LIMIT: SignedDuration = SignedDuration::from_secs(120);

    pub fn set_depot(&mut self, depot: Coordinate) -> &mut VehicleRoutingProblemBuilder {
        self.depot = Some(depot);
        self
    }

    pub fn set_stops(&mut self, stops: Vec<Coordinate>) -> &mut VehicleRoutingProblemBuilder {
        self.stops = Some(stops);
        self
    }

    pub fn set_time_windows(
        &mut self,
        time_windows: Vec<TimeWindow>,
    ) -> &mut VehicleRoutingProblemBuilder {
        self.time_windows = Some(time_windows);
        self
    }

    pub fn set_service_duration(
        &mut self,
        service_duration: SignedDuration,
    ) -> &mut VehicleRoutingProblemBuilder {
        self.service_duration = Some(service_duration);
        self
    }

    /// Upper bound on the vehicles used. Defaults to one vehicle per stop.
    pub fn set_max_vehicles(&mut self, max_vehicles: usize) -> &mut VehicleRoutingProblemBuilder {
        self.max_vehicles = Some(max_vehicles);
        self
    }

    pub fn set_time_limit(&mut self, time_limit: SignedDuration) -> &mut VehicleRoutingProblemBuilder {
        self.time_limit = Some(time_limit);
        self
    }

    /// Checks the fields set so far, so a problem can be rejected before its
    /// coordinates are known. [`build`](Self::build) runs the same checks.
    pub fn validate(&self) -> Result<(), ProblemError> {
        if let Some(stops) = &self.stops
            && stops.is_empty()
        {
            return Err(ProblemError::EmptyStops);
        }

        if let Some(time_windows) = &self.time_windows {
            match &self.stops {
                Some(stops) if stops.len() != time_windows.len() => {
                    return Err(ProblemError::TimeWindowCountMismatch {
                        stops: stops.len(),
                        time_windows: time_windows.len(),
                    });
                }
                None if time_windows.is_empty() => return Err(ProblemError::EmptyStops),
                _ => {}
            }
        }

        if self.max_vehicles == Some(0) {
            return Err(ProblemError::NoVehicles);
        }

        if self.time_limit.is_some_and(|time_limit| !time_limit.is_positive()) {
            return Err(ProblemError::NonPositiveTimeLimit);
        }

        if self
            .service_duration
            .is_some_and(|service_duration| service_duration.is_negative())
        {
            return Err(ProblemError::NegativeServiceDuration);
        }

        Ok(())
    }

    pub fn build(self) -> Result<VehicleRoutingProblem, ProblemError> {
        self.validate()?;

        let VehicleRoutingProblemBuilder {
            depot,
            stops,
            time_windows,
            service_duration,
            max_vehicles,
            time_limit,
        } = self;
        let depot = depot.ok_or(ProblemError::MissingDepot)?;

        let stops = stops.unwrap_or_default();
        if stops.is_empty() {
            return Err(ProblemError::EmptyStops);
        }

        let time_windows = time_windows.unwrap_or_default();
        if time_windows.len() != stops.len() {
            return Err(ProblemError::TimeWindowCountMismatch {
                stops: stops.len(),
                time_windows: time_windows.len(),
            });
        }

        let max_vehicles = max_vehicles.unwrap_or(stops.len());
        let time_limit = time_limit.unwrap_or(Self::DEFAULT_TIME_LIMIT);
        let service_duration = service_duration.unwrap_or(SignedDuration::ZERO);

        let mut nodes = Vec::with_capacity(stops.len() + 1);
        nodes.push(Node::new(depot, TimeWindow::DEPOT));
        nodes.extend(
            stops
                .into_iter()
                .zip(time_windows)
                .map(|(coordinate, time_window)| Node::new(coordinate, time_window)),
        );

        Ok(VehicleRoutingProblem {
            nodes,
            service_duration,
            max_vehicles,
            time_limit,
        })
    }
}
