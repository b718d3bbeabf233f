use courier_matrix_providers::distance_time_matrix::DistanceTimeMatrix;

use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::solver::SolveError,
};

/// Node-indexed arc distances and times, stored as flat row-major vectors.
///
/// Times are whole seconds and already include the per-stop service duration, so
/// `time(i, j)` is everything the time dimension accumulates along arc `i -> j`.
/// Arcs from a node to itself are free.
#[derive(Debug, Clone)]
pub struct TravelMatrices {
    size: usize,
    distances: Vec<f64>,
    times: Vec<i64>,
}

impl TravelMatrices {
    pub fn new(
        problem: &VehicleRoutingProblem,
        matrix: &DistanceTimeMatrix,
    ) -> Result<Self, SolveError> {
        let size = problem.node_count();
        let service_seconds = problem.service_duration().as_secs();

        let mut distances = Vec::with_capacity(size * size);
        let mut times = Vec::with_capacity(size * size);

        for (from_index, from) in problem.nodes().iter().enumerate() {
            for (to_index, to) in problem.nodes().iter().enumerate() {
                if from_index == to_index {
                    distances.push(0.0);
                    times.push(0);
                    continue;
                }

                let entry = matrix
                    .entry(&from.coordinate(), &to.coordinate())
                    .ok_or(SolveError::MissingMatrixEntry {
                        from: from.coordinate(),
                        to: to.coordinate(),
                    })?;

                distances.push(entry.distance_meters);
                times.push(entry.time_seconds.round() as i64 + service_seconds);
            }
        }

        Ok(TravelMatrices {
            size,
            distances,
            times,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn distance(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        self.distances[from.get() * self.size + to.get()]
    }

    #[inline(always)]
    pub fn time(&self, from: NodeIdx, to: NodeIdx) -> i64 {
        self.times[from.get() * self.size + to.get()]
    }
}
