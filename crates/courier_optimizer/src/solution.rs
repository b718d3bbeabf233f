use courier_matrix_providers::coordinate::Coordinate;
use serde::Serialize;

use crate::{
    problem::node::{DEPOT, NodeIdx},
    solver::{search_context::SearchContext, solution::working_solution::WorkingSolution},
};

/// One node of a vehicle route and the time service starts there, in seconds
/// since midnight.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Visit {
    /// Node index: `0` is the depot, stop `k` of the input is node `k + 1`.
    pub node: NodeIdx,
    pub coordinate: Coordinate,
    pub arrival: i64,
}

/// Visits of one vehicle, from the start depot back to the end depot.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VehicleRoute {
    pub vehicle: usize,
    pub visits: Vec<Visit>,
}

impl VehicleRoute {
    /// Visits between the two depot visits.
    pub fn stops(&self) -> &[Visit] {
        let len = self.visits.len();
        if len < 2 {
            return &[];
        }

        &self.visits[1..len - 1]
    }

    pub fn end_time(&self) -> i64 {
        self.visits.last().map_or(0, |visit| visit.arrival)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Solution {
    pub routes: Vec<VehicleRoute>,

    /// Cost under the configured policy.
    pub cost: f64,
}

impl Solution {
    pub(crate) fn from_working_solution(context: &SearchContext, solution: &WorkingSolution) -> Self {
        let problem = context.problem();
        let depot = problem.depot().coordinate();

        let routes = solution
            .routes()
            .iter()
            .enumerate()
            .filter(|(_, route)| !route.is_empty())
            .map(|(vehicle, route)| {
                let (arrivals, end_time) = context.schedule(route.stops());

                let mut visits = Vec::with_capacity(route.len() + 2);
                visits.push(Visit {
                    node: DEPOT,
                    coordinate: depot,
                    arrival: 0,
                });
                visits.extend(route.stops().iter().zip(arrivals).map(|(&node, arrival)| {
                    Visit {
                        node,
                        coordinate: problem.node(node).coordinate(),
                        arrival,
                    }
                }));
                visits.push(Visit {
                    node: DEPOT,
                    coordinate: depot,
                    arrival: end_time,
                });

                VehicleRoute { vehicle, visits }
            })
            .collect();

        Solution {
            routes,
            cost: solution.score(context).soft_score,
        }
    }

    /// Number of stops served over all routes.
    pub fn stop_count(&self) -> usize {
        self.routes.iter().map(|route| route.stops().len()).sum()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", content = "solution", rename_all = "snake_case")]
pub enum SolveOutcome {
    Solved(Solution),

    /// The best assignment found still leaves stops unvisited.
    NoSolution,
}

impl SolveOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            SolveOutcome::NoSolution => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }
}
