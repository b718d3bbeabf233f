use crate::{
    problem::{
        cost_policy::CostPolicy,
        node::{DEPOT, NodeIdx},
        time_window::SECONDS_PER_DAY,
        travel_matrices::TravelMatrices,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::penalties::Penalties,
};

/// Cost of one vehicle route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteCost {
    /// Time the vehicle is back at the depot.
    pub end_time: i64,

    /// Cost under the policy, fleet cost excluded.
    pub cost: f64,

    /// `cost` plus the guided local search penalties of the route's arcs.
    pub augmented_cost: f64,
}

impl RouteCost {
    pub const EMPTY: RouteCost = RouteCost {
        end_time: 0,
        cost: 0.0,
        augmented_cost: 0.0,
    };
}

/// Everything needed to evaluate a route: problem, arc matrices, cost policy and
/// the current penalties.
pub struct SearchContext<'a> {
    problem: &'a VehicleRoutingProblem,
    matrices: &'a TravelMatrices,
    policy: CostPolicy,
    arc_costs: Vec<f64>,
    penalties: Penalties,
    lambda: f64,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        problem: &'a VehicleRoutingProblem,
        matrices: &'a TravelMatrices,
        policy: CostPolicy,
    ) -> Self {
        let size = matrices.size();
        let mut arc_costs = Vec::with_capacity(size * size);
        for from in 0..size {
            for to in 0..size {
                let (from, to) = (NodeIdx::new(from), NodeIdx::new(to));
                arc_costs.push(policy.arc_cost(matrices.distance(from, to), matrices.time(from, to)));
            }
        }

        SearchContext {
            problem,
            matrices,
            policy,
            arc_costs,
            penalties: Penalties::new(size),
            lambda: 0.0,
        }
    }

    pub fn problem(&self) -> &VehicleRoutingProblem {
        self.problem
    }

    pub fn matrices(&self) -> &TravelMatrices {
        self.matrices
    }

    pub fn policy(&self) -> &CostPolicy {
        &self.policy
    }

    #[inline(always)]
    pub fn arc_cost(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        self.arc_costs[from.get() * self.matrices.size() + to.get()]
    }

    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    pub fn penalties_mut(&mut self) -> &mut Penalties {
        &mut self.penalties
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn set_lambda(&mut self, lambda: f64) {
        self.lambda = lambda;
    }

    /// Evaluates a route visiting `stops` in order from and back to the depot.
    ///
    /// Returns `None` when a window is missed, the route ends past the day
    /// horizon or the policy's hop cap is exceeded. Vehicles wait when they
    /// arrive before a window opens.
    pub fn evaluate_route(&self, stops: &[NodeIdx]) -> Option<RouteCost> {
        if stops.is_empty() {
            return Some(RouteCost::EMPTY);
        }

        let hops = stops.len() + 1;
        if let Some(max_route_hops) = self.policy.max_route_hops()
            && hops > max_route_hops
        {
            return None;
        }

        let mut time = 0;
        let mut arc_cost = 0.0;
        let mut penalty = 0u64;
        let mut previous = DEPOT;

        for &node in stops {
            time += self.matrices.time(previous, node);

            let time_window = self.problem.time_window(node);
            if time > time_window.end() {
                return None;
            }
            time = time.max(time_window.start());

            arc_cost += self.arc_cost(previous, node);
            penalty += u64::from(self.penalties.get(previous, node));
            previous = node;
        }

        time += self.matrices.time(previous, DEPOT);
        if time > SECONDS_PER_DAY {
            return None;
        }

        arc_cost += self.arc_cost(previous, DEPOT);
        penalty += u64::from(self.penalties.get(previous, DEPOT));

        let cost = arc_cost + self.policy.route_cost(time, hops);

        Some(RouteCost {
            end_time: time,
            cost,
            augmented_cost: cost + self.lambda * penalty as f64,
        })
    }

    /// Service start of every stop, then the time back at the depot.
    pub fn schedule(&self, stops: &[NodeIdx]) -> (Vec<i64>, i64) {
        let mut arrivals = Vec::with_capacity(stops.len());
        let mut time = 0;
        let mut previous = DEPOT;

        for &node in stops {
            time += self.matrices.time(previous, node);
            time = time.max(self.problem.time_window(node).start());
            arrivals.push(time);
            previous = node;
        }

        if !stops.is_empty() {
            time += self.matrices.time(previous, DEPOT);
        }

        (arrivals, time)
    }
}
