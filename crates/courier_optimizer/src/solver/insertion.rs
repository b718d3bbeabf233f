use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{Level, debug, instrument, trace};

use crate::{
    problem::node::NodeIdx,
    solver::{
        search_context::{RouteCost, SearchContext},
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Cheapest feasible position for a stop.
#[derive(Debug, Clone)]
pub struct Insertion {
    pub node: NodeIdx,
    pub route_id: RouteIdx,
    pub position: usize,
    pub stops: Vec<NodeIdx>,
    pub cost: RouteCost,
    pub delta: f64,
}

fn best_insertion_in_route(
    context: &SearchContext,
    solution: &WorkingSolution,
    route_id: RouteIdx,
    node: NodeIdx,
) -> Option<Insertion> {
    let route = solution.route(route_id);
    let fleet_delta = if route.is_empty() {
        let used = solution.non_empty_routes_count();
        context.policy().fleet_cost(used + 1) - context.policy().fleet_cost(used)
    } else {
        0.0
    };

    let mut candidate = Vec::with_capacity(route.len() + 1);
    let mut best: Option<(usize, RouteCost, f64)> = None;

    for position in 0..=route.len() {
        candidate.clear();
        candidate.extend_from_slice(&route.stops()[..position]);
        candidate.push(node);
        candidate.extend_from_slice(&route.stops()[position..]);

        let Some(cost) = context.evaluate_route(&candidate) else {
            continue;
        };

        let delta = cost.augmented_cost - route.cost().augmented_cost + fleet_delta;
        if best.is_none_or(|(_, _, best_delta)| delta < best_delta) {
            best = Some((position, cost, delta));
        }
    }

    best.map(|(position, cost, delta)| {
        let mut stops = route.stops().to_vec();
        stops.insert(position, node);

        Insertion {
            node,
            route_id,
            position,
            stops,
            cost,
            delta,
        }
    })
}

/// Cheapest feasible insertion of `node` over every candidate route.
///
/// Routes are searched in parallel; ties go to the lowest route, then the
/// earliest position.
pub fn best_insertion(
    context: &SearchContext,
    solution: &WorkingSolution,
    node: NodeIdx,
) -> Option<Insertion> {
    let candidates = solution.candidate_routes();

    candidates
        .par_iter()
        .map(|&route_id| best_insertion_in_route(context, solution, route_id, node))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .reduce(|best, insertion| {
            if insertion.delta < best.delta {
                insertion
            } else {
                best
            }
        })
}

/// Inserts `nodes` one after the other at their cheapest feasible position.
/// Stops without any feasible position stay unassigned.
///
/// `should_stop` is checked before every stop; once it returns true the
/// remaining stops are left unassigned.
#[instrument(skip_all, level = Level::DEBUG)]
pub fn insert_nodes<F>(
    context: &SearchContext,
    solution: &mut WorkingSolution,
    nodes: &[NodeIdx],
    should_stop: F,
) where
    F: Fn() -> bool,
{
    for (index, &node) in nodes.iter().enumerate() {
        if should_stop() {
            debug!("Insertion interrupted, {} stops left", nodes.len() - index);
            for &node in &nodes[index..] {
                solution.mark_unassigned(node);
            }
            return;
        }

        match best_insertion(context, solution, node) {
            Some(insertion) => {
                trace!(
                    "Inserting {} in route {} at {}",
                    insertion.node, insertion.route_id, insertion.position
                );
                solution.replace_route(insertion.route_id, insertion.stops, insertion.cost);
                solution.mark_assigned(node);
            }
            None => {
                trace!("No feasible insertion for {node}");
                solution.mark_unassigned(node);
            }
        }
    }
}
