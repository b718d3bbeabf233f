use rand::{Rng, seq::IndexedRandom};
use tracing::trace;

use crate::{
    problem::node::NodeIdx,
    solver::{search_context::SearchContext, solution::working_solution::WorkingSolution},
};

/// Removes `ceil(fraction * assigned)` randomly chosen stops from their routes.
///
/// A removal that would leave its route infeasible is skipped, which happens
/// when travel times break the triangle inequality. Returns the removed stops
/// in the order they were drawn.
pub fn ruin_random<R>(
    context: &SearchContext,
    solution: &mut WorkingSolution,
    fraction: f64,
    rng: &mut R,
) -> Vec<NodeIdx>
where
    R: Rng,
{
    let assigned = solution.assigned();
    let amount = ((assigned.len() as f64) * fraction.clamp(0.0, 1.0)).ceil() as usize;

    let mut removed = Vec::with_capacity(amount);

    for &node in assigned.choose_multiple(rng, amount) {
        let Some(route_id) = solution.route_of(node) else {
            continue;
        };

        let stops = solution
            .route(route_id)
            .stops()
            .iter()
            .copied()
            .filter(|&stop| stop != node)
            .collect::<Vec<_>>();

        let Some(cost) = context.evaluate_route(&stops) else {
            trace!("Keeping {node}, its route is infeasible without it");
            continue;
        };

        solution.replace_route(route_id, stops, cost);
        solution.mark_unassigned(node);
        removed.push(node);
    }

    removed
}
