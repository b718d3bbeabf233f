use tracing::trace;

use crate::{
    problem::node::NodeIdx,
    solver::{
        score::SCORE_EPSILON, search_context::SearchContext,
        solution::working_solution::WorkingSolution,
    },
};

/// Penalty weight derived from the first local optimum:
/// `coefficient * |cost| / arcs`.
///
/// Falls back to `coefficient` when that is not positive, e.g. when every arc
/// is free.
pub fn initial_lambda(coefficient: f64, context: &SearchContext, solution: &WorkingSolution) -> f64 {
    let arcs = solution.arcs().count();
    let cost = solution.score(context).soft_score.abs();

    let lambda = if arcs > 0 {
        coefficient * cost / arcs as f64
    } else {
        0.0
    };

    if lambda > 0.0 && lambda.is_finite() {
        lambda
    } else {
        coefficient.abs().max(1.0)
    }
}

/// Penalizes the arcs of `solution` with the highest utility
/// `arc_cost / (1 + penalty)`, then refreshes the cached route costs.
///
/// Returns the penalized arcs.
pub fn penalize(
    context: &mut SearchContext,
    solution: &mut WorkingSolution,
) -> Vec<(NodeIdx, NodeIdx)> {
    let utilities = solution
        .arcs()
        .map(|(from, to)| {
            let utility =
                context.arc_cost(from, to) / (1.0 + f64::from(context.penalties().get(from, to)));
            ((from, to), utility)
        })
        .collect::<Vec<_>>();

    let Some(max_utility) = utilities
        .iter()
        .map(|&(_, utility)| utility)
        .max_by(f64::total_cmp)
    else {
        return vec![];
    };

    let penalized = utilities
        .into_iter()
        .filter(|&(_, utility)| max_utility - utility <= SCORE_EPSILON)
        .map(|(arc, _)| arc)
        .collect::<Vec<_>>();

    for &(from, to) in &penalized {
        trace!("Penalizing {from} -> {to}");
        context.penalties_mut().increment(from, to);
    }

    solution.refresh(context);

    penalized
}
