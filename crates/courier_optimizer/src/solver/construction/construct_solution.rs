use tracing::{Level, debug, instrument};

use crate::{
    problem::node::{DEPOT, NodeIdx},
    solver::{
        insertion::insert_nodes, search_context::SearchContext,
        solution::working_solution::WorkingSolution,
    },
};

/// Builds the first solution by cheapest insertion, most urgent stops first.
///
/// A stop is urgent when little slack remains between the earliest possible
/// arrival from the depot and the end of its window. Stops not reached before
/// `should_stop` returns true stay unassigned.
#[instrument(skip_all, level = Level::DEBUG)]
pub fn construct_solution<F>(context: &SearchContext, should_stop: F) -> WorkingSolution
where
    F: Fn() -> bool,
{
    let problem = context.problem();
    let stops = stops_by_urgency(context);

    let mut solution = WorkingSolution::new(problem.max_vehicles(), problem.stops());
    insert_nodes(context, &mut solution, &stops, should_stop);

    debug!(
        "Initial solution: {} routes, {} unassigned",
        solution.non_empty_routes_count(),
        solution.unassigned().len()
    );

    solution
}

fn stops_by_urgency(context: &SearchContext) -> Vec<NodeIdx> {
    let problem = context.problem();
    let matrices = context.matrices();

    let mut stops = problem.stops().collect::<Vec<_>>();
    stops.sort_by_key(|&node| {
        let slack = problem.time_window(node).end() - matrices.time(DEPOT, node);
        (slack, node)
    });

    stops
}
