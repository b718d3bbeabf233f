use crate::{
    problem::node::NodeIdx,
    solver::{
        ls::{
            insert_unassigned::InsertUnassignedOperator, inter_relocate::InterRelocateOperator,
            inter_swap::InterSwapOperator, inter_two_opt_star::InterTwoOptStarOperator,
            relocate::RelocateOperator, swap::SwapOperator, two_opt::TwoOptOperator,
        },
        score::Score,
        search_context::{RouteCost, SearchContext},
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// New stop sequence for one route touched by a move.
pub type RouteUpdate = (RouteIdx, Vec<NodeIdx>);

pub trait LocalSearchOperator: Sized {
    /// Calls `consumer` with every move of this kind between the two routes.
    /// Intra-route operators only act when both routes are the same.
    fn generate_moves<C>(solution: &WorkingSolution, pair: (RouteIdx, RouteIdx), consumer: C)
    where
        C: FnMut(Self);

    /// Routes changed by the move along with their new stops.
    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate>;

    /// Stop taken out of the unassigned list by the move, if any.
    fn inserted_node(&self) -> Option<NodeIdx> {
        None
    }
}

/// Feasible move ready to be applied.
#[derive(Debug)]
pub struct MoveEvaluation {
    pub delta: Score,
    pub routes: Vec<(RouteIdx, Vec<NodeIdx>, RouteCost)>,
    pub inserted_node: Option<NodeIdx>,
}

/// Evaluates the routes produced by a move against the current solution.
///
/// The soft delta is measured on augmented costs, so penalized arcs count.
/// Returns `None` if any new route is infeasible.
pub fn evaluate_updates(
    context: &SearchContext,
    solution: &WorkingSolution,
    updates: Vec<RouteUpdate>,
    inserted_node: Option<NodeIdx>,
) -> Option<MoveEvaluation> {
    let used_before = solution.non_empty_routes_count();
    let mut used_after = used_before;
    let mut soft_delta = 0.0;
    let mut routes = Vec::with_capacity(updates.len());

    for (route_id, stops) in updates {
        let cost = context.evaluate_route(&stops)?;
        let current = solution.route(route_id);

        soft_delta += cost.augmented_cost - current.cost().augmented_cost;

        match (current.is_empty(), stops.is_empty()) {
            (true, false) => used_after += 1,
            (false, true) => used_after -= 1,
            _ => {}
        }

        routes.push((route_id, stops, cost));
    }

    let policy = context.policy();
    soft_delta += policy.fleet_cost(used_after) - policy.fleet_cost(used_before);

    let hard_delta = if inserted_node.is_some() { -1.0 } else { 0.0 };

    Some(MoveEvaluation {
        delta: Score::new(hard_delta, soft_delta),
        routes,
        inserted_node,
    })
}

impl MoveEvaluation {
    pub fn apply(self, solution: &mut WorkingSolution) {
        for (route_id, stops, cost) in self.routes {
            solution.replace_route(route_id, stops, cost);
        }

        if let Some(node) = self.inserted_node {
            solution.mark_assigned(node);
        }
    }
}

#[derive(Debug, Clone)]
pub enum LocalSearchMove {
    /// Moves one stop to another position of its route.
    Relocate(RelocateOperator),

    /// Exchanges two stops of the same route.
    Swap(SwapOperator),

    /// Reverses a segment of a route.
    TwoOpt(TwoOptOperator),

    /// Moves one stop to another route.
    InterRelocate(InterRelocateOperator),

    /// Exchanges two stops of different routes.
    InterSwap(InterSwapOperator),

    /// Exchanges the tails of two routes.
    InterTwoOptStar(InterTwoOptStarOperator),

    /// Places an unassigned stop on a route.
    InsertUnassigned(InsertUnassignedOperator),
}

impl LocalSearchMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            LocalSearchMove::Relocate(_) => "Relocate",
            LocalSearchMove::Swap(_) => "Swap",
            LocalSearchMove::TwoOpt(_) => "Two-Opt",
            LocalSearchMove::InterRelocate(_) => "Inter-Relocate",
            LocalSearchMove::InterSwap(_) => "Inter-Swap",
            LocalSearchMove::InterTwoOptStar(_) => "Inter-2-Opt*",
            LocalSearchMove::InsertUnassigned(_) => "Insert-Unassigned",
        }
    }

    pub fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        match self {
            LocalSearchMove::Relocate(op) => op.updated_routes(solution),
            LocalSearchMove::Swap(op) => op.updated_routes(solution),
            LocalSearchMove::TwoOpt(op) => op.updated_routes(solution),
            LocalSearchMove::InterRelocate(op) => op.updated_routes(solution),
            LocalSearchMove::InterSwap(op) => op.updated_routes(solution),
            LocalSearchMove::InterTwoOptStar(op) => op.updated_routes(solution),
            LocalSearchMove::InsertUnassigned(op) => op.updated_routes(solution),
        }
    }

    pub fn inserted_node(&self) -> Option<NodeIdx> {
        match self {
            LocalSearchMove::InsertUnassigned(op) => op.inserted_node(),
            _ => None,
        }
    }

    /// Routes the move reads and writes.
    pub fn route_ids(&self) -> Vec<RouteIdx> {
        match self {
            LocalSearchMove::Relocate(op) => vec![op.route_id()],
            LocalSearchMove::Swap(op) => vec![op.route_id()],
            LocalSearchMove::TwoOpt(op) => vec![op.route_id()],
            LocalSearchMove::InterRelocate(op) => vec![op.from_route_id(), op.to_route_id()],
            LocalSearchMove::InterSwap(op) => vec![op.first_route_id(), op.second_route_id()],
            LocalSearchMove::InterTwoOptStar(op) => {
                vec![op.first_route_id(), op.second_route_id()]
            }
            LocalSearchMove::InsertUnassigned(op) => vec![op.route_id()],
        }
    }

    pub fn evaluate(
        &self,
        context: &SearchContext,
        solution: &WorkingSolution,
    ) -> Option<MoveEvaluation> {
        evaluate_updates(
            context,
            solution,
            self.updated_routes(solution),
            self.inserted_node(),
        )
    }
}
