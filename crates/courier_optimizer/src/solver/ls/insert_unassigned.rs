use crate::{
    problem::node::NodeIdx,
    solver::{
        ls::r#move::{LocalSearchOperator, RouteUpdate},
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Places an unassigned stop at `position` of a route. Serving one more stop
/// always beats any cost change.
#[derive(Debug, Clone)]
pub struct InsertUnassignedOperator {
    params: InsertUnassignedOperatorParams,
}

#[derive(Debug, Clone)]
pub struct InsertUnassignedOperatorParams {
    pub route_id: RouteIdx,
    pub node: NodeIdx,
    pub position: usize,
}

impl InsertUnassignedOperator {
    pub fn new(params: InsertUnassignedOperatorParams) -> Self {
        InsertUnassignedOperator { params }
    }

    pub fn route_id(&self) -> RouteIdx {
        self.params.route_id
    }
}

impl LocalSearchOperator for InsertUnassignedOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        for &node in solution.unassigned() {
            for position in 0..=len {
                consumer(InsertUnassignedOperator::new(InsertUnassignedOperatorParams {
                    route_id: r1,
                    node,
                    position,
                }));
            }
        }
    }

    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        let mut stops = solution.route(self.params.route_id).stops().to_vec();
        stops.insert(self.params.position, self.params.node);

        vec![(self.params.route_id, stops)]
    }

    fn inserted_node(&self) -> Option<NodeIdx> {
        Some(self.params.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::cost_policy::CostPolicy,
        solver::{ls::r#move::evaluate_updates, score::Score, search_context::SearchContext},
        test_utils::{line_problem, line_problem_matrices, solution_with_routes},
    };

    #[test]
    fn test_inserting_wins_over_cost() {
        let problem = line_problem(&[(0, 86_400); 3], 1);
        let matrices = line_problem_matrices(&problem);
        let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
        let solution = solution_with_routes(&context, &[&[1, 2]]);
        assert_eq!(solution.unassigned(), &[NodeIdx::new(3)]);

        let op = InsertUnassignedOperator::new(InsertUnassignedOperatorParams {
            route_id: RouteIdx::new(0),
            node: NodeIdx::new(3),
            position: 0,
        });

        let evaluation = evaluate_updates(
            &context,
            &solution,
            op.updated_routes(&solution),
            op.inserted_node(),
        )
        .unwrap();

        assert_eq!(evaluation.delta.hard_score, -1.0);
        assert!(evaluation.delta.soft_score > 0.0);
        assert!(evaluation.delta.is_improvement());
        assert!(evaluation.delta < Score::ZERO);
    }
}
