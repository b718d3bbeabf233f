use crate::solver::{
    ls::r#move::{LocalSearchOperator, RouteUpdate},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Intra-Route Relocate**
///
/// Removes the stop at `from` and inserts it at index `to` of the shortened route.
///
/// ```text
/// BEFORE:
///    Route: ... (A) -> [from] -> (C) ... (X) -> (Y) ...
///
/// AFTER:
///    Route: ... (A) -> (C) ... (X) -> [from] -> (Y) ...
///
/// Edges Removed: (A->from), (from->C), (X->Y)
/// Edges Added:   (A->C),    (X->from), (from->Y)
/// ```
#[derive(Debug, Clone)]
pub struct RelocateOperator {
    params: RelocateOperatorParams,
}

#[derive(Debug, Clone)]
pub struct RelocateOperatorParams {
    pub route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl RelocateOperator {
    pub fn new(params: RelocateOperatorParams) -> Self {
        debug_assert_ne!(params.from, params.to);
        RelocateOperator { params }
    }

    pub fn route_id(&self) -> RouteIdx {
        self.params.route_id
    }
}

impl LocalSearchOperator for RelocateOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        for from in 0..len {
            for to in 0..len {
                if from == to {
                    continue;
                }

                consumer(RelocateOperator::new(RelocateOperatorParams {
                    route_id: r1,
                    from,
                    to,
                }));
            }
        }
    }

    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        let mut stops = solution.route(self.params.route_id).stops().to_vec();
        let node = stops.remove(self.params.from);
        stops.insert(self.params.to, node);

        vec![(self.params.route_id, stops)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::{cost_policy::CostPolicy, node::NodeIdx},
        solver::search_context::SearchContext,
        test_utils::{line_problem, line_problem_matrices, solution_with_routes},
    };

    fn nodes(ids: &[usize]) -> Vec<NodeIdx> {
        ids.iter().copied().map(NodeIdx::new).collect()
    }

    #[test]
    fn test_relocate_forward_and_backward() {
        let problem = line_problem(&[(0, 86_400); 4], 1);
        let matrices = line_problem_matrices(&problem);
        let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
        let solution = solution_with_routes(&context, &[&[1, 2, 3, 4]]);

        let forward = RelocateOperator::new(RelocateOperatorParams {
            route_id: RouteIdx::new(0),
            from: 0,
            to: 2,
        });
        assert_eq!(
            forward.updated_routes(&solution),
            vec![(RouteIdx::new(0), nodes(&[2, 3, 1, 4]))]
        );

        let backward = RelocateOperator::new(RelocateOperatorParams {
            route_id: RouteIdx::new(0),
            from: 3,
            to: 0,
        });
        assert_eq!(
            backward.updated_routes(&solution),
            vec![(RouteIdx::new(0), nodes(&[4, 1, 2, 3]))]
        );
    }

    #[test]
    fn test_generate_moves_skips_identity_and_other_routes() {
        let problem = line_problem(&[(0, 86_400); 3], 2);
        let matrices = line_problem_matrices(&problem);
        let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
        let solution = solution_with_routes(&context, &[&[1, 2, 3]]);

        let mut count = 0;
        RelocateOperator::generate_moves(&solution, (RouteIdx::new(0), RouteIdx::new(0)), |_| {
            count += 1
        });
        assert_eq!(count, 6);

        RelocateOperator::generate_moves(&solution, (RouteIdx::new(0), RouteIdx::new(1)), |_| {
            panic!("relocate is intra-route")
        });
    }
}
