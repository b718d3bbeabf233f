use crate::solver::{
    ls::r#move::{LocalSearchOperator, RouteUpdate},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Intra-Route Swap**
///
/// Exchanges the stops at `first` and `second` in the same route.
///
/// ```text
/// BEFORE:
///    ... (A) -> [first] -> (B) ... (C) -> [second] -> (D) ...
///
/// AFTER:
///    ... (A) -> [second] -> (B) ... (C) -> [first] -> (D) ...
/// ```
#[derive(Debug, Clone)]
pub struct SwapOperator {
    params: SwapOperatorParams,
}

#[derive(Debug, Clone)]
pub struct SwapOperatorParams {
    pub route_id: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl SwapOperator {
    pub fn new(params: SwapOperatorParams) -> Self {
        debug_assert!(params.first < params.second);
        SwapOperator { params }
    }

    pub fn route_id(&self) -> RouteIdx {
        self.params.route_id
    }
}

impl LocalSearchOperator for SwapOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        for first in 0..len {
            for second in (first + 1)..len {
                consumer(SwapOperator::new(SwapOperatorParams {
                    route_id: r1,
                    first,
                    second,
                }));
            }
        }
    }

    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        let mut stops = solution.route(self.params.route_id).stops().to_vec();
        stops.swap(self.params.first, self.params.second);

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

    #[test]
    fn test_swap() {
        let problem = line_problem(&[(0, 86_400); 4], 1);
        let matrices = line_problem_matrices(&problem);
        let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
        let solution = solution_with_routes(&context, &[&[1, 2, 3, 4]]);

        let op = SwapOperator::new(SwapOperatorParams {
            route_id: RouteIdx::new(0),
            first: 0,
            second: 3,
        });

        assert_eq!(
            op.updated_routes(&solution),
            vec![(
                RouteIdx::new(0),
                vec![
                    NodeIdx::new(4),
                    NodeIdx::new(2),
                    NodeIdx::new(3),
                    NodeIdx::new(1)
                ]
            )]
        );
    }

    #[test]
    fn test_generate_moves() {
        let problem = line_problem(&[(0, 86_400); 4], 1);
        let matrices = line_problem_matrices(&problem);
        let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
        let solution = solution_with_routes(&context, &[&[1, 2, 3, 4]]);

        let mut pairs = vec![];
        SwapOperator::generate_moves(&solution, (RouteIdx::new(0), RouteIdx::new(0)), |op| {
            pairs.push((op.params.first, op.params.second))
        });

        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(first, second)| first < second));
    }
}
