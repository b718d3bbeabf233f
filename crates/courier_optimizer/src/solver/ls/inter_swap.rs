use crate::solver::{
    ls::r#move::{LocalSearchOperator, RouteUpdate},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Inter-Route Swap**
///
/// Exchanges the stop at `first` in one route with the stop at `second` in another.
///
/// ```text
/// BEFORE:
///    R1: ... (A) -> [first] -> (B) ...
///    R2: ... (X) -> [second] -> (Y) ...
///
/// AFTER:
///    R1: ... (A) -> [second] -> (B) ...
///    R2: ... (X) -> [first] -> (Y) ...
/// ```
#[derive(Debug, Clone)]
pub struct InterSwapOperator {
    params: InterSwapOperatorParams,
}

#[derive(Debug, Clone)]
pub struct InterSwapOperatorParams {
    pub first_route_id: RouteIdx,
    pub second_route_id: RouteIdx,
    pub first: usize,
    pub second: usize,
}

impl InterSwapOperator {
    pub fn new(params: InterSwapOperatorParams) -> Self {
        debug_assert_ne!(params.first_route_id, params.second_route_id);
        InterSwapOperator { params }
    }

    pub fn first_route_id(&self) -> RouteIdx {
        self.params.first_route_id
    }

    pub fn second_route_id(&self) -> RouteIdx {
        self.params.second_route_id
    }
}

impl LocalSearchOperator for InterSwapOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        // Symmetric, one orientation per pair is enough
        if r1 >= r2 {
            return;
        }

        let first_len = solution.route(r1).len();
        let second_len = solution.route(r2).len();

        for first in 0..first_len {
            for second in 0..second_len {
                consumer(InterSwapOperator::new(InterSwapOperatorParams {
                    first_route_id: r1,
                    second_route_id: r2,
                    first,
                    second,
                }));
            }
        }
    }

    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        let mut first_stops = solution.route(self.params.first_route_id).stops().to_vec();
        let mut second_stops = solution.route(self.params.second_route_id).stops().to_vec();

        std::mem::swap(
            &mut first_stops[self.params.first],
            &mut second_stops[self.params.second],
        );

        vec![
            (self.params.first_route_id, first_stops),
            (self.params.second_route_id, second_stops),
        ]
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
    fn test_inter_swap() {
        let problem = line_problem(&[(0, 86_400); 4], 2);
        let matrices = line_problem_matrices(&problem);
        let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
        let solution = solution_with_routes(&context, &[&[1, 4], &[3, 2]]);

        let op = InterSwapOperator::new(InterSwapOperatorParams {
            first_route_id: RouteIdx::new(0),
            second_route_id: RouteIdx::new(1),
            first: 1,
            second: 1,
        });

        assert_eq!(
            op.updated_routes(&solution),
            vec![
                (RouteIdx::new(0), vec![NodeIdx::new(1), NodeIdx::new(2)]),
                (RouteIdx::new(1), vec![NodeIdx::new(3), NodeIdx::new(4)]),
            ]
        );
    }

    #[test]
    fn test_one_orientation_per_pair() {
        let problem = line_problem(&[(0, 86_400); 4], 2);
        let matrices = line_problem_matrices(&problem);
        let context = SearchContext::new(&problem, &matrices, CostPolicy::composite());
        let solution = solution_with_routes(&context, &[&[1, 4], &[3, 2]]);

        let mut count = 0;
        InterSwapOperator::generate_moves(&solution, (RouteIdx::new(1), RouteIdx::new(0)), |_| {
            count += 1
        });
        assert_eq!(count, 0);

        InterSwapOperator::generate_moves(&solution, (RouteIdx::new(0), RouteIdx::new(1)), |_| {
            count += 1
        });
        assert_eq!(count, 4);
    }
}
