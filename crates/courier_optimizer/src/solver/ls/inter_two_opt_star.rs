use crate::solver::{
    ls::r#move::{LocalSearchOperator, RouteUpdate},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Inter-Route 2-Opt\* (Two-Opt Star)**
///
/// Cuts both routes and exchanges their tails. `first_cut` and `second_cut`
/// are the lengths of the heads that stay in place.
///
/// ```text
/// BEFORE (Routes Cross):
///    R1: [Head A] --x--> [Tail A]
///                    \ /
///                     X
///                    / \
///    R2: [Head B] --x--> [Tail B]
///
/// AFTER:
///    R1: [Head A] -----> [Tail B]
///    R2: [Head B] -----> [Tail A]
/// ```
///
/// Tails keep their direction. A cut may take a whole route, which merges two
/// routes into one or splits a route into an empty vehicle.
#[derive(Debug, Clone)]
pub struct InterTwoOptStarOperator {
    params: InterTwoOptStarOperatorParams,
}

#[derive(Debug, Clone)]
pub struct InterTwoOptStarOperatorParams {
    pub first_route_id: RouteIdx,
    pub second_route_id: RouteIdx,
    pub first_cut: usize,
    pub second_cut: usize,
}

impl InterTwoOptStarOperator {
    pub fn new(params: InterTwoOptStarOperatorParams) -> Self {
        debug_assert_ne!(params.first_route_id, params.second_route_id);
        InterTwoOptStarOperator { params }
    }

    pub fn first_route_id(&self) -> RouteIdx {
        self.params.first_route_id
    }

    pub fn second_route_id(&self) -> RouteIdx {
        self.params.second_route_id
    }
}

impl LocalSearchOperator for InterTwoOptStarOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 >= r2 {
            return;
        }

        let first_len = solution.route(r1).len();
        let second_len = solution.route(r2).len();

        for first_cut in 0..=first_len {
            for second_cut in 0..=second_len {
                // Both cuts at the start or both at the end swap whole routes
                if (first_cut == 0 && second_cut == 0)
                    || (first_cut == first_len && second_cut == second_len)
                {
                    continue;
                }

                consumer(InterTwoOptStarOperator::new(InterTwoOptStarOperatorParams {
                    first_route_id: r1,
                    second_route_id: r2,
                    first_cut,
                    second_cut,
                }));
            }
        }
    }

    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        let first = solution.route(self.params.first_route_id).stops();
        let second = solution.route(self.params.second_route_id).stops();

        let (first_head, first_tail) = first.split_at(self.params.first_cut);
        let (second_head, second_tail) = second.split_at(self.params.second_cut);

        vec![
            (
                self.params.first_route_id,
                [first_head, second_tail].concat(),
            ),
            (
                self.params.second_route_id,
                [second_head, first_tail].concat(),
            ),
        ]
    }
}
