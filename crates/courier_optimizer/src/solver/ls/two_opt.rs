use crate::solver::{
    ls::r#move::{LocalSearchOperator, RouteUpdate},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Intra-Route 2-Opt**
///
/// Reverses the stops between `from` and `to` (inclusive), which removes a
/// crossing inside one route.
///
/// ```text
/// BEFORE:
///    ... (prev) --x--> [from] -> ... -> [to] --x--> (next) ...
///
/// AFTER:
///    ... (prev) -----> [to] -> ... -> [from] -----> (next) ...
///
/// Edges Removed: (prev->from), (to->next)
/// Edges Added:   (prev->to),   (from->next)
/// ```
///
/// Travel times need not be symmetric, so the reversed segment is always
/// re-evaluated in full.
#[derive(Debug, Clone)]
pub struct TwoOptOperator {
    params: TwoOptParams,
}

#[derive(Debug, Clone)]
pub struct TwoOptParams {
    pub route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl TwoOptOperator {
    pub fn new(params: TwoOptParams) -> Self {
        debug_assert!(params.from < params.to);
        TwoOptOperator { params }
    }

    pub fn route_id(&self) -> RouteIdx {
        self.params.route_id
    }
}

impl LocalSearchOperator for TwoOptOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        // Adjacent pairs are already covered by swap
        for from in 0..len {
            for to in (from + 2)..len {
                consumer(TwoOptOperator::new(TwoOptParams {
                    route_id: r1,
                    from,
                    to,
                }));
            }
        }
    }

    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        let mut stops = solution.route(self.params.route_id).stops().to_vec();
        stops[self.params.from..=self.params.to].reverse();

        vec![(self.params.route_id, stops)]
    }
}
