use crate::solver::{
    ls::r#move::{LocalSearchOperator, RouteUpdate},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Inter-Route Relocate**
///
/// Moves the stop at `from` in one route to index `to` of another route.
/// The target may be an empty vehicle, and the source may end up empty.
///
/// ```text
/// BEFORE:
///    R1: ... (A) -> [from] -> (B) ...
///    R2: ... (X) -> (Y) ...
///
/// AFTER:
///    R1: ... (A) -> (B) ...
///    R2: ... (X) -> [from] -> (Y) ...
/// ```
#[derive(Debug, Clone)]
pub struct InterRelocateOperator {
    params: InterRelocateOperatorParams,
}

#[derive(Debug, Clone)]
pub struct InterRelocateOperatorParams {
    pub from_route_id: RouteIdx,
    pub to_route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl InterRelocateOperator {
    pub fn new(params: InterRelocateOperatorParams) -> Self {
        debug_assert_ne!(params.from_route_id, params.to_route_id);
        InterRelocateOperator { params }
    }

    pub fn from_route_id(&self) -> RouteIdx {
        self.params.from_route_id
    }

    pub fn to_route_id(&self) -> RouteIdx {
        self.params.to_route_id
    }
}

impl LocalSearchOperator for InterRelocateOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 == r2 {
            return;
        }

        let from_len = solution.route(r1).len();
        let to_len = solution.route(r2).len();

        for from in 0..from_len {
            for to in 0..=to_len {
                consumer(InterRelocateOperator::new(InterRelocateOperatorParams {
                    from_route_id: r1,
                    to_route_id: r2,
                    from,
                    to,
                }));
            }
        }
    }

    fn updated_routes(&self, solution: &WorkingSolution) -> Vec<RouteUpdate> {
        let mut from_stops = solution.route(self.params.from_route_id).stops().to_vec();
        let mut to_stops = solution.route(self.params.to_route_id).stops().to_vec();

        let node = from_stops.remove(self.params.from);
        to_stops.insert(self.params.to, node);

        vec![
            (self.params.from_route_id, from_stops),
            (self.params.to_route_id, to_stops),
        ]
    }
}
