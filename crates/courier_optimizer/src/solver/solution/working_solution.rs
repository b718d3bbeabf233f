use crate::{
    problem::node::NodeIdx,
    solver::{
        score::Score,
        search_context::{RouteCost, SearchContext},
        solution::{route::Route, route_id::RouteIdx},
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Assignment of stops to vehicle slots during the search.
///
/// Every slot always holds a feasible route. Stops no route could take stay in
/// `unassigned`, kept sorted.
#[derive(Debug, Clone)]
pub struct WorkingSolution {
    routes: Vec<Route>,
    unassigned: Vec<NodeIdx>,
}

impl WorkingSolution {
    pub fn new(vehicles: usize, stops: impl IntoIterator<Item = NodeIdx>) -> Self {
        let mut unassigned = stops.into_iter().collect::<Vec<_>>();
        unassigned.sort_unstable();

        WorkingSolution {
            routes: (0..vehicles).map(|_| Route::empty()).collect(),
            unassigned,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[inline]
    pub fn route(&self, route_id: RouteIdx) -> &Route {
        &self.routes[route_id]
    }

    pub fn routes_iter(&self) -> impl Iterator<Item = (RouteIdx, &Route)> {
        self.routes.iter().enumerate_idx()
    }

    pub fn non_empty_routes_iter(&self) -> impl Iterator<Item = (RouteIdx, &Route)> {
        self.routes_iter().filter(|(_, route)| !route.is_empty())
    }

    pub fn non_empty_routes_count(&self) -> usize {
        self.routes.iter().filter(|route| !route.is_empty()).count()
    }

    /// Routes a move may target: every used route and the first empty one.
    /// Empty vehicle slots are interchangeable, trying more than one is wasted work.
    pub fn candidate_routes(&self) -> Vec<RouteIdx> {
        let mut candidates = self
            .non_empty_routes_iter()
            .map(|(route_id, _)| route_id)
            .collect::<Vec<_>>();

        if let Some((route_id, _)) = self.routes_iter().find(|(_, route)| route.is_empty()) {
            candidates.push(route_id);
            candidates.sort_unstable();
        }

        candidates
    }

    pub fn unassigned(&self) -> &[NodeIdx] {
        &self.unassigned
    }

    pub fn has_unassigned(&self) -> bool {
        !self.unassigned.is_empty()
    }

    pub fn is_unassigned(&self, node: NodeIdx) -> bool {
        self.unassigned.binary_search(&node).is_ok()
    }

    pub fn route_of(&self, node: NodeIdx) -> Option<RouteIdx> {
        self.routes_iter()
            .find(|(_, route)| route.contains(node))
            .map(|(route_id, _)| route_id)
    }

    /// Stops currently on a route, in route order.
    pub fn assigned(&self) -> Vec<NodeIdx> {
        self.routes
            .iter()
            .flat_map(|route| route.stops().iter().copied())
            .collect()
    }

    /// Replaces the stops of a route. `cost` must be the evaluation of `stops`.
    pub fn replace_route(&mut self, route_id: RouteIdx, stops: Vec<NodeIdx>, cost: RouteCost) {
        self.routes[route_id].replace(stops, cost);
    }

    pub fn mark_assigned(&mut self, node: NodeIdx) {
        if let Ok(position) = self.unassigned.binary_search(&node) {
            self.unassigned.remove(position);
        }
    }

    pub fn mark_unassigned(&mut self, node: NodeIdx) {
        if let Err(position) = self.unassigned.binary_search(&node) {
            self.unassigned.insert(position, node);
        }
    }

    /// Recomputes every cached route cost, after the penalties changed.
    pub fn refresh(&mut self, context: &SearchContext) {
        for route in &mut self.routes {
            route.refresh(context);
        }
    }

    /// Unassigned stops, then the cost under the policy.
    pub fn score(&self, context: &SearchContext) -> Score {
        let routes_cost = self
            .routes
            .iter()
            .map(|route| route.cost().cost)
            .sum::<f64>();

        Score::new(
            self.unassigned.len() as f64,
            routes_cost + context.policy().fleet_cost(self.non_empty_routes_count()),
        )
    }

    /// Like [`WorkingSolution::score`] with the arc penalties added.
    pub fn augmented_score(&self, context: &SearchContext) -> Score {
        let routes_cost = self
            .routes
            .iter()
            .map(|route| route.cost().augmented_cost)
            .sum::<f64>();

        Score::new(
            self.unassigned.len() as f64,
            routes_cost + context.policy().fleet_cost(self.non_empty_routes_count()),
        )
    }

    /// Arcs travelled by the solution.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeIdx, NodeIdx)> + '_ {
        self.routes.iter().flat_map(|route| route.arcs())
    }
}
