use crate::{
    problem::node::{DEPOT, NodeIdx},
    solver::search_context::{RouteCost, SearchContext},
};

/// Stops of one vehicle, depot excluded at both ends, with their cached cost.
#[derive(Debug, Clone)]
pub struct Route {
    stops: Vec<NodeIdx>,
    cost: RouteCost,
}

impl Route {
    pub fn empty() -> Self {
        Route {
            stops: Vec::new(),
            cost: RouteCost::EMPTY,
        }
    }

    pub fn stops(&self) -> &[NodeIdx] {
        &self.stops
    }

    #[inline]
    pub fn stop(&self, position: usize) -> NodeIdx {
        self.stops[position]
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn cost(&self) -> &RouteCost {
        &self.cost
    }

    pub fn contains(&self, node: NodeIdx) -> bool {
        self.stops.contains(&node)
    }

    /// Every arc of the route, depot arcs included.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeIdx, NodeIdx)> + '_ {
        let arc_count = if self.is_empty() { 0 } else { self.len() + 1 };
        let path = std::iter::once(DEPOT)
            .chain(self.stops.iter().copied())
            .chain(std::iter::once(DEPOT));

        path.clone().zip(path.skip(1)).take(arc_count)
    }

    pub(crate) fn replace(&mut self, stops: Vec<NodeIdx>, cost: RouteCost) {
        self.stops = stops;
        self.cost = cost;
    }

    /// Recomputes the cached cost, after the penalties changed.
    pub(crate) fn refresh(&mut self, context: &SearchContext) {
        if let Some(cost) = context.evaluate_route(&self.stops) {
            self.cost = cost;
        }
    }
}
