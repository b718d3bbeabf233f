use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Objective the search minimizes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostPolicy {
    /// Arc cost `round(distance_time_factor * meters * seconds / 1000)`, plus
    /// `span_cost_coefficient` times the end time of every used route, plus
    /// `fragmentation_penalty` for every used vehicle beyond the first.
    Composite {
        distance_time_factor: f64,
        span_cost_coefficient: f64,
        fragmentation_penalty: f64,
    },

    /// Arc cost is the distance in meters. Routes are capped at `max_route_hops`
    /// arcs and every route earns `route_length_reward * hops²`, which favors few
    /// long routes.
    Consolidation {
        max_route_hops: usize,
        route_length_reward: f64,
    },
}

impl CostPolicy {
    pub fn composite() -> Self {
        CostPolicy::Composite {
            // 70 km/h is 52.4 seconds per km
            distance_time_factor: 52.4,
            span_cost_coefficient: 2.0,
            fragmentation_penalty: 100_000.0,
        }
    }

    pub fn consolidation() -> Self {
        CostPolicy::Consolidation {
            max_route_hops: 1000,
            route_length_reward: 100.0,
        }
    }

    /// Cost of travelling one arc.
    #[inline]
    pub fn arc_cost(&self, distance_meters: f64, time_seconds: i64) -> f64 {
        match self {
            CostPolicy::Composite {
                distance_time_factor,
                ..
            } => (distance_time_factor * distance_meters * time_seconds as f64 / 1000.0).round(),
            CostPolicy::Consolidation { .. } => distance_meters,
        }
    }

    /// Cost attached to a used route on top of its arcs.
    #[inline]
    pub fn route_cost(&self, end_time: i64, hops: usize) -> f64 {
        match self {
            CostPolicy::Composite {
                span_cost_coefficient,
                ..
            } => span_cost_coefficient * end_time as f64,
            CostPolicy::Consolidation {
                route_length_reward,
                ..
            } => -route_length_reward * (hops * hops) as f64,
        }
    }

    /// Cost attached to the number of used vehicles.
    #[inline]
    pub fn fleet_cost(&self, used_vehicles: usize) -> f64 {
        match self {
            CostPolicy::Composite {
                fragmentation_penalty,
                ..
            } => fragmentation_penalty * used_vehicles.saturating_sub(1) as f64,
            CostPolicy::Consolidation { .. } => 0.0,
        }
    }

    pub fn max_route_hops(&self) -> Option<usize> {
        match self {
            CostPolicy::Composite { .. } => None,
            CostPolicy::Consolidation { max_route_hops, .. } => Some(*max_route_hops),
        }
    }
}

impl Default for CostPolicy {
    fn default() -> Self {
        CostPolicy::composite()
    }
}

impl Display for CostPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostPolicy::Composite { .. } => write!(f, "composite"),
            CostPolicy::Consolidation { .. } => write!(f, "consolidation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_arc_cost_is_rounded() {
        let policy = CostPolicy::composite();

        // 52.4 * 1500 * 90 / 1000 = 7074
        assert_eq!(policy.arc_cost(1500.0, 90), 7074.0);
        // 52.4 * 10 * 1 / 1000 = 0.524
        assert_eq!(policy.arc_cost(10.0, 1), 1.0);
        assert_eq!(policy.arc_cost(0.0, 600), 0.0);
    }

    #[test]
    fn test_composite_fleet_cost() {
        let policy = CostPolicy::composite();

        assert_eq!(policy.fleet_cost(0), 0.0);
        assert_eq!(policy.fleet_cost(1), 0.0);
        assert_eq!(policy.fleet_cost(3), 200_000.0);
        assert_eq!(policy.route_cost(3600, 4), 7200.0);
    }

    #[test]
    fn test_consolidation_rewards_long_routes() {
        let policy = CostPolicy::consolidation();

        assert_eq!(policy.arc_cost(1234.0, 60), 1234.0);
        assert!(policy.route_cost(0, 6) < 2.0 * policy.route_cost(0, 3));
        assert_eq!(policy.fleet_cost(5), 0.0);
        assert_eq!(policy.max_route_hops(), Some(1000));
    }

    #[test]
    fn test_serde_tag() {
        let json = serde_json::to_value(CostPolicy::consolidation()).unwrap();
        assert_eq!(json["type"], "consolidation");
    }
}
