pub mod cost_policy;
pub mod node;
pub mod time_window;
pub mod travel_matrices;
pub mod vehicle_routing_problem;
