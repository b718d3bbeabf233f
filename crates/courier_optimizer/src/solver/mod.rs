pub mod construction;
pub mod guided_local_search;
pub mod insertion;
pub mod ls;
pub mod penalties;
pub mod ruin;
pub mod score;
pub mod search_context;
pub mod solution;
pub mod solver;
pub mod solver_params;
