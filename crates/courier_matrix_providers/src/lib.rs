pub mod as_the_crow_flies;
pub mod bing_api;
pub mod cache;
pub mod coordinate;
pub mod distance_time_matrix;
pub mod distance_time_provider;
pub mod geocoder;
pub mod google_geocoding_api;
pub mod travel_cost_client;
