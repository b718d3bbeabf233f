use courier_matrix_providers::{
    as_the_crow_flies::AsTheCrowFliesClient,
    bing_api::{BingMatrixClient, BingMatrixClientParams, BingTravelMode},
    coordinate::Coordinate,
    travel_cost_client::{BatchEntry, MatrixError, TravelCostClient},
};
use tracing::info;

/// Travel-cost client picked from the configuration: Bing when an API key is
/// set, straight-line estimates otherwise.
pub enum TravelCostBackend {
    Bing(BingMatrixClient),
    AsTheCrowFlies(AsTheCrowFliesClient),
}

impl TravelCostBackend {
    pub fn from_config(bing_api_key: Option<&str>, speed_kmh: f64) -> Self {
        match bing_api_key {
            Some(api_key) => {
                info!("Using Bing Maps for travel distances and times");
                TravelCostBackend::Bing(BingMatrixClient::new(BingMatrixClientParams {
                    api_key: api_key.to_owned(),
                    travel_mode: BingTravelMode::Driving,
                }))
            }
            None => {
                info!("No Bing Maps API key, estimating travel as the crow flies at {speed_kmh} km/h");
                TravelCostBackend::AsTheCrowFlies(AsTheCrowFliesClient::new(speed_kmh))
            }
        }
    }
}

impl TravelCostClient for TravelCostBackend {
    fn max_batch_size(&self) -> usize {
        match self {
            TravelCostBackend::Bing(client) => client.max_batch_size(),
            TravelCostBackend::AsTheCrowFlies(client) => client.max_batch_size(),
        }
    }

    fn batch_matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<BatchEntry>, MatrixError>> + Send {
        async move {
            match self {
                TravelCostBackend::Bing(client) => client.batch_matrix(origins, destinations).await,
                TravelCostBackend::AsTheCrowFlies(client) => {
                    client.batch_matrix(origins, destinations).await
                }
            }
        }
    }
}
