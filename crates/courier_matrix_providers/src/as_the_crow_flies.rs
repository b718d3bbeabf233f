use geo::{Distance, Haversine};

use crate::{
    coordinate::Coordinate,
    travel_cost_client::{BatchEntry, MatrixError, TravelCostClient},
};

/// Offline travel-cost client: great-circle distance and a constant speed.
///
/// Handy for tests and for running without an API key.
#[derive(Debug, Clone, Copy)]
pub struct AsTheCrowFliesClient {
    speed_kmh: f64,
}

impl AsTheCrowFliesClient {
    pub fn new(speed_kmh: f64) -> Self {
        AsTheCrowFliesClient { speed_kmh }
    }

    fn entry(&self, origin: &Coordinate, destination: &Coordinate) -> (f64, f64) {
        let haversine = Haversine;
        let distance = haversine.distance(geo::Point::from(origin), geo::Point::from(destination));
        let speed_ms = self.speed_kmh / 3.6;
        (distance, distance / speed_ms)
    }
}

impl Default for AsTheCrowFliesClient {
    fn default() -> Self {
        AsTheCrowFliesClient::new(50.0)
    }
}

impl TravelCostClient for AsTheCrowFliesClient {
    fn max_batch_size(&self) -> usize {
        usize::MAX
    }

    async fn batch_matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<Vec<BatchEntry>, MatrixError> {
        let mut entries = Vec::with_capacity(origins.len() * destinations.len());

        for (origin_index, origin) in origins.iter().enumerate() {
            for (destination_index, destination) in destinations.iter().enumerate() {
                let (distance_meters, time_seconds) = self.entry(origin, destination);
                entries.push(BatchEntry {
                    origin_index,
                    destination_index,
                    distance_meters,
                    time_seconds,
                });
            }
        }

        Ok(entries)
    }
}
