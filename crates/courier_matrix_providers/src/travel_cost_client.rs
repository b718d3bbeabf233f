use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::Coordinate;

/// Reference per-request limit of the travel-cost services: at most
/// `MAX_BATCH_SIZE` origins and `MAX_BATCH_SIZE` destinations per call.
pub const MAX_BATCH_SIZE: usize = 20;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("At least one coordinate is required")]
    EmptyInput,

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Incomplete response: no distance/time from {origin} to {destination}")]
    IncompleteResponse {
        origin: Coordinate,
        destination: Coordinate,
    },
}

/// One result of a batch request. Indices are positions in the origins and
/// destinations of the request that produced it, not in the full coordinate list.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BatchEntry {
    pub origin_index: usize,
    pub destination_index: usize,
    pub distance_meters: f64,
    pub time_seconds: f64,
}

/// External travel-cost service able to compute a bounded origins x destinations
/// matrix in one request.
///
/// Results may come back in any order.
pub trait TravelCostClient {
    /// Largest number of origins (and of destinations) accepted per request.
    fn max_batch_size(&self) -> usize {
        MAX_BATCH_SIZE
    }

    fn batch_matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<BatchEntry>, MatrixError>> + Send;
}

impl<C> TravelCostClient for &C
where
    C: TravelCostClient + Sync,
{
    fn max_batch_size(&self) -> usize {
        (**self).max_batch_size()
    }

    fn batch_matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> impl Future<Output = Result<Vec<BatchEntry>, MatrixError>> + Send {
        (**self).batch_matrix(origins, destinations)
    }
}
