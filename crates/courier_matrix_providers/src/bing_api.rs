use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    coordinate::Coordinate,
    travel_cost_client::{BatchEntry, MatrixError, TravelCostClient},
};

pub const BING_DISTANCE_MATRIX_API_URL: &str =
    "https://dev.virtualearth.net/REST/v1/Routes/DistanceMatrix";

const METERS_PER_KILOMETER: f64 = 1000.0;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BingTravelMode {
    #[default]
    Driving,
    Walking,
    Truck,
}

impl Display for BingTravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                BingTravelMode::Driving => "driving",
                BingTravelMode::Walking => "walking",
                BingTravelMode::Truck => "truck",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct BingPoint {
    latitude: f64,
    longitude: f64,
}

impl From<&Coordinate> for BingPoint {
    fn from(coordinate: &Coordinate) -> Self {
        BingPoint {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DistanceMatrixRequestBody {
    origins: Vec<BingPoint>,
    destinations: Vec<BingPoint>,
    travel_mode: String,
    time_unit: &'static str,
    distance_unit: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DistanceMatrixResponse {
    #[serde(default)]
    resource_sets: Vec<ResourceSet>,
}

#[derive(Deserialize)]
struct ResourceSet {
    #[serde(default)]
    resources: Vec<DistanceMatrixResource>,
}

#[derive(Deserialize)]
struct DistanceMatrixResource {
    #[serde(default)]
    results: Vec<DistanceMatrixCell>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DistanceMatrixCell {
    origin_index: usize,
    destination_index: usize,

    /// Kilometers
    travel_distance: Option<f64>,

    /// Seconds
    travel_duration: Option<f64>,
}

pub struct BingMatrixClientParams {
    pub api_key: String,
    pub travel_mode: BingTravelMode,
}

/// Travel-cost client for the Bing Maps Distance Matrix API.
pub struct BingMatrixClient {
    params: BingMatrixClientParams,
    client: reqwest::Client,
}

impl BingMatrixClient {
    pub fn new(params: BingMatrixClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    fn request_body(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> DistanceMatrixRequestBody {
        DistanceMatrixRequestBody {
            origins: origins.iter().map(BingPoint::from).collect(),
            destinations: destinations.iter().map(BingPoint::from).collect(),
            travel_mode: self.params.travel_mode.to_string(),
            time_unit: "second",
            distance_unit: "km",
        }
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<DistanceMatrixResponse, MatrixError> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            Err(MatrixError::Api { status, message })
        }
    }
}

fn into_batch_entries(response: DistanceMatrixResponse) -> Result<Vec<BatchEntry>, MatrixError> {
    let resource = response
        .resource_sets
        .into_iter()
        .next()
        .and_then(|set| set.resources.into_iter().next())
        .ok_or_else(|| {
            MatrixError::MalformedResponse(String::from("response contains no resource set"))
        })?;

    Ok(resource
        .results
        .into_iter()
        .map(|cell| BatchEntry {
            origin_index: cell.origin_index,
            destination_index: cell.destination_index,
            distance_meters: cell.travel_distance.unwrap_or(0.0) * METERS_PER_KILOMETER,
            time_seconds: cell.travel_duration.unwrap_or(0.0),
        })
        .collect())
}

impl TravelCostClient for BingMatrixClient {
    async fn batch_matrix(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<Vec<BatchEntry>, MatrixError> {
        let body = self.request_body(origins, destinations);

        let response = self
            .client
            .post(BING_DISTANCE_MATRIX_API_URL)
            .query(&[("key", &self.params.api_key)])
            .json(&body)
            .send()
            .await?;

        debug!(
            "BingApi: Requested {}x{} distance matrix",
            origins.len(),
            destinations.len()
        );

        let response = self.handle_response(response).await?;

        into_batch_entries(response)
    }
}
