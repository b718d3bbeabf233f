use serde::Deserialize;
use tracing::debug;

use crate::{
    coordinate::Coordinate,
    geocoder::{GeocodeError, Geocoder},
};

pub const GOOGLE_GEOCODING_API_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocodingClientParams {
    pub api_key: String,
}

pub struct GoogleGeocodingClient {
    params: GoogleGeocodingClientParams,
    client: reqwest::Client,
}

impl GoogleGeocodingClient {
    pub fn new(params: GoogleGeocodingClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }
}

fn parse_response(address: &str, response: GeocodeResponse) -> Result<Coordinate, GeocodeError> {
    match response.status.as_str() {
        "OK" => response
            .results
            .into_iter()
            .next()
            .and_then(|result| result.geometry)
            .and_then(|geometry| geometry.location)
            .map(|location| Coordinate::new(location.lat, location.lng))
            .ok_or_else(|| GeocodeError::NotFound(address.to_string())),
        "ZERO_RESULTS" => Err(GeocodeError::NotFound(address.to_string())),
        _ => Err(GeocodeError::Api {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        }),
    }
}

impl Geocoder for GoogleGeocodingClient {
    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let response = self
            .client
            .get(GOOGLE_GEOCODING_API_URL)
            .query(&[("address", address), ("key", self.params.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Api {
                status: response.status().to_string(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let bytes = response.bytes().await?;
        let response: GeocodeResponse = serde_json::from_slice(&bytes)?;

        debug!("GoogleGeocoding: '{address}' -> {}", response.status);

        parse_response(address, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Coordinate, GeocodeError> {
        parse_response("somewhere", serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_ok_response() {
        let coordinate = parse(
            r#"{ "status": "OK", "results": [
                { "geometry": { "location": { "lat": 50.8467, "lng": 4.3525 } } }
            ] }"#,
        )
        .unwrap();

        assert_eq!(coordinate, Coordinate::new(50.8467, 4.3525));
    }

    #[test]
    fn test_zero_results_is_not_found() {
        assert!(matches!(
            parse(r#"{ "status": "ZERO_RESULTS", "results": [] }"#),
            Err(GeocodeError::NotFound(address)) if address == "somewhere"
        ));
    }

    #[test]
    fn test_missing_location_is_not_found() {
        assert!(matches!(
            parse(r#"{ "status": "OK", "results": [{ "geometry": {} }] }"#),
            Err(GeocodeError::NotFound(_))
        ));
    }

    #[test]
    fn test_other_status_is_api_error() {
        assert!(matches!(
            parse(r#"{ "status": "REQUEST_DENIED", "error_message": "bad key" }"#),
            Err(GeocodeError::Api { status, message }) if status == "REQUEST_DENIED" && message == "bad key"
        ));
    }
}
