use std::future::Future;

use thiserror::Error;
use tracing::{debug, info};

use crate::{cache::GeocodeCache, coordinate::Coordinate};

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Address not found: '{0}'")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: String, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Resolves a free-form address to a coordinate.
pub trait Geocoder {
    fn resolve(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinate, GeocodeError>> + Send;
}

impl<G> Geocoder for &G
where
    G: Geocoder + Sync,
{
    fn resolve(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinate, GeocodeError>> + Send {
        (**self).resolve(address)
    }
}

/// Geocoder memoizing every resolved address in a caller-owned [`GeocodeCache`].
pub struct CachedGeocoder<'a, G> {
    geocoder: G,
    cache: &'a GeocodeCache,
}

impl<'a, G> CachedGeocoder<'a, G>
where
    G: Geocoder + Sync,
{
    pub fn new(geocoder: G, cache: &'a GeocodeCache) -> Self {
        CachedGeocoder { geocoder, cache }
    }

    pub async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        info!("Getting coordinates for address '{address}'");

        let key = address.to_string();
        if let Some(coordinate) = self.cache.get(&key) {
            debug!("Geocode cache hit for '{address}'");
            return Ok(coordinate);
        }

        self.cache
            .get_or_try_init(key, || self.geocoder.resolve(address))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingGeocoder {
        calls: AtomicUsize,
    }

    impl Geocoder for CountingGeocoder {
        async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if address.is_empty() {
                return Err(GeocodeError::NotFound(address.to_string()));
            }
            Ok(Coordinate::new(50.0 + address.len() as f64, 4.0))
        }
    }

    #[tokio::test]
    async fn test_same_address_resolved_once() {
        let cache = GeocodeCache::new();
        let geocoder = CachedGeocoder::new(
            CountingGeocoder {
                calls: AtomicUsize::new(0),
            },
            &cache,
        );

        let first = geocoder.resolve("Grand Place, Brussels").await.unwrap();
        let second = geocoder.resolve("Grand Place, Brussels").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(geocoder.geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let cache = GeocodeCache::new();
        let geocoder = CachedGeocoder::new(
            CountingGeocoder {
                calls: AtomicUsize::new(0),
            },
            &cache,
        );

        assert!(matches!(
            geocoder.resolve("").await,
            Err(GeocodeError::NotFound(_))
        ));
        assert!(geocoder.resolve("").await.is_err());
        assert_eq!(geocoder.geocoder.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}
