use fxhash::FxHashSet;
use futures::{StreamExt, stream};
use tracing::{debug, info, instrument};

use crate::{
    cache::{BatchCache, BatchKey},
    coordinate::Coordinate,
    distance_time_matrix::{DistanceTimeEntry, DistanceTimeMatrix},
    travel_cost_client::{BatchEntry, MAX_BATCH_SIZE, MatrixError, TravelCostClient},
};

#[derive(Debug, Clone, Copy)]
pub struct DistanceTimeProviderParams {
    /// Coordinates per batch, capped by the client's own limit.
    pub batch_size: usize,

    /// Batch-pair requests in flight at once.
    pub max_concurrent_requests: usize,
}

impl Default for DistanceTimeProviderParams {
    fn default() -> Self {
        DistanceTimeProviderParams {
            batch_size: MAX_BATCH_SIZE,
            max_concurrent_requests: 4,
        }
    }
}

/// Builds complete distance/time matrices out of bounded batch requests.
///
/// The coordinate list is cut into batches of at most `batch_size` coordinates and
/// every ordered pair of batches is requested, `⌈n/B⌉²` requests in total. Responses
/// are merged by coordinate identity. Batch responses are memoized in the
/// caller-owned [`BatchCache`].
pub struct DistanceTimeProvider<'a, C> {
    client: C,
    cache: &'a BatchCache,
    params: DistanceTimeProviderParams,
}

impl<'a, C> DistanceTimeProvider<'a, C>
where
    C: TravelCostClient + Sync,
{
    pub fn new(client: C, cache: &'a BatchCache) -> Self {
        Self::with_params(client, cache, DistanceTimeProviderParams::default())
    }

    pub fn with_params(client: C, cache: &'a BatchCache, params: DistanceTimeProviderParams) -> Self {
        DistanceTimeProvider {
            client,
            cache,
            params,
        }
    }

    fn batch_size(&self) -> usize {
        self.params.batch_size.min(self.client.max_batch_size()).max(1)
    }

    #[instrument(skip_all, level = "debug")]
    pub async fn matrix_for(
        &self,
        coordinates: &[Coordinate],
    ) -> Result<DistanceTimeMatrix, MatrixError> {
        if coordinates.is_empty() {
            return Err(MatrixError::EmptyInput);
        }

        let batches = coordinates.chunks(self.batch_size()).collect::<Vec<_>>();
        let batch_count = batches.len();

        info!(
            "Computing distance matrix for {} coordinates ({} batches, {} requests)",
            coordinates.len(),
            batch_count,
            batch_count * batch_count
        );

        let pairs = (0..batch_count).flat_map(|i| (0..batch_count).map(move |j| (i, j)));

        let mut responses = stream::iter(pairs)
            .map(|(i, j)| {
                let origins = batches[i];
                let destinations = batches[j];
                async move {
                    debug!("batch: {i}, {j}");
                    let entries = self.fetch_batch(origins, destinations).await?;
                    Ok::<_, MatrixError>((origins, destinations, entries))
                }
            })
            .buffer_unordered(self.params.max_concurrent_requests.max(1));

        let mut matrix = DistanceTimeMatrix::with_capacity(coordinates.len() * coordinates.len());
        while let Some(response) = responses.next().await {
            let (origins, destinations, entries) = response?;
            merge_batch(&mut matrix, origins, destinations, &entries);
        }

        Ok(matrix)
    }

    async fn fetch_batch(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<Vec<BatchEntry>, MatrixError> {
        let key = BatchKey::new(origins, destinations);

        if let Some(entries) = self.cache.get(&key) {
            debug!("Batch cache hit ({} entries)", entries.len());
            return Ok(entries);
        }

        self.cache
            .get_or_try_init(key, || async {
                let entries = self.client.batch_matrix(origins, destinations).await?;
                validate_batch(origins, destinations, &entries)?;
                Ok(entries)
            })
            .await
    }
}

/// Checks that every entry points inside the batch and that the batch covers
/// every origin/destination pair.
fn validate_batch(
    origins: &[Coordinate],
    destinations: &[Coordinate],
    entries: &[BatchEntry],
) -> Result<(), MatrixError> {
    let mut covered = FxHashSet::default();

    for entry in entries {
        let origin = origins.get(entry.origin_index).ok_or_else(|| {
            MatrixError::MalformedResponse(format!(
                "origin index {} out of bounds for a batch of {}",
                entry.origin_index,
                origins.len()
            ))
        })?;
        let destination = destinations.get(entry.destination_index).ok_or_else(|| {
            MatrixError::MalformedResponse(format!(
                "destination index {} out of bounds for a batch of {}",
                entry.destination_index,
                destinations.len()
            ))
        })?;

        covered.insert((*origin, *destination));
    }

    for origin in origins {
        for destination in destinations {
            if !covered.contains(&(*origin, *destination)) {
                return Err(MatrixError::IncompleteResponse {
                    origin: *origin,
                    destination: *destination,
                });
            }
        }
    }

    Ok(())
}

fn merge_batch(
    matrix: &mut DistanceTimeMatrix,
    origins: &[Coordinate],
    destinations: &[Coordinate],
    entries: &[BatchEntry],
) {
    for entry in entries {
        // Indices were checked when the batch entered the cache
        let (Some(origin), Some(destination)) = (
            origins.get(entry.origin_index),
            destinations.get(entry.destination_index),
        ) else {
            continue;
        };

        matrix.insert(
            *origin,
            *destination,
            DistanceTimeEntry::new(entry.distance_meters, entry.time_seconds),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::as_the_crow_flies::AsTheCrowFliesClient;

    /// Answers with crow-flies values, in reverse order, and counts requests.
    struct ReversingClient {
        inner: AsTheCrowFliesClient,
        max_batch_size: usize,
        calls: AtomicUsize,
    }

    impl ReversingClient {
        fn new(max_batch_size: usize) -> Self {
            ReversingClient {
                inner: AsTheCrowFliesClient::new(40.0),
                max_batch_size,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TravelCostClient for ReversingClient {
        fn max_batch_size(&self) -> usize {
            self.max_batch_size
        }

        async fn batch_matrix(
            &self,
            origins: &[Coordinate],
            destinations: &[Coordinate],
        ) -> Result<Vec<BatchEntry>, MatrixError> {
            assert!(origins.len() <= self.max_batch_size);
            assert!(destinations.len() <= self.max_batch_size);
            self.calls.fetch_add(1, Ordering::SeqCst);

            let mut entries = self.inner.batch_matrix(origins, destinations).await?;
            entries.reverse();
            Ok(entries)
        }
    }

    /// Returns the same canned entries for every request.
    struct CannedClient(Vec<BatchEntry>);

    impl TravelCostClient for CannedClient {
        async fn batch_matrix(
            &self,
            _origins: &[Coordinate],
            _destinations: &[Coordinate],
        ) -> Result<Vec<BatchEntry>, MatrixError> {
            Ok(self.0.clone())
        }
    }

    fn coordinates(count: usize) -> Vec<Coordinate> {
        (0..count)
            .map(|index| Coordinate::new(50.0 + index as f64 * 0.01, 4.0 + index as f64 * 0.02))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_input() {
        let cache = BatchCache::new();
        let provider = DistanceTimeProvider::new(AsTheCrowFliesClient::default(), &cache);

        assert!(matches!(
            provider.matrix_for(&[]).await,
            Err(MatrixError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_batched_matrix_matches_single_request() {
        let points = coordinates(5);

        let batched_cache = BatchCache::new();
        let batched_client = ReversingClient::new(2);
        let batched = DistanceTimeProvider::new(&batched_client, &batched_cache)
            .matrix_for(&points)
            .await
            .unwrap();

        // ⌈5/2⌉² = 9
        assert_eq!(batched_client.calls.load(Ordering::SeqCst), 9);

        let single_cache = BatchCache::new();
        let single_client = ReversingClient::new(usize::MAX);
        let single = DistanceTimeProvider::new(&single_client, &single_cache)
            .matrix_for(&points)
            .await
            .unwrap();

        assert_eq!(single_client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(batched.len(), 25);
        assert_eq!(batched, single);
        assert_eq!(batched.first_missing_pair(&points), None);
    }

    #[tokio::test]
    async fn test_batch_size_is_capped_by_client() {
        let points = coordinates(3);
        let cache = BatchCache::new();
        let client = ReversingClient::new(1);
        let provider = DistanceTimeProvider::with_params(
            &client,
            &cache,
            DistanceTimeProviderParams {
                batch_size: 20,
                max_concurrent_requests: 2,
            },
        );

        let matrix = provider.matrix_for(&points).await.unwrap();

        assert_eq!(matrix.len(), 9);
        assert_eq!(client.calls.load(Ordering::SeqCst), 9);
    }

    #[tokio::test]
    async fn test_duplicates_share_entries() {
        let mut points = coordinates(2);
        points.push(points[0]);

        let cache = BatchCache::new();
        let matrix = DistanceTimeProvider::new(AsTheCrowFliesClient::default(), &cache)
            .matrix_for(&points)
            .await
            .unwrap();

        assert_eq!(matrix.len(), 4);
        assert_eq!(
            matrix.entry(&points[2], &points[0]),
            Some(&DistanceTimeEntry::ZERO)
        );
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let points = coordinates(4);
        let cache = BatchCache::new();
        let client = ReversingClient::new(2);
        let provider = DistanceTimeProvider::new(&client, &cache);

        let first = provider.matrix_for(&points).await.unwrap();
        let second = provider.matrix_for(&points).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.len(), 4);
    }

    #[tokio::test]
    async fn test_out_of_bounds_index_is_malformed() {
        let points = coordinates(1);
        let cache = BatchCache::new();
        let client = CannedClient(vec![BatchEntry {
            origin_index: 3,
            destination_index: 0,
            distance_meters: 1.0,
            time_seconds: 1.0,
        }]);

        let result = DistanceTimeProvider::new(client, &cache)
            .matrix_for(&points)
            .await;

        assert!(matches!(result, Err(MatrixError::MalformedResponse(_))));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_uncovered_pair_is_incomplete() {
        let points = coordinates(2);
        let cache = BatchCache::new();
        let client = CannedClient(vec![BatchEntry {
            origin_index: 0,
            destination_index: 0,
            distance_meters: 0.0,
            time_seconds: 0.0,
        }]);

        let result = DistanceTimeProvider::new(client, &cache)
            .matrix_for(&points)
            .await;

        assert!(matches!(
            result,
            Err(MatrixError::IncompleteResponse { .. })
        ));
    }
}
