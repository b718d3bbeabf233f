use std::{
    hash::Hash,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::Args;
use courier_matrix_providers::{
    cache::{BatchCache, GeocodeCache, KeyedCache},
    coordinate::Coordinate,
    distance_time_matrix::DistanceTimeMatrix,
    distance_time_provider::{DistanceTimeProvider, DistanceTimeProviderParams},
    geocoder::{CachedGeocoder, Geocoder},
    google_geocoding_api::{GoogleGeocodingClient, GoogleGeocodingClientParams},
    travel_cost_client::{MAX_BATCH_SIZE, TravelCostClient},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, instrument, warn};

use crate::{config::Config, input::ProblemInput, travel_cost::TravelCostBackend};

/// Options shared by every command that needs coordinates and a matrix.
#[derive(Args, Debug, Clone)]
pub struct MatrixArgs {
    /// Input file, see `courier schema`
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Country appended to addresses before geocoding (e.g. "Belgium")
    #[arg(long)]
    pub default_country: Option<String>,

    /// Speed used to estimate travel times when no travel-cost API is configured
    #[arg(long, default_value_t = 50.0)]
    pub speed_kmh: f64,

    /// Coordinates per travel-cost request
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub batch_size: usize,

    /// Travel-cost requests in flight at once
    #[arg(long, default_value_t = 4)]
    pub max_concurrent_requests: usize,
}

/// Geocode and matrix caches, persisted in the configured cache folder.
pub struct Caches {
    pub geocode: GeocodeCache,
    pub matrix: BatchCache,
}

impl Caches {
    pub fn load(config: &Config) -> Self {
        Caches {
            geocode: load_cache(config.geocode_cache_path().as_deref()),
            matrix: load_cache(config.matrix_cache_path().as_deref()),
        }
    }

    /// Failing to persist a cache only costs extra requests next time.
    pub fn save(&self, config: &Config) {
        save_cache(&self.geocode, config.geocode_cache_path().as_deref());
        save_cache(&self.matrix, config.matrix_cache_path().as_deref());
    }
}

fn load_cache<K, V>(path: Option<&Path>) -> KeyedCache<K, V>
where
    K: Eq + Hash + Clone + Ord + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    path.map(KeyedCache::load).unwrap_or_default()
}

fn save_cache<K, V>(cache: &KeyedCache<K, V>, path: Option<&Path>)
where
    K: Eq + Hash + Clone + Ord + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    if let Some(path) = path
        && let Err(error) = cache.save(path)
    {
        warn!("Could not save cache {}: {error}", path.display());
    }
}

pub fn read_input(path: &Path) -> anyhow::Result<ProblemInput> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    let input = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Invalid input file {}", path.display()))?;

    Ok(input)
}

/// Google geocoder when an API key is configured.
pub fn google_geocoder(config: &Config) -> Option<GoogleGeocodingClient> {
    config.google_api_key.as_ref().map(|api_key| {
        GoogleGeocodingClient::new(GoogleGeocodingClientParams {
            api_key: api_key.clone(),
        })
    })
}

/// Coordinates of the depot then of every stop, geocoding addresses as needed.
#[instrument(skip_all, level = "debug")]
pub async fn resolve_coordinates<G>(
    input: &ProblemInput,
    geocoder: Option<&CachedGeocoder<'_, G>>,
    default_country: Option<&str>,
) -> anyhow::Result<Vec<Coordinate>>
where
    G: Geocoder + Sync,
{
    let mut coordinates = Vec::with_capacity(input.stops.len() + 1);

    for place in input.places() {
        if let Some(coordinate) = place.coordinate() {
            coordinates.push(coordinate);
            continue;
        }

        let query = place
            .geocoding_query(default_country)
            .with_context(|| format!("'{place}' has no address to geocode"))?;

        let Some(geocoder) = geocoder else {
            bail!(
                "Geocoding '{query}' requires {}",
                crate::config::GOOGLE_API_KEY_ENV_VAR
            );
        };

        let coordinate = geocoder
            .resolve(&query)
            .await
            .with_context(|| format!("Could not geocode '{query}'"))?;
        coordinates.push(coordinate);
    }

    Ok(coordinates)
}

pub fn travel_cost_backend(config: &Config, args: &MatrixArgs) -> TravelCostBackend {
    TravelCostBackend::from_config(config.bing_api_key.as_deref(), args.speed_kmh)
}

pub async fn fetch_matrix<C>(
    client: C,
    coordinates: &[Coordinate],
    caches: &Caches,
    args: &MatrixArgs,
) -> anyhow::Result<DistanceTimeMatrix>
where
    C: TravelCostClient + Sync,
{
    let provider = DistanceTimeProvider::with_params(
        client,
        &caches.matrix,
        DistanceTimeProviderParams {
            batch_size: args.batch_size,
            max_concurrent_requests: args.max_concurrent_requests.max(1),
        },
    );

    let matrix = provider
        .matrix_for(coordinates)
        .await
        .context("Could not compute the distance matrix")?;

    info!("Distance matrix ready with {} entries", matrix.len());

    Ok(matrix)
}
