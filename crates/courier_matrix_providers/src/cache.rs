use std::{
    collections::BTreeMap,
    fmt::Display,
    future::Future,
    hash::Hash,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use fxhash::FxHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::{coordinate::Coordinate, travel_cost_client::BatchEntry};

pub const GEOCODE_CACHE_FILE: &str = "geocode_cache.json";
pub const MATRIX_CACHE_FILE: &str = "matrix_cache.json";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only cache computing each key at most once.
///
/// Every key owns a `OnceCell`: concurrent lookups of the same key await the single
/// in-flight computation. A failed computation leaves the cell empty, the next
/// lookup retries.
pub struct KeyedCache<K, V> {
    entries: Mutex<FxHashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        KeyedCache {
            entries: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, key: K) -> Arc<OnceCell<V>> {
        let mut entries = self.entries.lock();
        Arc::clone(entries.entry(key).or_default())
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock();
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        entries.insert(key, Arc::new(OnceCell::from(value)));
    }

    /// Returns the cached value for `key`, computing it with `init` when absent.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // The lock is released before awaiting
        let cell = self.cell(key);
        cell.get_or_try_init(init).await.cloned()
    }

    /// Number of computed entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock();
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone + Ord + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
{
    /// Loads a cache previously written by [`KeyedCache::save`].
    ///
    /// A missing file is an empty cache. An unreadable or undecodable file is
    /// discarded with a warning.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!("No cache at {}, starting empty", path.display());
                return Self::new();
            }
            Err(error) => {
                warn!("Could not read cache {}: {error}", path.display());
                return Self::new();
            }
        };

        let stored: BTreeMap<K, V> = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(error) => {
                warn!(
                    "Discarding corrupt cache {}: {error}",
                    path.display()
                );
                return Self::new();
            }
        };

        debug!("Loaded {} cache entries from {}", stored.len(), path.display());

        let entries = stored
            .into_iter()
            .map(|(key, value)| (key, Arc::new(OnceCell::from(value))))
            .collect();

        KeyedCache {
            entries: Mutex::new(entries),
        }
    }

    /// Writes every computed entry to `path`, replacing any previous file.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let snapshot: BTreeMap<K, V> = {
            let entries = self.entries.lock();
            entries
                .iter()
                .filter_map(|(key, cell)| cell.get().map(|value| (key.clone(), value.clone())))
                .collect()
        };

        let temporary_path = temporary_sibling(path);
        let file = std::fs::File::create(&temporary_path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;
        drop(writer);

        std::fs::rename(&temporary_path, path)?;

        debug!("Saved {} cache entries to {}", snapshot.len(), path.display());

        Ok(())
    }
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

/// Key of one batch-pair request: the exact origin and destination sequences.
///
/// Encoded as `lat,lon:lat,lon-lat,lon:lat,lon`, origins before the dash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct BatchKey(String);

impl BatchKey {
    pub fn new(origins: &[Coordinate], destinations: &[Coordinate]) -> Self {
        BatchKey(format!(
            "{}-{}",
            join_coordinates(origins),
            join_coordinates(destinations)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn join_coordinates(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(|coordinate| coordinate.to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// Address to coordinate.
pub type GeocodeCache = KeyedCache<String, Coordinate>;

/// Batch-pair request to the entries the travel-cost service returned for it.
pub type BatchCache = KeyedCache<BatchKey, Vec<BatchEntry>>;
