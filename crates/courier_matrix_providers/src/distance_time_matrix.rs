use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// Travel distance and time for one ordered pair of coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DistanceTimeEntry {
    /// Distance in meters
    pub distance_meters: f64,

    /// Travel time in seconds
    pub time_seconds: f64,
}

impl DistanceTimeEntry {
    pub const ZERO: DistanceTimeEntry = DistanceTimeEntry {
        distance_meters: 0.0,
        time_seconds: 0.0,
    };

    pub fn new(distance_meters: f64, time_seconds: f64) -> Self {
        DistanceTimeEntry {
            distance_meters,
            time_seconds,
        }
    }
}

/// Directional distance/time lookup keyed by `(origin, destination)` coordinates.
///
/// Entries are keyed by coordinate identity rather than by position, so merging the
/// results of several partial requests never depends on the order in which a
/// service returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceTimeMatrix {
    entries: FxHashMap<(Coordinate, Coordinate), DistanceTimeEntry>,
}

impl DistanceTimeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        DistanceTimeMatrix {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn insert(&mut self, from: Coordinate, to: Coordinate, entry: DistanceTimeEntry) {
        self.entries.insert((from, to), entry);
    }

    #[inline]
    pub fn entry(&self, from: &Coordinate, to: &Coordinate) -> Option<&DistanceTimeEntry> {
        self.entries.get(&(*from, *to))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first `(from, to)` pair of `coordinates` that has no entry.
    pub fn first_missing_pair(&self, coordinates: &[Coordinate]) -> Option<(Coordinate, Coordinate)> {
        coordinates.iter().find_map(|from| {
            coordinates
                .iter()
                .find(|to| !self.entries.contains_key(&(*from, **to)))
                .map(|to| (*from, *to))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Coordinate, Coordinate), &DistanceTimeEntry)> {
        self.entries.iter()
    }
}
