use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// A point on earth in degrees.
///
/// Identity is value based: two coordinates are equal when both components have the
/// same bit pattern (`-0.0` is treated as `0.0`), which makes `Coordinate` usable as
/// a matrix and cache key.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[inline(always)]
    fn key_bits(&self) -> (u64, u64) {
        // -0.0 and 0.0 compare equal as floats, keep them equal as keys too
        let normalize = |value: f64| if value == 0.0 { 0.0_f64 } else { value };
        (
            normalize(self.latitude).to_bits(),
            normalize(self.longitude).to_bits(),
        )
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (latitude, longitude) = self.key_bits();
        state.write_u64(latitude);
        state.write_u64(longitude);
    }
}

/// Formats as `lat,lon`, the shortest representation that round-trips.
impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl From<&Coordinate> for geo::Point<f64> {
    fn from(coordinate: &Coordinate) -> Self {
        geo::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        (&coordinate).into()
    }
}
